//! Building footprints from OpenStreetMap: download the buildings inside a
//! boundary, save them as GeoJSON, highlight one, and summarise their areas
//! in a metric CRS.

pub mod collect;
pub mod commons;
pub mod config;
pub mod error;
pub mod geo_core;
pub mod geometric;
pub mod pipeline;
pub mod render;

pub use error::FootprintError;
