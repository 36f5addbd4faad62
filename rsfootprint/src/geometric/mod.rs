pub mod bounds;
pub mod clean;
pub mod footprint;
pub mod stats;
pub mod writer;
