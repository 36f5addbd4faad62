use anyhow::{Context, Result};
use geo::{BoundingRect, Geometry};
use geojson::GeoJson;
use std::path::Path;

use crate::error::FootprintError;
use crate::geo_core::BoundingBox;

/// Read a boundary GeoJSON file and return the bounding box of its first feature
pub fn bounds_from_geojson_file<P: AsRef<Path>>(path: P) -> Result<BoundingBox> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read boundary file: {:?}", path))?;
    bounds_from_geojson(&data).with_context(|| format!("Invalid boundary file: {:?}", path))
}

/// Bounding box of the first feature's geometry.
/// Only that geometry is consulted, whatever else the document holds.
pub fn bounds_from_geojson(geojson_data: &[u8]) -> Result<BoundingBox> {
    let geojson_str =
        std::str::from_utf8(geojson_data).context("GeoJSON data is not valid UTF-8")?;
    let geojson: GeoJson = geojson_str.parse().context("Failed to parse GeoJSON")?;

    let feature = match geojson {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .next()
            .ok_or(FootprintError::NoFeatures)?,
        GeoJson::Feature(f) => f,
        GeoJson::Geometry(_) => anyhow::bail!("GeoJSON must be a Feature or FeatureCollection"),
    };

    let geometry = feature.geometry.ok_or(FootprintError::MissingGeometry)?;
    let geometry: Geometry<f64> = (&geometry)
        .try_into()
        .context("Failed to convert GeoJSON geometry to geo::Geometry")?;

    let rect = geometry
        .bounding_rect()
        .ok_or(FootprintError::EmptyGeometry)?;

    let bbox = BoundingBox::from(rect);
    BoundingBox::try_new(bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y)
}
