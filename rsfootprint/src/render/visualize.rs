use anyhow::{Context, Result};
use geo::BoundingRect;
use std::io::Write;
use std::path::Path;

use crate::error::FootprintError;
use crate::geo_core::BoundingBox;
use crate::geometric::footprint::{Footprint, FootprintCollection};
use crate::render::sink::{DisplaySink, Scene};

/// Load a saved footprint file, print the first footprint's attributes to
/// `out`, then show every footprint with that one highlighted.
pub fn load_and_plot<P: AsRef<Path>>(
    file_path: P,
    sink: &mut dyn DisplaySink,
    out: &mut dyn Write,
) -> Result<()> {
    let collection = FootprintCollection::from_geojson_file(file_path)?;
    let selected = collection.first().ok_or(FootprintError::NoFeatures)?;

    writeln!(out, "Metadata for the selected building:")?;
    write!(out, "{}", describe_footprint(selected))?;
    out.flush().context("Failed to flush metadata output")?;

    sink.show(&Scene::highlight(&collection, 0))
}

/// One `name  value` line per attribute, then the geometry summary
pub fn describe_footprint(footprint: &Footprint) -> String {
    let width = footprint
        .properties
        .keys()
        .map(String::len)
        .chain(std::iter::once("geometry".len()))
        .max()
        .unwrap_or(0);

    let mut text = String::new();
    for (key, value) in &footprint.properties {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "None".to_string(),
            other => other.to_string(),
        };
        text.push_str(&format!("{:<width$}  {}\n", key, value, width = width));
    }

    let extent = footprint
        .geometry
        .bounding_rect()
        .map(|r| BoundingBox::from(r).to_string())
        .unwrap_or_else(|| "EMPTY".to_string());
    text.push_str(&format!(
        "{:<width$}  {} {}\n",
        "geometry",
        footprint.geometry_type(),
        extent,
        width = width
    ));

    text
}
