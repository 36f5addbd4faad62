use anyhow::{Context, Result};
use std::path::Path;

use crate::geometric::clean::clean_collection;
use crate::geometric::footprint::FootprintCollection;

/// Clean the collection, then write it as a GeoJSON FeatureCollection.
/// An existing file at `output_file` is overwritten; the parent directory
/// must already exist.
pub fn save_to_geojson<P: AsRef<Path>>(
    collection: &mut FootprintCollection,
    output_file: P,
) -> Result<()> {
    let output_file = output_file.as_ref();
    clean_collection(collection);

    let geojson_str = collection.to_geojson_string();
    std::fs::write(output_file, geojson_str)
        .with_context(|| format!("Failed to write GeoJSON file: {:?}", output_file))?;

    log::info!(
        "Wrote {} footprints to {:?}",
        collection.len(),
        output_file
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_core::Crs;
    use crate::geometric::footprint::Footprint;
    use geo::{polygon, Geometry};
    use serde_json::json;

    fn sample() -> FootprintCollection {
        let mut collection = FootprintCollection::new(Crs::WGS84);
        let a: Geometry<f64> = polygon![
            (x: -106.05, y: 39.48), (x: -106.04, y: 39.48),
            (x: -106.04, y: 39.49), (x: -106.05, y: 39.48),
        ]
        .into();
        let b: Geometry<f64> = polygon![
            (x: -106.03, y: 39.47), (x: -106.02, y: 39.47),
            (x: -106.02, y: 39.48), (x: -106.03, y: 39.48), (x: -106.03, y: 39.47),
        ]
        .into();
        let mut first = Footprint::new(a);
        first.set_property("building", json!("house"));
        first.set_property("nodes", json!([11, 12, 13, 11]));
        collection.add_footprint(first);
        collection.add_footprint(Footprint::new(b));
        collection
    }

    #[test]
    fn test_round_trip_keeps_count_and_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buildings.geojson");
        let mut collection = sample();
        save_to_geojson(&mut collection, &path).unwrap();

        let reloaded = FootprintCollection::from_geojson_file(&path).unwrap();
        assert_eq!(reloaded.len(), collection.len());
        for (before, after) in collection.footprints.iter().zip(&reloaded.footprints) {
            assert_eq!(before.geometry, after.geometry);
        }
        // Sequence attributes come back as text
        assert_eq!(
            reloaded.footprints[0].property("nodes"),
            Some(&json!("[11, 12, 13, 11]"))
        );
        assert_eq!(reloaded.footprints[0].property("building"), Some(&json!("house")));
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("buildings.geojson");
        std::fs::write(&path, "stale").unwrap();

        let mut collection = sample();
        save_to_geojson(&mut collection, &path).unwrap();
        let reloaded = FootprintCollection::from_geojson_file(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_missing_parent_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("buildings.geojson");
        let mut collection = sample();
        assert!(save_to_geojson(&mut collection, &path).is_err());
    }
}
