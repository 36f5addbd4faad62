use anyhow::Result;
use geo::polygon;
use serde_json::json;
use std::cell::RefCell;

use rsfootprint::collect::osm::osm_collect::OsmCollect;
use rsfootprint::collect::provider::{FeatureProvider, TagFilter};
use rsfootprint::config::PipelineConfig;
use rsfootprint::geo_core::{BoundingBox, CoordinateTransform, Crs};
use rsfootprint::geometric::footprint::{Footprint, FootprintCollection};
use rsfootprint::pipeline::run_with;
use rsfootprint::render::sink::{DisplaySink, Scene};
use rsfootprint::FootprintError;

const BOUNDARY: &str = r#"{
    "type": "FeatureCollection",
    "features": [{
        "type": "Feature",
        "properties": {"name": "town"},
        "geometry": {"type": "Polygon", "coordinates": [[
            [-106.06, 39.46], [-106.02, 39.46], [-106.02, 39.50],
            [-106.06, 39.50], [-106.06, 39.46]
        ]]}
    }]
}"#;

/// Hands back a canned collection and remembers what it was asked for
struct StubProvider {
    collection: FootprintCollection,
    requests: RefCell<Vec<(BoundingBox, TagFilter)>>,
}

impl FeatureProvider for StubProvider {
    fn fetch(&self, bbox: &BoundingBox, tag: &TagFilter) -> Result<FootprintCollection> {
        self.requests.borrow_mut().push((*bbox, tag.clone()));
        Ok(self.collection.clone())
    }
}

struct FailingProvider;

impl FeatureProvider for FailingProvider {
    fn fetch(&self, _bbox: &BoundingBox, _tag: &TagFilter) -> Result<FootprintCollection> {
        Err(FootprintError::Provider {
            status: 504,
            body: "Gateway Timeout".to_string(),
        }
        .into())
    }
}

#[derive(Default)]
struct RecordingSink {
    scenes: Vec<Scene>,
}

impl DisplaySink for RecordingSink {
    fn show(&mut self, scene: &Scene) -> Result<()> {
        self.scenes.push(scene.clone());
        Ok(())
    }
}

/// Treats one degree as one kilometre
struct Kilometres;

impl CoordinateTransform for Kilometres {
    fn target_crs(&self) -> Crs {
        Crs::new(32613)
    }

    fn convert(&self, (x, y): (f64, f64)) -> Result<(f64, f64)> {
        Ok((x * 1000.0, y * 1000.0))
    }
}

fn downloaded() -> FootprintCollection {
    let mut collection = FootprintCollection::new(Crs::WGS84);
    let mut house = Footprint::new(
        polygon![
            (x: -106.050, y: 39.470), (x: -106.049, y: 39.470),
            (x: -106.049, y: 39.471), (x: -106.050, y: 39.471), (x: -106.050, y: 39.470),
        ]
        .into(),
    );
    house.set_property("building", json!("house"));
    house.set_property("levels", json!(["1", "2"]));
    collection.add_footprint(house);

    collection.add_footprint(Footprint::new(
        polygon![
            (x: -106.040, y: 39.480), (x: -106.038, y: 39.480),
            (x: -106.038, y: 39.481), (x: -106.040, y: 39.481), (x: -106.040, y: 39.480),
        ]
        .into(),
    ));
    collection
}

fn config_in(dir: &std::path::Path) -> PipelineConfig {
    let boundary = dir.join("boundary.geojson");
    std::fs::write(&boundary, BOUNDARY).unwrap();

    let mut config = PipelineConfig::default();
    config.input.boundary = boundary;
    config.output.features = dir.join("buildings_osm.geojson");
    config
}

#[test]
fn test_full_run_with_stub_provider() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let provider = StubProvider {
        collection: downloaded(),
        requests: RefCell::new(Vec::new()),
    };
    let mut sink = RecordingSink::default();
    let mut out = Vec::new();

    let report = run_with(&config, &provider, &mut sink, &mut out, |crs| {
        assert_eq!(crs, Crs::WGS84);
        let transform: Box<dyn CoordinateTransform> = Box::new(Kilometres);
        Ok(transform)
    })
    .unwrap();

    // Provider was asked for the boundary's box and the building tag
    let requests = provider.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, BoundingBox::new(-106.06, 39.46, -106.02, 39.50));
    assert_eq!(requests[0].1, TagFilter::new("building"));

    // Saved file reloads with cleaned attributes
    let saved = FootprintCollection::from_geojson_file(&config.output.features).unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved.footprints[0].property("levels"), Some(&json!("['1', '2']")));

    assert_eq!(sink.scenes.len(), 1);
    assert_eq!(sink.scenes[0].layers.len(), 2);

    // 1 m x 1 m and 2 m x 1 m after the kilometre scaling
    assert_eq!(report.stats.count, 2);
    assert!((report.stats.total_area - 3.0).abs() < 1e-6);
    assert!((report.stats.mean().unwrap() - 1.5).abs() < 1e-6);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Bounding box coordinates: (-106.06, 39.46, -106.02, 39.5)");
    assert_eq!(
        lines[1],
        format!("Buildings data saved to: {}", config.output.features.display())
    );
    assert_eq!(lines[2], "Metadata for the selected building:");
    assert!(text.contains("Original CRS: EPSG:4326\n"));
    assert!(text.contains("Projected CRS: EPSG:32613\n"));
    assert!(text.contains("Number of buildings: 2\n"));
    assert!(text.contains("Total area covered by buildings: 3.00 square meters\n"));
    assert!(text.contains("Average area per building: 1.50 square meters\n"));
}

#[test]
fn test_provider_failure_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mut sink = RecordingSink::default();
    let mut out = Vec::new();

    let err = run_with(&config, &FailingProvider, &mut sink, &mut out, |_| {
        let transform: Box<dyn CoordinateTransform> = Box::new(Kilometres);
        Ok(transform)
    })
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FootprintError>(),
        Some(FootprintError::Provider { status: 504, .. })
    ));
    assert!(!config.output.features.exists());
    assert!(sink.scenes.is_empty());
}

#[test]
fn test_missing_boundary_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.input.boundary = dir.path().join("nope.geojson");
    let provider = StubProvider {
        collection: downloaded(),
        requests: RefCell::new(Vec::new()),
    };
    let mut sink = RecordingSink::default();
    let mut out = Vec::new();

    let result = run_with(&config, &provider, &mut sink, &mut out, |_| {
        let transform: Box<dyn CoordinateTransform> = Box::new(Kilometres);
        Ok(transform)
    });
    assert!(result.is_err());
    assert!(provider.requests.borrow().is_empty());
}

#[test]
fn test_empty_download_stops_at_visualization() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let provider = StubProvider {
        collection: FootprintCollection::new(Crs::WGS84),
        requests: RefCell::new(Vec::new()),
    };
    let mut sink = RecordingSink::default();
    let mut out = Vec::new();

    let err = run_with(&config, &provider, &mut sink, &mut out, |_| {
        let transform: Box<dyn CoordinateTransform> = Box::new(Kilometres);
        Ok(transform)
    })
    .unwrap_err();

    assert_eq!(
        err.downcast_ref::<FootprintError>(),
        Some(&FootprintError::NoFeatures)
    );
    // The empty file was still written
    let saved = FootprintCollection::from_geojson_file(&config.output.features).unwrap();
    assert!(saved.is_empty());
}

#[test]
fn test_overpass_payload_through_writer() {
    let payload = json!({
        "elements": [{
            "type": "way", "id": 42, "nodes": [1, 2, 3, 1],
            "geometry": [
                {"lat": 39.47, "lon": -106.05}, {"lat": 39.47, "lon": -106.04},
                {"lat": 39.48, "lon": -106.04}, {"lat": 39.47, "lon": -106.05}
            ],
            "tags": {"building": "yes"}
        }]
    });
    let collection = OsmCollect::parse_response(payload.to_string().as_bytes()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("osm.geojson");
    let mut collection = collection;
    rsfootprint::geometric::writer::save_to_geojson(&mut collection, &path).unwrap();

    let saved = FootprintCollection::from_geojson_file(&path).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved.footprints[0].property("nodes"), Some(&json!("[1, 2, 3, 1]")));
    assert_eq!(saved.footprints[0].property("osmid"), Some(&json!(42)));
}
