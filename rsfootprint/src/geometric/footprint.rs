use anyhow::{Context, Result};
use geo::Geometry;
use geojson::{Feature, FeatureCollection, GeoJson};
use serde_json::{json, Map, Value};
use std::path::Path;

use crate::error::FootprintError;
use crate::geo_core::Crs;

/// A single building footprint: a polygonal geometry and its attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    /// Polygon or MultiPolygon
    pub geometry: Geometry<f64>,
    /// Attribute name to value, heterogeneous (strings, numbers, arrays...)
    pub properties: Map<String, Value>,
}

impl Footprint {
    pub fn new(geometry: Geometry<f64>) -> Self {
        Footprint {
            geometry,
            properties: Map::new(),
        }
    }

    pub fn with_properties(geometry: Geometry<f64>, properties: Map<String, Value>) -> Self {
        Footprint {
            geometry,
            properties,
        }
    }

    /// Set one attribute, replacing any previous value
    pub fn set_property(&mut self, key: impl Into<String>, value: Value) {
        self.properties.insert(key.into(), value);
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Geometry type name as written in GeoJSON
    pub fn geometry_type(&self) -> &'static str {
        match self.geometry {
            Geometry::Point(_) => "Point",
            Geometry::Line(_) | Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => "Polygon",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::GeometryCollection(_) => "GeometryCollection",
        }
    }

    fn to_feature(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: None,
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }

    /// Convert a GeoJSON feature; returns None when the geometry is not polygonal
    fn from_feature(feature: &Feature) -> Result<Option<Self>> {
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or(FootprintError::MissingGeometry)?;

        let geometry: Geometry<f64> = geometry
            .try_into()
            .context("Failed to convert GeoJSON geometry to geo::Geometry")?;

        if !is_polygonal(&geometry) {
            return Ok(None);
        }

        Ok(Some(Footprint::with_properties(
            geometry,
            feature.properties.clone().unwrap_or_default(),
        )))
    }
}

pub fn is_polygonal(geometry: &Geometry<f64>) -> bool {
    matches!(geometry, Geometry::Polygon(_) | Geometry::MultiPolygon(_))
}

/// Ordered collection of footprints sharing one CRS
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FootprintCollection {
    pub crs: Crs,
    pub footprints: Vec<Footprint>,
}

impl FootprintCollection {
    pub fn new(crs: Crs) -> Self {
        FootprintCollection {
            crs,
            footprints: Vec::new(),
        }
    }

    pub fn add_footprint(&mut self, footprint: Footprint) {
        self.footprints.push(footprint);
    }

    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }

    pub fn footprints(&self) -> &[Footprint] {
        &self.footprints
    }

    pub fn first(&self) -> Option<&Footprint> {
        self.footprints.first()
    }

    /// Load footprints from GeoJSON bytes (Feature or FeatureCollection).
    /// Features whose geometry is not a Polygon/MultiPolygon are skipped.
    pub fn from_geojson(geojson_data: &[u8]) -> Result<Self> {
        let geojson_str =
            std::str::from_utf8(geojson_data).context("GeoJSON data is not valid UTF-8")?;
        let geojson: GeoJson = geojson_str.parse().context("Failed to parse GeoJSON")?;

        let (crs, features) = match geojson {
            GeoJson::FeatureCollection(fc) => (crs_from_foreign_members(&fc), fc.features),
            GeoJson::Feature(f) => (Crs::WGS84, vec![f]),
            GeoJson::Geometry(_) => {
                anyhow::bail!("GeoJSON must be a Feature or FeatureCollection");
            }
        };

        let mut collection = FootprintCollection::new(crs);
        for (idx, feature) in features.iter().enumerate() {
            match Footprint::from_feature(feature) {
                Ok(Some(footprint)) => collection.add_footprint(footprint),
                Ok(None) => log::debug!("Skipping non-polygonal feature #{}", idx),
                Err(e) => log::warn!("Failed to process feature #{}: {:#}", idx, e),
            }
        }

        Ok(collection)
    }

    pub fn from_geojson_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read GeoJSON file: {:?}", path))?;
        Self::from_geojson(&data).with_context(|| format!("Invalid GeoJSON file: {:?}", path))
    }

    /// Build a GeoJSON FeatureCollection carrying the CRS as a named-CRS member
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let mut foreign_members = Map::new();
        foreign_members.insert(
            "crs".to_string(),
            json!({ "type": "name", "properties": { "name": self.crs.urn() } }),
        );

        FeatureCollection {
            bbox: None,
            features: self.footprints.iter().map(Footprint::to_feature).collect(),
            foreign_members: Some(foreign_members),
        }
    }

    pub fn to_geojson_string(&self) -> String {
        GeoJson::from(self.to_feature_collection()).to_string()
    }
}

fn crs_from_foreign_members(fc: &FeatureCollection) -> Crs {
    fc.foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.pointer("/properties/name"))
        .and_then(Value::as_str)
        .and_then(Crs::from_name)
        .unwrap_or_default()
}
