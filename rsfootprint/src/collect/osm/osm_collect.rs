use anyhow::{Context, Result};
use geo::{coord, Coord, Geometry, LineString, MultiPolygon, Polygon};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::collect::global_variables::{OVERPASS_TIMEOUT_SECS, OVERPASS_URL, USER_AGENT};
use crate::collect::osm::ring::{assemble_rings, rings_to_polygons};
use crate::collect::provider::{FeatureProvider, TagFilter};
use crate::error::FootprintError;
use crate::geo_core::{BoundingBox, Crs};
use crate::geometric::footprint::{Footprint, FootprintCollection};

/// Overpass API response (`[out:json]`)
#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
    /// Set by the server when the query was cut short (timeout, memory)
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OverpassElement {
    Node {
        id: i64,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        geometry: Vec<Option<LatLon>>,
        #[serde(default)]
        tags: Map<String, Value>,
    },
    Relation {
        id: i64,
        #[serde(default)]
        members: Vec<RelationMember>,
        #[serde(default)]
        tags: Map<String, Value>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct RelationMember {
    #[serde(rename = "type")]
    member_type: String,
    #[serde(rename = "ref")]
    reference: i64,
    #[serde(default)]
    role: String,
    #[serde(default)]
    geometry: Vec<Option<LatLon>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

/// OpenStreetMap feature collection through the Overpass API
///
/// Ways and multipolygon relations carrying the requested tag are turned
/// into footprints; each one keeps its OSM tags plus `element_type`,
/// `osmid` and the id list it was built from (`nodes` or `ways`).
pub struct OsmCollect {
    url: String,
    timeout_secs: u64,
    client: Client,
}

impl OsmCollect {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        // The Overpass server enforces `timeout_secs`; the client waits for it
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None::<Duration>)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(OsmCollect {
            url: url.into(),
            timeout_secs,
            client,
        })
    }

    /// Client for the public Overpass instance
    pub fn public() -> Result<Self> {
        Self::new(OVERPASS_URL, OVERPASS_TIMEOUT_SECS)
    }

    /// Overpass QL for every way/relation carrying `tag` inside `bbox`,
    /// with inline geometry.
    pub fn build_query(bbox: &BoundingBox, tag: &TagFilter, timeout_secs: u64) -> String {
        // Overpass bbox order: south, west, north, east
        let area = format!(
            "({},{},{},{})",
            bbox.min_y, bbox.min_x, bbox.max_y, bbox.max_x
        );
        let selector = tag.to_overpass();
        format!(
            "[out:json][timeout:{}];(way{}{};relation{}{};);out geom;",
            timeout_secs, selector, area, selector, area
        )
    }

    fn execute(&self, query: &str) -> Result<Vec<u8>> {
        log::info!("Overpass request: {}", self.url);
        log::debug!("Overpass query: {}", query);

        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query)])
            .send()
            .context("Failed to send request to Overpass API")?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(FootprintError::Provider { status, body }.into());
        }

        let content = response
            .bytes()
            .context("Failed to read Overpass response body")?
            .to_vec();

        Ok(content)
    }

    /// Convert an Overpass JSON response into a WGS84 footprint collection
    pub fn parse_response(content: &[u8]) -> Result<FootprintCollection> {
        let response: OverpassResponse =
            serde_json::from_slice(content).context("Failed to parse Overpass JSON response")?;

        if let Some(remark) = &response.remark {
            log::warn!("Overpass remark: {}", remark);
        }

        let mut collection = FootprintCollection::new(Crs::WGS84);
        let mut skipped = 0usize;

        for element in response.elements {
            match element_to_footprint(element) {
                Some(footprint) => collection.add_footprint(footprint),
                None => skipped += 1,
            }
        }

        log::info!(
            "Overpass returned {} footprints ({} elements skipped)",
            collection.len(),
            skipped
        );

        Ok(collection)
    }
}

impl FeatureProvider for OsmCollect {
    fn fetch(&self, bbox: &BoundingBox, tag: &TagFilter) -> Result<FootprintCollection> {
        let query = Self::build_query(bbox, tag, self.timeout_secs);
        let content = self.execute(&query)?;
        Self::parse_response(&content)
    }
}

fn element_to_footprint(element: OverpassElement) -> Option<Footprint> {
    match element {
        OverpassElement::Way {
            id,
            nodes,
            geometry,
            tags,
        } => {
            let closed = nodes.len() >= 4 && nodes.first() == nodes.last();
            if !closed {
                log::debug!("Skipping open way {}", id);
                return None;
            }
            let ring = to_coords(&geometry)?;
            let polygon = Polygon::new(LineString::from(ring), vec![]);

            let mut properties = base_properties("way", id, tags);
            properties.insert(
                "nodes".to_string(),
                Value::Array(nodes.into_iter().map(Value::from).collect()),
            );
            Some(Footprint::with_properties(polygon.into(), properties))
        }
        OverpassElement::Relation { id, members, tags } => {
            if tags.get("type").and_then(Value::as_str) != Some("multipolygon") {
                log::debug!("Skipping relation {} (not a multipolygon)", id);
                return None;
            }

            let mut outers = Vec::new();
            let mut inners = Vec::new();
            let mut way_ids = Vec::new();
            for member in members.iter().filter(|m| m.member_type == "way") {
                way_ids.push(Value::from(member.reference));
                let Some(coords) = to_coords(&member.geometry) else {
                    continue;
                };
                if member.role == "inner" {
                    inners.push(coords);
                } else {
                    outers.push(coords);
                }
            }

            let mut polygons = rings_to_polygons(assemble_rings(outers), assemble_rings(inners));
            let geometry: Geometry<f64> = match polygons.len() {
                0 => {
                    log::debug!("Skipping relation {} (no closed outer ring)", id);
                    return None;
                }
                1 => polygons.remove(0).into(),
                _ => MultiPolygon::new(polygons).into(),
            };

            let mut properties = base_properties("relation", id, tags);
            properties.insert("ways".to_string(), Value::Array(way_ids));
            Some(Footprint::with_properties(geometry, properties))
        }
        OverpassElement::Node { id } => {
            log::debug!("Skipping node {} (not polygonal)", id);
            None
        }
        OverpassElement::Other => None,
    }
}

fn base_properties(element_type: &str, id: i64, tags: Map<String, Value>) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "element_type".to_string(),
        Value::String(element_type.to_string()),
    );
    properties.insert("osmid".to_string(), Value::from(id));
    properties.extend(tags);
    properties
}

// None when any vertex lacks coordinates
fn to_coords(geometry: &[Option<LatLon>]) -> Option<Vec<Coord<f64>>> {
    geometry
        .iter()
        .map(|p| p.map(|p| coord! { x: p.lon, y: p.lat }))
        .collect()
}
