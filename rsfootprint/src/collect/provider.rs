use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::collect::global_variables::DEFAULT_TAG_KEY;
use crate::geo_core::BoundingBox;
use crate::geometric::footprint::FootprintCollection;

/// OSM tag filter: a key, optionally pinned to one value.
/// `building` matches any building, `building=church` only churches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl TagFilter {
    pub fn new(key: impl Into<String>) -> Self {
        TagFilter {
            key: key.into(),
            value: None,
        }
    }

    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        TagFilter {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Overpass QL selector, e.g. `["building"]` or `["building"="church"]`
    pub fn to_overpass(&self) -> String {
        match &self.value {
            Some(value) => format!("[\"{}\"=\"{}\"]", escape(&self.key), escape(value)),
            None => format!("[\"{}\"]", escape(&self.key)),
        }
    }
}

impl Default for TagFilter {
    fn default() -> Self {
        TagFilter::new(DEFAULT_TAG_KEY)
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.key, value),
            None => write!(f, "{}=*", self.key),
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Source of geographic features for a bounding box
///
/// Implemented by [`crate::collect::osm::osm_collect::OsmCollect`] for the
/// live Overpass API; tests supply canned collections.
pub trait FeatureProvider {
    /// Fetch every polygonal feature carrying `tag` inside `bbox`
    fn fetch(&self, bbox: &BoundingBox, tag: &TagFilter) -> Result<FootprintCollection>;
}
