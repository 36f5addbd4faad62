use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::collect::global_variables::{DEFAULT_TAG_KEY, OVERPASS_TIMEOUT_SECS, OVERPASS_URL};
use crate::collect::provider::TagFilter;
use crate::geo_core::Crs;

/// UTM zone 13N, covering the Colorado Rockies
pub const DEFAULT_TARGET_EPSG: i32 = 32613;

/// Pipeline settings, read from a TOML file; every field has a default
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub provider: ProviderConfig,
    pub stats: StatsConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// GeoJSON file whose first feature delimits the download area
    pub boundary: PathBuf,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// GeoJSON file receiving the downloaded footprints
    pub features: PathBuf,
    /// PNG of the highlighted building; skipped when unset
    pub render: Option<PathBuf>,
    pub render_width: u32,
    pub render_height: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub url: String,
    pub tag_key: String,
    pub tag_value: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StatsConfig {
    /// Metric CRS used for area measurement
    pub target_epsg: i32,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            boundary: PathBuf::from("boundary.geojson"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            features: PathBuf::from("buildings_osm.geojson"),
            render: None,
            render_width: 1024,
            render_height: 768,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            url: OVERPASS_URL.to_string(),
            tag_key: DEFAULT_TAG_KEY.to_string(),
            tag_value: None,
            timeout_secs: OVERPASS_TIMEOUT_SECS,
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        StatsConfig {
            target_epsg: DEFAULT_TARGET_EPSG,
        }
    }
}

impl PipelineConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: PipelineConfig =
            toml::from_str(&content).context("Failed to parse TOML configuration")?;
        Ok(config)
    }

    pub fn tag(&self) -> TagFilter {
        TagFilter {
            key: self.provider.tag_key.clone(),
            value: self.provider.tag_value.clone(),
        }
    }

    pub fn target_crs(&self) -> Crs {
        Crs::new(self.stats.target_epsg)
    }
}
