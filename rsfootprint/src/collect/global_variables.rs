/// Public Overpass API instance
pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Server-side query timeout written into the Overpass query, in seconds
pub const OVERPASS_TIMEOUT_SECS: u64 = 180;

pub const USER_AGENT: &str = concat!("rsfootprint/", env!("CARGO_PKG_VERSION"));

/// OSM key selected when no other tag is configured
pub const DEFAULT_TAG_KEY: &str = "building";
