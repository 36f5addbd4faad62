pub mod global_variables;
pub mod osm;
pub mod provider;
