pub mod osm_collect;
pub mod ring;
