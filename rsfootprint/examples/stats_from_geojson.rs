// Example: area statistics of an existing footprint file
// Usage: cargo run --example stats_from_geojson -- buildings_osm.geojson 32613
use anyhow::{Context, Result};
use rsfootprint::geo_core::{Crs, Projection};
use rsfootprint::geometric::footprint::FootprintCollection;
use rsfootprint::geometric::stats::calculate_statistics;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "buildings_osm.geojson".to_string());
    let epsg: i32 = args
        .next()
        .map(|s| s.parse())
        .transpose()
        .context("EPSG code must be an integer")?
        .unwrap_or(32613);

    println!("=== Example: area statistics from GeoJSON ===\n");

    let collection = FootprintCollection::from_geojson_file(&path)?;
    println!("Buildings loaded: {}", collection.len());

    let projection = Projection::new(collection.crs, Crs::new(epsg))?;
    let stats = calculate_statistics(&collection, &projection)?;
    print!("{}", stats);

    Ok(())
}
