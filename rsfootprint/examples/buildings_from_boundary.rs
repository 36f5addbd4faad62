// Example: download the buildings inside a boundary from the Overpass API,
// save them and print their statistics without rendering.
use anyhow::Result;
use rsfootprint::collect::osm::osm_collect::OsmCollect;
use rsfootprint::config::PipelineConfig;
use rsfootprint::pipeline;
use rsfootprint::render::sink::NullSink;

fn main() -> Result<()> {
    println!("=== Example: OSM buildings inside a boundary ===\n");

    let mut config = PipelineConfig::default();
    if let Some(boundary) = std::env::args().nth(1) {
        config.input.boundary = boundary.into();
    }

    let provider = OsmCollect::public()?;
    let report = pipeline::run(&config, &provider, &mut NullSink)?;

    println!("\nDone: {} buildings in {:?}", report.stats.count, report.saved_to);
    Ok(())
}
