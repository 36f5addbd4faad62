use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

use crate::collect::provider::FeatureProvider;
use crate::config::PipelineConfig;
use crate::geo_core::{BoundingBox, CoordinateTransform, Crs, Projection};
use crate::geometric::bounds::bounds_from_geojson_file;
use crate::geometric::stats::{calculate_statistics, FootprintStats};
use crate::geometric::writer::save_to_geojson;
use crate::render::sink::DisplaySink;
use crate::render::visualize::load_and_plot;

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub bbox: BoundingBox,
    pub saved_to: PathBuf,
    pub stats: FootprintStats,
}

/// Run the whole pipeline, printing to stdout and measuring areas through
/// PROJ in the configured metric CRS.
pub fn run(
    config: &PipelineConfig,
    provider: &dyn FeatureProvider,
    sink: &mut dyn DisplaySink,
) -> Result<PipelineReport> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with(config, provider, sink, &mut out, |source| {
        let projection: Box<dyn CoordinateTransform> =
            Box::new(Projection::new(source, config.target_crs())?);
        Ok(projection)
    })
}

/// Bounds, download, save, visualize, then statistics.
/// The first failing step aborts the run.
pub fn run_with<F>(
    config: &PipelineConfig,
    provider: &dyn FeatureProvider,
    sink: &mut dyn DisplaySink,
    out: &mut dyn Write,
    make_transform: F,
) -> Result<PipelineReport>
where
    F: FnOnce(Crs) -> Result<Box<dyn CoordinateTransform>>,
{
    let bbox = bounds_from_geojson_file(&config.input.boundary)?;
    writeln!(out, "Bounding box coordinates: {}", bbox)?;

    let tag = config.tag();
    log::info!("Downloading {} features inside {}", tag, bbox);
    let mut footprints = provider
        .fetch(&bbox, &tag)
        .context("Failed to download features")?;

    let output_file = &config.output.features;
    save_to_geojson(&mut footprints, output_file)?;
    writeln!(out, "Buildings data saved to: {}", output_file.display())?;

    load_and_plot(output_file, sink, out)?;

    let transform = make_transform(footprints.crs)?;
    let stats = calculate_statistics(&footprints, transform.as_ref())?;
    write!(out, "{}", stats)?;

    Ok(PipelineReport {
        bbox,
        saved_to: output_file.clone(),
        stats,
    })
}
