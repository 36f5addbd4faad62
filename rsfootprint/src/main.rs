use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use rsfootprint::collect::osm::osm_collect::OsmCollect;
use rsfootprint::config::PipelineConfig;
use rsfootprint::pipeline;
use rsfootprint::render::sink::{DisplaySink, NullSink};

/// Download OSM building footprints inside a boundary, save them as
/// GeoJSON and report their areas.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration; defaults are used when the file does not exist
    #[arg(short, long, value_name = "FILE", default_value = "rsfootprint.toml")]
    config: PathBuf,

    /// Boundary GeoJSON file
    #[arg(short, long, value_name = "FILE")]
    boundary: Option<PathBuf>,

    /// Output GeoJSON file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// EPSG code of the metric CRS used for areas
    #[arg(long, value_name = "EPSG")]
    target_epsg: Option<i32>,

    /// PNG file for the highlighted building
    #[arg(long, value_name = "FILE", conflicts_with = "no_render")]
    render: Option<PathBuf>,

    /// Skip rendering even if the configuration asks for it
    #[arg(long)]
    no_render: bool,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = if self.config.exists() {
            PipelineConfig::load_from_file(&self.config)?
        } else {
            log::info!("No config file at {:?}, using defaults", self.config);
            PipelineConfig::default()
        };

        if let Some(boundary) = self.boundary {
            config.input.boundary = boundary;
        }
        if let Some(output) = self.output {
            config.output.features = output;
        }
        if let Some(epsg) = self.target_epsg {
            config.stats.target_epsg = epsg;
        }
        if self.render.is_some() {
            config.output.render = self.render;
        }
        if self.no_render {
            config.output.render = None;
        }

        Ok(config)
    }
}

fn display_sink(config: &PipelineConfig) -> Box<dyn DisplaySink> {
    match &config.output.render {
        #[cfg(feature = "png")]
        Some(path) => Box::new(rsfootprint::render::sink::PngSink::new(
            path.clone(),
            config.output.render_width,
            config.output.render_height,
        )),
        #[cfg(not(feature = "png"))]
        Some(path) => {
            log::warn!("Built without PNG support, not rendering {:?}", path);
            Box::new(NullSink)
        }
        None => Box::new(NullSink),
    }
}

fn main() -> Result<()> {
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = Cli::parse().into_config()?;
    let provider = OsmCollect::new(config.provider.url.clone(), config.provider.timeout_secs)?;
    let mut sink = display_sink(&config);

    pipeline::run(&config, &provider, sink.as_mut())?;

    Ok(())
}
