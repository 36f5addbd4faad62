use anyhow::{Context, Result};
use geo::{Area, Geometry};
use std::fmt;

use crate::error::FootprintError;
use crate::geo_core::{transform_geometry, CoordinateTransform, Crs};
use crate::geometric::footprint::FootprintCollection;

/// A footprint reprojected into a metric CRS, with its planar area in m²
#[derive(Debug, Clone)]
pub struct ProjectedFootprint {
    pub geometry: Geometry<f64>,
    pub area: f64,
}

/// Footprints reprojected for area measurement
/// Only lives for the duration of a statistics computation.
#[derive(Debug, Clone)]
pub struct ProjectedFootprints {
    pub crs: Crs,
    pub footprints: Vec<ProjectedFootprint>,
}

impl ProjectedFootprints {
    /// Reproject every footprint through `transform` and measure it
    pub fn project(
        collection: &FootprintCollection,
        transform: &dyn CoordinateTransform,
    ) -> Result<Self> {
        let footprints = collection
            .footprints
            .iter()
            .enumerate()
            .map(|(idx, footprint)| {
                let geometry = transform_geometry(&footprint.geometry, transform)
                    .with_context(|| format!("Failed to reproject footprint #{}", idx))?;
                let area = geometry.unsigned_area();
                Ok(ProjectedFootprint { geometry, area })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ProjectedFootprints {
            crs: transform.target_crs(),
            footprints,
        })
    }

    pub fn areas(&self) -> impl Iterator<Item = f64> + '_ {
        self.footprints.iter().map(|f| f.area)
    }
}

/// Area summary of a footprint collection
#[derive(Debug, Clone, PartialEq)]
pub struct FootprintStats {
    pub source_crs: Crs,
    pub projected_crs: Crs,
    pub count: usize,
    /// Sum of per-feature areas in m², full precision
    pub total_area: f64,
    /// None when the collection is empty
    pub mean_area: Option<f64>,
}

impl FootprintStats {
    pub fn from_projected(source_crs: Crs, projected: &ProjectedFootprints) -> Self {
        let count = projected.footprints.len();
        let total_area = projected.areas().fold(0.0, |acc, a| acc + a);
        let mean_area = if count > 0 {
            Some(total_area / count as f64)
        } else {
            None
        };

        FootprintStats {
            source_crs,
            projected_crs: projected.crs,
            count,
            total_area,
            mean_area,
        }
    }

    /// Mean area per footprint; an empty collection has no mean
    pub fn mean(&self) -> Result<f64> {
        self.mean_area
            .ok_or_else(|| FootprintError::EmptyCollection.into())
    }
}

impl fmt::Display for FootprintStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Original CRS: {}", self.source_crs)?;
        writeln!(f, "Projected CRS: {}", self.projected_crs)?;
        writeln!(f, "Number of buildings: {}", self.count)?;
        writeln!(
            f,
            "Total area covered by buildings: {:.2} square meters",
            self.total_area
        )?;
        match self.mean_area {
            Some(mean) => writeln!(f, "Average area per building: {:.2} square meters", mean),
            None => writeln!(f, "Average area per building: undefined (no buildings)"),
        }
    }
}

/// Reproject the collection into the transform's metric CRS and aggregate areas
pub fn calculate_statistics(
    collection: &FootprintCollection,
    transform: &dyn CoordinateTransform,
) -> Result<FootprintStats> {
    log::info!(
        "Reprojecting {} footprints from {} to {}",
        collection.len(),
        collection.crs,
        transform.target_crs()
    );
    let projected = ProjectedFootprints::project(collection, transform)?;
    Ok(FootprintStats::from_projected(collection.crs, &projected))
}
