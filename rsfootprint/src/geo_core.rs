use anyhow::{Context, Result};
use geo::{coord, Coord, Geometry, MapCoords, Rect};
use proj::Proj;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FootprintError;

/// Coordinate reference system identified by its EPSG code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: i32,
}

impl Crs {
    /// WGS84 geographic coordinates, the CRS of every GeoJSON file we read
    pub const WGS84: Crs = Crs { epsg: 4326 };

    pub fn new(epsg: i32) -> Self {
        Crs { epsg }
    }

    /// Name used by PROJ, e.g. `EPSG:32613`
    pub fn proj_name(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }

    /// Named-CRS URN written in the `crs` member of a GeoJSON file
    pub fn urn(&self) -> String {
        if self.epsg == 4326 {
            "urn:ogc:def:crs:OGC:1.3:CRS84".to_string()
        } else {
            format!("urn:ogc:def:crs:EPSG::{}", self.epsg)
        }
    }

    /// Parse a CRS name as found in a GeoJSON `crs` member.
    /// Accepts `EPSG:xxxx`, `urn:ogc:def:crs:EPSG::xxxx` and the CRS84 URN.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with("CRS84") {
            return Some(Crs::WGS84);
        }
        let code = name.rsplit(':').next()?;
        code.parse().ok().map(Crs::new)
    }
}

impl Default for Crs {
    fn default() -> Self {
        Crs::WGS84
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

/// Bounding box structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64, // min longitude
    pub min_y: f64, // min latitude
    pub max_x: f64, // max longitude
    pub max_y: f64, // max latitude
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build a box, rejecting non-finite values and inverted axes
    pub fn try_new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        let bbox = BoundingBox::new(min_x, min_y, max_x, max_y);
        if !bbox.is_valid() {
            return Err(FootprintError::InvalidBoundingBox {
                min_x,
                min_y,
                max_x,
                max_y,
            }
            .into());
        }
        Ok(bbox)
    }

    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Grow the box so it also covers `other`
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Floats keep their decimal point: (0.0, 0.0, 1.0, 1.0)
        write!(
            f,
            "({:?}, {:?}, {:?}, {:?})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// A point-wise coordinate conversion between two CRS
pub trait CoordinateTransform {
    /// CRS the output coordinates are expressed in
    fn target_crs(&self) -> Crs;

    fn convert(&self, xy: (f64, f64)) -> Result<(f64, f64)>;
}

/// PROJ-backed transformation between two EPSG codes
pub struct Projection {
    to: Crs,
    proj: Proj,
}

impl Projection {
    pub fn new(from: Crs, to: Crs) -> Result<Self> {
        let proj = Proj::new_known_crs(&from.proj_name(), &to.proj_name(), None)
            .with_context(|| format!("Failed to create Proj transformation {} -> {}", from, to))?;

        Ok(Projection { to, proj })
    }
}

impl CoordinateTransform for Projection {
    fn target_crs(&self) -> Crs {
        self.to
    }

    fn convert(&self, xy: (f64, f64)) -> Result<(f64, f64)> {
        self.proj
            .convert(xy)
            .context("Failed to transform coordinates")
    }
}

/// Reproject every coordinate of a geometry
pub fn transform_geometry(
    geometry: &Geometry<f64>,
    transform: &dyn CoordinateTransform,
) -> Result<Geometry<f64>> {
    geometry.try_map_coords(|c| -> Result<Coord<f64>> {
        let (x, y) = transform.convert((c.x, c.y))?;
        Ok(coord! { x: x, y: y })
    })
}
