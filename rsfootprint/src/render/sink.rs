use anyhow::Result;
use geo::{BoundingRect, Geometry};

use crate::geo_core::BoundingBox;
use crate::geometric::footprint::FootprintCollection;

/// Fill and edge colours (RGBA)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fill: [u8; 4],
    pub stroke: [u8; 4],
}

impl Style {
    /// Light grey fill with black edges, for context features
    pub const NEUTRAL: Style = Style {
        fill: [211, 211, 211, 255],
        stroke: [0, 0, 0, 255],
    };

    /// Solid red, for the selected feature
    pub const HIGHLIGHT: Style = Style {
        fill: [255, 0, 0, 255],
        stroke: [255, 0, 0, 255],
    };
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub geometries: Vec<Geometry<f64>>,
    pub style: Style,
}

/// Layers drawn bottom to top
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub layers: Vec<Layer>,
}

impl Scene {
    /// Every footprint in neutral style, with the one at `selected` drawn again on top
    pub fn highlight(collection: &FootprintCollection, selected: usize) -> Self {
        let all = collection
            .footprints()
            .iter()
            .map(|f| f.geometry.clone())
            .collect();

        let mut layers = vec![Layer {
            geometries: all,
            style: Style::NEUTRAL,
        }];
        if let Some(footprint) = collection.footprints().get(selected) {
            layers.push(Layer {
                geometries: vec![footprint.geometry.clone()],
                style: Style::HIGHLIGHT,
            });
        }

        Scene { layers }
    }

    /// Extent of every geometry in the scene
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.layers
            .iter()
            .flat_map(|layer| layer.geometries.iter())
            .filter_map(|g| g.bounding_rect().map(BoundingBox::from))
            .reduce(|acc, b| acc.union(&b))
    }
}

/// Where the visualizer sends its scene
pub trait DisplaySink {
    fn show(&mut self, scene: &Scene) -> Result<()>;
}

/// Discards scenes; used for headless runs
#[derive(Debug, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn show(&mut self, scene: &Scene) -> Result<()> {
        log::debug!("Discarding scene with {} layers", scene.layers.len());
        Ok(())
    }
}

#[cfg(feature = "png")]
pub use png::PngSink;

#[cfg(feature = "png")]
mod png {
    use anyhow::{Context, Result};
    use geo::{Geometry, LineString, Polygon};
    use image::{Rgba, RgbaImage};
    use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
    use imageproc::point::Point;
    use std::path::PathBuf;

    use super::{DisplaySink, Scene};
    use crate::geo_core::BoundingBox;

    const MARGIN_PX: f64 = 10.0;
    const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

    /// Rasterises the scene into a PNG file
    pub struct PngSink {
        path: PathBuf,
        width: u32,
        height: u32,
    }

    impl PngSink {
        pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
            PngSink {
                path: path.into(),
                width: width.max(1),
                height: height.max(1),
            }
        }

        pub fn render(&self, scene: &Scene) -> RgbaImage {
            let mut img = RgbaImage::from_pixel(self.width, self.height, BACKGROUND);
            let Some(bounds) = scene.bounds() else {
                return img;
            };
            let viewport = Viewport::fit(&bounds, self.width, self.height);

            for layer in &scene.layers {
                let fill = Rgba(layer.style.fill);
                let stroke = Rgba(layer.style.stroke);
                for geometry in &layer.geometries {
                    for polygon in polygons(geometry) {
                        fill_ring(&mut img, &viewport, polygon.exterior(), fill);
                        // Holes are punched back to the background
                        for interior in polygon.interiors() {
                            fill_ring(&mut img, &viewport, interior, BACKGROUND);
                        }
                        stroke_ring(&mut img, &viewport, polygon.exterior(), stroke);
                        for interior in polygon.interiors() {
                            stroke_ring(&mut img, &viewport, interior, stroke);
                        }
                    }
                }
            }

            img
        }
    }

    impl DisplaySink for PngSink {
        fn show(&mut self, scene: &Scene) -> Result<()> {
            let img = self.render(scene);
            img.save(&self.path)
                .with_context(|| format!("Failed to write PNG file: {:?}", self.path))?;
            log::info!("Rendered selected building to {:?}", self.path);
            Ok(())
        }
    }

    fn polygons(geometry: &Geometry<f64>) -> Vec<&Polygon<f64>> {
        match geometry {
            Geometry::Polygon(p) => vec![p],
            Geometry::MultiPolygon(mp) => mp.0.iter().collect(),
            _ => vec![],
        }
    }

    /// Map from data coordinates to pixels, preserving aspect ratio, y up
    struct Viewport {
        origin_x: f64,
        origin_y: f64,
        scale: f64,
        height: f64,
    }

    impl Viewport {
        fn fit(bounds: &BoundingBox, width: u32, height: u32) -> Self {
            let usable_w = (width as f64 - 2.0 * MARGIN_PX).max(1.0);
            let usable_h = (height as f64 - 2.0 * MARGIN_PX).max(1.0);
            let span_x = bounds.width().max(f64::EPSILON);
            let span_y = bounds.height().max(f64::EPSILON);
            let scale = (usable_w / span_x).min(usable_h / span_y);

            // Centre the drawing in the image
            let pad_x = (width as f64 - span_x * scale) / 2.0;
            let pad_y = (height as f64 - span_y * scale) / 2.0;

            Viewport {
                origin_x: bounds.min_x - pad_x / scale,
                origin_y: bounds.min_y - pad_y / scale,
                scale,
                height: height as f64,
            }
        }

        fn to_px(&self, x: f64, y: f64) -> (f32, f32) {
            let px = (x - self.origin_x) * self.scale;
            let py = self.height - (y - self.origin_y) * self.scale;
            (px as f32, py as f32)
        }

        // Open pixel ring: no repeated neighbours, last point differs from the first
        fn ring_points(&self, ring: &LineString<f64>) -> Vec<Point<i32>> {
            let mut points: Vec<Point<i32>> = ring
                .coords()
                .map(|c| {
                    let (x, y) = self.to_px(c.x, c.y);
                    Point::new(x.round() as i32, y.round() as i32)
                })
                .collect();
            points.dedup();
            while points.len() > 1 && points.first() == points.last() {
                points.pop();
            }
            points
        }
    }

    fn fill_ring(
        img: &mut RgbaImage,
        viewport: &Viewport,
        ring: &LineString<f64>,
        color: Rgba<u8>,
    ) {
        let points = viewport.ring_points(ring);
        // Degenerate at this scale; the stroke still marks it
        if points.len() >= 3 {
            draw_polygon_mut(img, &points, color);
        }
    }

    fn stroke_ring(
        img: &mut RgbaImage,
        viewport: &Viewport,
        ring: &LineString<f64>,
        color: Rgba<u8>,
    ) {
        for line in ring.lines() {
            let start = viewport.to_px(line.start.x, line.start.y);
            let end = viewport.to_px(line.end.x, line.end.y);
            draw_line_segment_mut(img, start, end, color);
        }
    }

}
