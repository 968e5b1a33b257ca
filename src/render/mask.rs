//! Boolean polygon rasterization
//!
//! Polygons are filled with the non-zero winding rule and no anti-aliasing,
//! so a pixel is either inside or outside. Masks cover a window of the image
//! grid; pixels outside the window are treated as outside every polygon.

use image::{GrayImage, Luma};
use tiny_skia::{FillRule, Mask, PathBuilder, Transform};

use crate::domain::{AnnotationSet, Bounds, Point};
use crate::error::GeometryError;

/// Rectangle of the pixel grid, in whole pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelWindow {
    /// The whole `width` x `height` grid
    pub fn full((width, height): (u32, u32)) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Pixels of the grid that can have their centre inside `bounds`
    ///
    /// Returns None when the bounds miss the grid entirely.
    pub fn around(bounds: &Bounds, (width, height): (u32, u32)) -> Option<Self> {
        let clamp = |v: f64, max: u32| v.clamp(0.0, max as f64) as u32;
        let x0 = clamp(bounds.min_x.floor(), width);
        let y0 = clamp(bounds.min_y.floor(), height);
        let x1 = clamp(bounds.max_x.ceil(), width);
        let y1 = clamp(bounds.max_y.ceil(), height);
        (x1 > x0 && y1 > y0).then_some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        let (dx, dy) = (x.checked_sub(self.x)?, y.checked_sub(self.y)?);
        (dx < self.width && dy < self.height)
            .then(|| dy as usize * self.width as usize + dx as usize)
    }
}

/// Inside/outside flags for every pixel of a window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolMask {
    window: PixelWindow,
    bits: Vec<bool>,
}

impl BoolMask {
    /// Mask with every pixel outside
    pub fn empty(window: PixelWindow) -> Self {
        Self {
            window,
            bits: vec![false; window.len()],
        }
    }

    /// Fill a closed polygon
    ///
    /// Uses the non-zero winding rule. Pixels along edges follow tiny-skia's
    /// non-anti-aliased scan conversion, so they can differ from an exact
    /// pixel-centre test. Polygons with fewer than 3 vertices cover nothing.
    pub fn rasterize(points: &[Point], window: PixelWindow) -> Result<Self, GeometryError> {
        let mut mask = Self::empty(window);
        if points.len() < 3 || window.is_empty() {
            return Ok(mask);
        }

        let mut pb = PathBuilder::new();
        pb.move_to(points[0].x as f32, points[0].y as f32);
        for p in &points[1..] {
            pb.line_to(p.x as f32, p.y as f32);
        }
        pb.close();
        let Some(path) = pb.finish() else {
            return Ok(mask);
        };

        let mut raster = Mask::new(window.width, window.height).ok_or(
            GeometryError::RasterUnavailable {
                width: window.width,
                height: window.height,
            },
        )?;
        let transform = Transform::from_translate(-(window.x as f32), -(window.y as f32));
        raster.fill_path(&path, FillRule::Winding, false, transform);

        for (bit, &coverage) in mask.bits.iter_mut().zip(raster.data()) {
            *bit = coverage != 0;
        }
        Ok(mask)
    }

    /// Whether the pixel at absolute grid position (x, y) is inside
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.window.index(x, y).is_some_and(|i| self.bits[i])
    }

    /// Number of inside pixels
    pub fn count(&self) -> u64 {
        self.bits.iter().filter(|&&b| b).count() as u64
    }

    /// Pixel-wise OR; both masks must share a window
    pub fn union_with(&mut self, other: &BoolMask) {
        debug_assert_eq!(self.window, other.window);
        for (a, b) in self.bits.iter_mut().zip(&other.bits) {
            *a |= *b;
        }
    }

    /// Pixel-wise AND; both masks must share a window
    pub fn intersect_with(&mut self, other: &BoolMask) {
        debug_assert_eq!(self.window, other.window);
        for (a, b) in self.bits.iter_mut().zip(&other.bits) {
            *a &= *b;
        }
    }

    /// Union of several polygons
    pub fn rasterize_union<'a>(
        polygons: impl IntoIterator<Item = &'a [Point]>,
        window: PixelWindow,
    ) -> Result<Self, GeometryError> {
        let mut union = Self::empty(window);
        for points in polygons {
            union.union_with(&Self::rasterize(points, window)?);
        }
        Ok(union)
    }
}

/// Union of all regions with `label` over the whole grid, 255 inside
pub fn label_mask(
    set: &AnnotationSet,
    label: &str,
    size: (u32, u32),
) -> Result<GrayImage, GeometryError> {
    let polygons = set
        .regions
        .iter()
        .filter(|r| r.label == label)
        .map(|r| r.vertices.as_slice());
    let mask = BoolMask::rasterize_union(polygons, PixelWindow::full(size))?;
    log::debug!("Mask for {}: {} px", label, mask.count());

    let (width, height) = size;
    Ok(GrayImage::from_fn(width, height, |x, y| {
        Luma([if mask.get(x, y) { 255 } else { 0 }])
    }))
}
