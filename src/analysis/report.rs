//! Area report: regions clipped to the boundary, totalled by label
//!
//! Every polygon is rasterized on the full-resolution image grid so the
//! figures do not depend on the preview size or zoom level. Overlaps and
//! concave or self-intersecting outlines are resolved by pixel coverage.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::calibration::{Calibration, format_general};
use crate::domain::{AnnotationSet, MIN_POLYGON_VERTICES};
use crate::error::GeometryError;
use crate::render::mask::{BoolMask, PixelWindow};

/// Totals for one label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelTotal {
    pub label: String,
    /// Regions with a non-empty clipped area
    pub count: usize,
    /// Clipped pixel area summed over the label's regions
    pub total_px: u64,
    /// `total_px` as a percentage of the boundary area
    pub percent_of_boundary: f64,
    /// Physical area when calibrated
    pub area: Option<f64>,
}

/// Result of an area report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaReport {
    /// Raster grid (width, height)
    pub grid: (u32, u32),
    pub boundary_area_px: u64,
    pub boundary_area: Option<f64>,
    /// Physical area unit, e.g. "mm²"
    pub area_unit: Option<String>,
    /// One row per label, sorted by label name
    pub totals: Vec<LabelTotal>,
}

/// Grid the report rasterizes on
///
/// The source image size when known, otherwise the maximum boundary and
/// region coordinates padded by 2 px.
pub fn raster_grid(set: &AnnotationSet) -> Result<(u32, u32), GeometryError> {
    if let Some(size) = set.image.dimensions() {
        return Ok(size);
    }
    let bounds = set.geometry_bounds().ok_or(GeometryError::NoGeometry)?;
    let side = |max: f64| (max.trunc() + 2.0).clamp(2.0, u32::MAX as f64) as u32;
    let grid = (side(bounds.max_x), side(bounds.max_y));
    log::debug!("Image size unknown, using {}x{} grid from geometry", grid.0, grid.1);
    Ok(grid)
}

/// Build the area report for an annotation set
///
/// Needs a boundary with at least 3 vertices and at least one region.
/// The set is only read.
pub fn generate_report(set: &AnnotationSet) -> Result<AreaReport, GeometryError> {
    let boundary = set
        .boundary
        .as_ref()
        .filter(|b| b.is_complete())
        .ok_or(GeometryError::NoBoundary)?;
    if set.regions.is_empty() {
        return Err(GeometryError::NoRegions);
    }

    let grid = raster_grid(set)?;

    // Clipping makes anything outside the boundary's pixel window irrelevant
    let bounds = crate::domain::Bounds::of(&boundary.vertices).ok_or(GeometryError::NoBoundary)?;
    let window = PixelWindow::around(&bounds, grid).ok_or(GeometryError::EmptyBoundary)?;

    let boundary_mask = BoolMask::rasterize(&boundary.vertices, window)?;
    let boundary_area_px = boundary_mask.count();
    if boundary_area_px == 0 {
        return Err(GeometryError::EmptyBoundary);
    }

    let mut by_label: BTreeMap<&str, (usize, u64)> = BTreeMap::new();
    for region in &set.regions {
        if region.vertices.len() < MIN_POLYGON_VERTICES {
            continue;
        }
        let mut clipped = BoolMask::rasterize(&region.vertices, window)?;
        clipped.intersect_with(&boundary_mask);
        let area_px = clipped.count();
        if area_px == 0 {
            continue;
        }
        let entry = by_label.entry(region.label.as_str()).or_default();
        entry.0 += 1;
        entry.1 += area_px;
    }

    let calibration = Calibration::from_scale(set.scale.as_ref());
    let totals = by_label
        .into_iter()
        .map(|(label, (count, total_px))| LabelTotal {
            label: label.to_string(),
            count,
            total_px,
            percent_of_boundary: 100.0 * total_px as f64 / boundary_area_px as f64,
            area: calibration.as_ref().map(|c| c.area(total_px as f64)),
        })
        .collect::<Vec<_>>();

    log::info!(
        "Report on {}x{} grid: boundary {} px, {} labels",
        grid.0,
        grid.1,
        boundary_area_px,
        totals.len()
    );

    Ok(AreaReport {
        grid,
        boundary_area_px,
        boundary_area: calibration.as_ref().map(|c| c.area(boundary_area_px as f64)),
        area_unit: calibration.as_ref().map(Calibration::area_unit),
        totals,
    })
}

impl fmt::Display for AreaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Boundary area (px): {}", self.boundary_area_px)?;
        if let (Some(area), Some(unit)) = (self.boundary_area, &self.area_unit) {
            writeln!(f, "Boundary area ({}): {}", unit, format_general(area))?;
        }
        writeln!(f)?;
        write!(f, "Totals by Region type (clipped to boundary):")?;

        if self.totals.is_empty() {
            write!(f, "\n  (No region area fell within the boundary.)")?;
        }
        for row in &self.totals {
            write!(
                f,
                "\n  {:15}  count={:3}  total_px={:8}  %boundary={:6.2}%",
                row.label, row.count, row.total_px, row.percent_of_boundary
            )?;
            if let (Some(area), Some(unit)) = (row.area, &self.area_unit) {
                write!(f, "  area={} {}", format_general(area), unit)?;
            }
        }
        Ok(())
    }
}
