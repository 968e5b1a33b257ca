//! On-disk shapes of annotation files
//!
//! These mirror the JSON layout exactly and are converted to and from the
//! domain types in the parent module.

use serde::{Deserialize, Serialize};

use crate::domain::{BOUNDARY_LABEL, Point, Rgba};

/// Current annotation file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationFile {
    #[serde(default)]
    pub app_version: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub image: ImageRecord,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub regions: Vec<RegionRecord>,
    #[serde(default)]
    pub boundary: Option<BoundaryRecord>,
    #[serde(default)]
    pub scale: Option<ScaleRecord>,
    #[serde(default)]
    pub measurements: Vec<MeasurementRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(default)]
    pub path: String,
    /// [width, height]
    #[serde(default)]
    pub size: [u32; 2],
    #[serde(default)]
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRecord {
    #[serde(default = "default_region_label")]
    pub label: String,
    #[serde(default)]
    pub color: Option<Rgba>,
    #[serde(default)]
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryRecord {
    #[serde(default = "default_boundary_label")]
    pub label: String,
    #[serde(default)]
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleRecord {
    pub p1: Point,
    pub p2: Point,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

/// Measurement as written; `pixel_length` and `value` are snapshots only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub p1: Point,
    pub p2: Point,
    #[serde(default)]
    pub pixel_length: f64,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: String,
}

/// Older region-only file
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyFile {
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub image_sha256: String,
    #[serde(default)]
    pub image_size: [u32; 2],
    #[serde(default = "default_legacy_version")]
    pub app_version: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub polygons: Vec<LegacyPolygon>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyPolygon {
    pub label: String,
    pub points: Vec<Point>,
    #[serde(default = "default_legacy_color")]
    pub color: Rgba,
}

fn default_region_label() -> String {
    "object".to_string()
}

fn default_boundary_label() -> String {
    BOUNDARY_LABEL.to_string()
}

fn default_legacy_version() -> String {
    "unknown".to_string()
}

fn default_legacy_color() -> Rgba {
    Rgba::new(1.0, 0.0, 0.0, 0.4)
}

/// Whether a parsed JSON document is in the older region-only layout
pub fn is_legacy(value: &serde_json::Value) -> bool {
    value.get("polygons").is_some() && value.get("regions").is_none()
}
