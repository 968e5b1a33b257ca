//! Error types for annotation files and area analysis.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reading or decoding annotation input.
///
/// When a load fails the editing session keeps its previous contents.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid annotation JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scale value must be a positive number, got {value}")]
    InvalidScaleValue { value: f64 },

    #[error("non-finite coordinate in {entity}")]
    NonFiniteCoordinate { entity: &'static str },

    #[error("failed to read image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Conditions that prevent an area report from being produced.
///
/// These are blocking notices, not failures of the editor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("report requires a boundary polygon with at least 3 vertices")]
    NoBoundary,

    #[error("there are no regions to report on")]
    NoRegions,

    #[error("boundary area is zero after rasterization")]
    EmptyBoundary,

    #[error("no polygon coordinates found to size the raster grid")]
    NoGeometry,

    #[error("cannot allocate a {width}x{height} raster mask")]
    RasterUnavailable { width: u32, height: u32 },
}
