//! Annotation rendering module
//!
//! This module contains:
//! - Drawing styles shared by every renderer
//! - The `Canvas` abstraction and the scene projection
//! - Image rendering using tiny-skia (for saving to file)
//! - Boolean polygon masks used by the area report

pub mod geometry;
pub mod image;
pub mod mask;
pub mod scene;

pub use mask::{BoolMask, PixelWindow, label_mask};
pub use scene::{Canvas, PathStyle, PointStyle, draw_annotations, draw_session};
