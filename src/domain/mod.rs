//! Pure domain types with minimal dependencies
//!
//! This module contains the annotation model shared by the editor, the
//! file store and the analysis report. Nothing here knows about input
//! events or rendering.

pub mod annotation;
pub mod geometry;
pub mod labels;

pub use annotation::*;
pub use geometry::*;
pub use labels::*;
