//! Region, boundary and scale annotation over microscopy images, with
//! calibrated area reports.

pub mod analysis;
pub mod annotations;
pub mod calibration;
pub mod config;
pub mod domain;
pub mod error;
pub mod image_source;
pub mod render;
pub mod session;
pub mod store;
pub mod training;
