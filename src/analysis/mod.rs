//! Area analysis over committed annotations

pub mod report;

pub use report::{AreaReport, LabelTotal, generate_report, raster_grid};
