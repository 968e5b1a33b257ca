//! Derived list entries shown next to the canvas
//!
//! Entries are snapshots: the session recomputes them on commit, delete,
//! load and drag release, never while a vertex is being dragged.

use crate::calibration::{Calibration, format_general};
use crate::domain::{AnnotationSet, EntityId};

/// One row in an entity list
#[derive(Clone, Debug, PartialEq)]
pub struct ListEntry {
    pub entity: EntityId,
    pub text: String,
    pub vertex_count: usize,
    /// Polygon area (regions, boundary) or segment length in pixels
    pub pixels: f64,
    /// Physical length for measurements when calibrated
    pub physical: Option<f64>,
}

/// Entries for every committed entity, grouped like the side panel
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityLists {
    pub regions: Vec<ListEntry>,
    pub boundary: Option<ListEntry>,
    pub scale: Option<ListEntry>,
    pub measurements: Vec<ListEntry>,
}

impl EntityLists {
    /// Build entries from the current annotations and live calibration
    pub fn build(set: &AnnotationSet) -> Self {
        let regions = set
            .regions
            .iter()
            .enumerate()
            .map(|(i, r)| ListEntry {
                entity: EntityId::Region(i),
                text: format!("{}: {} ({} pts)", i + 1, r.label, r.vertices.len()),
                vertex_count: r.vertices.len(),
                pixels: r.area(),
                physical: None,
            })
            .collect();

        let boundary = set.boundary.as_ref().map(|b| ListEntry {
            entity: EntityId::Boundary,
            text: format!("Boundary ({} pts)", b.vertices.len()),
            vertex_count: b.vertices.len(),
            pixels: crate::domain::polygon_area(&b.vertices),
            physical: None,
        });

        let scale = set.scale.as_ref().map(|s| ListEntry {
            entity: EntityId::Scale,
            text: format!(
                "{:.1}px = {} {}",
                s.pixel_length(),
                format_general(s.value),
                s.unit
            ),
            vertex_count: 2,
            pixels: s.pixel_length(),
            physical: Some(s.value),
        });

        let calibration = Calibration::from_scale(set.scale.as_ref());
        let measurements = set
            .measurements
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let px = m.pixel_length();
                let physical = calibration.as_ref().map(|c| c.length(px));
                let text = match (&calibration, physical) {
                    (Some(cal), Some(len)) => {
                        format!("{}: {:.1}px = {} {}", i + 1, px, format_general(len), cal.unit)
                    }
                    _ => format!("{}: {:.1}px (set scale)", i + 1, px),
                };
                ListEntry {
                    entity: EntityId::Measurement(i),
                    text,
                    vertex_count: 2,
                    pixels: px,
                    physical,
                }
            })
            .collect();

        Self {
            regions,
            boundary,
            scale,
            measurements,
        }
    }

    /// All entries in panel order
    pub fn iter(&self) -> impl Iterator<Item = &ListEntry> {
        self.regions
            .iter()
            .chain(self.boundary.iter())
            .chain(self.scale.iter())
            .chain(self.measurements.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Measurement, Point, Region, Rgba, ScaleLine};

    fn set() -> AnnotationSet {
        AnnotationSet {
            regions: vec![Region {
                label: "cell".into(),
                color: Rgba::default(),
                vertices: vec![
                    Point::new(0.0, 0.0),
                    Point::new(10.0, 0.0),
                    Point::new(10.0, 10.0),
                ],
            }],
            measurements: vec![Measurement {
                p1: Point::new(0.0, 0.0),
                p2: Point::new(0.0, 30.0),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_uncalibrated_measurement_asks_for_scale() {
        let lists = EntityLists::build(&set());
        assert_eq!(lists.regions[0].text, "1: cell (3 pts)");
        assert_eq!(lists.regions[0].pixels, 50.0);
        assert_eq!(lists.measurements[0].text, "1: 30.0px (set scale)");
        assert_eq!(lists.measurements[0].physical, None);
        assert!(lists.boundary.is_none());
    }

    #[test]
    fn test_calibrated_measurement_uses_live_scale() {
        let mut set = set();
        set.scale = Some(ScaleLine {
            p1: Point::new(0.0, 0.0),
            p2: Point::new(10.0, 0.0),
            value: 5.0,
            unit: "mm".into(),
        });
        let lists = EntityLists::build(&set);
        assert_eq!(lists.scale.as_ref().unwrap().text, "10.0px = 5 mm");
        assert_eq!(lists.measurements[0].text, "1: 30.0px = 15 mm");
        assert_eq!(lists.measurements[0].physical, Some(15.0));
        assert_eq!(lists.iter().count(), 3);
    }
}
