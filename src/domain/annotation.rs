//! Annotation entities drawn over a source image
//!
//! All annotation types store coordinates in full-resolution source image
//! pixels. Any preview scaling is undone before points reach these types.

use super::geometry::{Bounds, Point, polygon_area};
use super::labels::{LabelSet, Rgba};

/// Label written for the boundary polygon in annotation files
pub const BOUNDARY_LABEL: &str = "boundary";

/// Minimum vertex count of a committed polygon
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Labelled closed polygon marking a classified area
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub label: String,
    pub color: Rgba,
    /// Vertices in click order
    pub vertices: Vec<Point>,
}

impl Region {
    /// Shoelace area in square pixels (display only; reports rasterize)
    pub fn area(&self) -> f64 {
        polygon_area(&self.vertices)
    }

    /// Whether this region has enough vertices to be persisted
    pub fn is_complete(&self) -> bool {
        self.vertices.len() >= MIN_POLYGON_VERTICES
    }
}

/// The analysis domain: a closed, unfilled polygon used as clipping mask
#[derive(Clone, Debug, PartialEq)]
pub struct Boundary {
    pub vertices: Vec<Point>,
}

impl Boundary {
    pub fn is_complete(&self) -> bool {
        self.vertices.len() >= MIN_POLYGON_VERTICES
    }
}

/// Calibration segment: `p1`-`p2` spans `value` `unit` in the real world
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleLine {
    pub p1: Point,
    pub p2: Point,
    /// Always > 0
    pub value: f64,
    pub unit: String,
}

impl ScaleLine {
    /// Length of the segment in pixels
    pub fn pixel_length(&self) -> f64 {
        self.p1.distance_to(self.p2)
    }
}

/// Two-point ruler; its physical length is derived from the live scale
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub p1: Point,
    pub p2: Point,
}

impl Measurement {
    pub fn pixel_length(&self) -> f64 {
        self.p1.distance_to(self.p2)
    }
}

/// Identity of the image the annotations belong to
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageIdentity {
    pub path: String,
    /// Full-resolution (width, height); (0, 0) when unknown
    pub size: (u32, u32),
    pub sha256: String,
}

impl ImageIdentity {
    /// Pixel dimensions, if known
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        let (w, h) = self.size;
        (w > 0 && h > 0).then_some((w, h))
    }
}

/// Reference to one committed entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityId {
    Region(usize),
    Boundary,
    Scale,
    Measurement(usize),
}

/// Everything annotated on one image
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationSet {
    pub app_version: String,
    pub created_at: String,
    pub image: ImageIdentity,
    pub labels: LabelSet,
    pub regions: Vec<Region>,
    pub boundary: Option<Boundary>,
    pub scale: Option<ScaleLine>,
    pub measurements: Vec<Measurement>,
}

impl AnnotationSet {
    /// Vertices of an entity, if it exists
    pub fn vertices(&self, id: EntityId) -> Option<Vec<Point>> {
        match id {
            EntityId::Region(i) => self.regions.get(i).map(|r| r.vertices.clone()),
            EntityId::Boundary => self.boundary.as_ref().map(|b| b.vertices.clone()),
            EntityId::Scale => self.scale.as_ref().map(|s| vec![s.p1, s.p2]),
            EntityId::Measurement(i) => self.measurements.get(i).map(|m| vec![m.p1, m.p2]),
        }
    }

    /// Mutable access to one vertex of an entity
    pub fn vertex_mut(&mut self, id: EntityId, index: usize) -> Option<&mut Point> {
        match id {
            EntityId::Region(i) => self.regions.get_mut(i)?.vertices.get_mut(index),
            EntityId::Boundary => self.boundary.as_mut()?.vertices.get_mut(index),
            EntityId::Scale => {
                let scale = self.scale.as_mut()?;
                match index {
                    0 => Some(&mut scale.p1),
                    1 => Some(&mut scale.p2),
                    _ => None,
                }
            }
            EntityId::Measurement(i) => {
                let m = self.measurements.get_mut(i)?;
                match index {
                    0 => Some(&mut m.p1),
                    1 => Some(&mut m.p2),
                    _ => None,
                }
            }
        }
    }

    /// Whether an entity exists
    pub fn contains(&self, id: EntityId) -> bool {
        match id {
            EntityId::Region(i) => i < self.regions.len(),
            EntityId::Boundary => self.boundary.is_some(),
            EntityId::Scale => self.scale.is_some(),
            EntityId::Measurement(i) => i < self.measurements.len(),
        }
    }

    /// Remove an entity; returns false if it did not exist
    pub fn remove(&mut self, id: EntityId) -> bool {
        match id {
            EntityId::Region(i) if i < self.regions.len() => {
                self.regions.remove(i);
                true
            }
            EntityId::Measurement(i) if i < self.measurements.len() => {
                self.measurements.remove(i);
                true
            }
            EntityId::Boundary => self.boundary.take().is_some(),
            EntityId::Scale => self.scale.take().is_some(),
            _ => false,
        }
    }

    /// Bounds of the boundary and all regions, used when image size is unknown
    pub fn geometry_bounds(&self) -> Option<Bounds> {
        let boundary = self.boundary.iter().flat_map(|b| b.vertices.iter());
        let regions = self.regions.iter().flat_map(|r| r.vertices.iter());
        Bounds::of(boundary.chain(regions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<Point> {
        vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(0.0, 3.0)]
    }

    fn sample() -> AnnotationSet {
        AnnotationSet {
            regions: vec![
                Region {
                    label: "a".into(),
                    color: Rgba::default(),
                    vertices: triangle(),
                },
                Region {
                    label: "b".into(),
                    color: Rgba::default(),
                    vertices: triangle(),
                },
            ],
            scale: Some(ScaleLine {
                p1: Point::new(0.0, 0.0),
                p2: Point::new(3.0, 4.0),
                value: 1.0,
                unit: "mm".into(),
            }),
            measurements: vec![Measurement {
                p1: Point::new(1.0, 1.0),
                p2: Point::new(1.0, 2.0),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_region_area_and_completeness() {
        let region = Region {
            label: "a".into(),
            color: Rgba::default(),
            vertices: triangle(),
        };
        assert_eq!(region.area(), 6.0);
        assert!(region.is_complete());
    }

    #[test]
    fn test_vertex_mut_moves_one_vertex_in_place() {
        let mut set = sample();
        *set.vertex_mut(EntityId::Region(1), 2).unwrap() = Point::new(9.0, 9.0);
        assert_eq!(set.regions[1].vertices[2], Point::new(9.0, 9.0));
        assert_eq!(set.regions[1].vertices[0], Point::new(0.0, 0.0));

        *set.vertex_mut(EntityId::Scale, 1).unwrap() = Point::new(6.0, 8.0);
        assert_eq!(set.scale.as_ref().unwrap().pixel_length(), 10.0);
        assert!(set.vertex_mut(EntityId::Scale, 2).is_none());
        assert!(set.vertex_mut(EntityId::Boundary, 0).is_none());
    }

    #[test]
    fn test_remove_entities() {
        let mut set = sample();
        assert!(set.remove(EntityId::Region(0)));
        assert_eq!(set.regions.len(), 1);
        assert_eq!(set.regions[0].label, "b");
        assert!(!set.remove(EntityId::Region(5)));
        assert!(set.remove(EntityId::Scale));
        assert!(!set.remove(EntityId::Scale));
        assert!(set.remove(EntityId::Measurement(0)));
        assert!(set.measurements.is_empty());
    }

    #[test]
    fn test_geometry_bounds_ignores_scale_and_measurements() {
        let mut set = sample();
        set.boundary = Some(Boundary {
            vertices: vec![Point::new(-2.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 7.0)],
        });
        let b = set.geometry_bounds().unwrap();
        assert_eq!((b.min_x, b.max_x, b.max_y), (-2.0, 4.0, 7.0));
    }

    #[test]
    fn test_image_dimensions_unknown_when_zero() {
        let mut id = ImageIdentity::default();
        assert_eq!(id.dimensions(), None);
        id.size = (640, 480);
        assert_eq!(id.dimensions(), Some((640, 480)));
    }
}
