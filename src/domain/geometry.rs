//! Geometric primitives in full-resolution image pixel space
//!
//! Coordinates are never snapped to the pixel grid; a point keeps whatever
//! floating-point position the pointer (or the file) gave it.

use serde::{Deserialize, Serialize};

/// A position in source-image pixel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Check whether `other` lies within `radius` of this point (inclusive)
    pub fn is_near(&self, other: Point, radius: f64) -> bool {
        self.distance_to(other) <= radius
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounds of a point set
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Bounds of the given points, or None for an empty set
    pub fn of<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let init = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(iter.fold(init, |b, p| Self {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }
}

/// Unsigned shoelace area of the closed polygon through `points`
///
/// Self-intersecting polygons get the signed-sum magnitude, which is only an
/// approximation; the analysis report rasterizes instead.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    (twice * 0.5).abs()
}

/// Index of the closest point within `radius` of `target`, if any
pub fn nearest_within(points: &[Point], target: Point, radius: f64) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_near(target, radius))
        .min_by(|(_, a), (_, b)| a.distance_to(target).total_cmp(&b.distance_to(target)))
        .map(|(i, _)| i)
}
