//! Region data handed to the segmentation trainer
//!
//! The trainer only sees labelled region outlines. Boundary, scale and
//! measurements are left out on purpose.

use serde::Serialize;

use crate::domain::{AnnotationSet, Point};

/// Fallback class when an annotation set has no labels at all
const DEFAULT_CLASS: &str = "object";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingRegion {
    pub label: String,
    pub points: Vec<Point>,
}

/// Labels and region outlines of one annotated image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSet {
    /// Class names; a label's index is its class id
    pub labels: Vec<String>,
    pub regions: Vec<TrainingRegion>,
}

impl TrainingSet {
    pub fn from_annotations(set: &AnnotationSet) -> Self {
        let regions: Vec<TrainingRegion> = set
            .regions
            .iter()
            .filter(|r| r.is_complete())
            .map(|r| TrainingRegion {
                label: r.label.clone(),
                points: r.vertices.clone(),
            })
            .collect();

        let mut labels = set.labels.names().to_vec();
        if labels.is_empty() {
            labels = regions.iter().map(|r| r.label.clone()).collect();
            labels.sort();
            labels.dedup();
        }
        if labels.is_empty() {
            labels.push(DEFAULT_CLASS.to_string());
        }

        Self { labels, regions }
    }

    /// Class id of a label
    pub fn class_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Number of complete regions carrying `label`
    pub fn region_count(&self, label: &str) -> usize {
        self.regions.iter().filter(|r| r.label == label).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Boundary, LabelSet, Region, Rgba};

    fn region(label: &str) -> Region {
        Region {
            label: label.into(),
            color: Rgba::default(),
            vertices: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)],
        }
    }

    #[test]
    fn test_only_regions_and_labels_are_kept() {
        let mut labels = LabelSet::default();
        labels.merge(["object", "cell"]);
        let set = AnnotationSet {
            labels,
            regions: vec![region("cell")],
            boundary: Some(Boundary {
                vertices: region("x").vertices,
            }),
            ..Default::default()
        };
        let training = TrainingSet::from_annotations(&set);
        assert_eq!(training.labels, ["object", "cell"]);
        assert_eq!(training.regions.len(), 1);
        assert_eq!(training.class_index("cell"), Some(1));
        assert_eq!(training.class_index("boundary"), None);
    }

    #[test]
    fn test_listed_label_without_regions() {
        let mut labels = LabelSet::default();
        labels.merge(["object", "cell"]);
        let mut short = region("object");
        short.vertices.truncate(2);
        let set = AnnotationSet {
            labels,
            regions: vec![region("cell"), region("cell"), short],
            ..Default::default()
        };
        let training = TrainingSet::from_annotations(&set);
        assert_eq!(training.class_index("object"), Some(0));
        assert_eq!(training.region_count("object"), 0);
        assert_eq!(training.region_count("cell"), 2);
    }

    #[test]
    fn test_labels_fall_back_to_region_labels() {
        let set = AnnotationSet {
            regions: vec![region("b"), region("a"), region("b")],
            ..Default::default()
        };
        assert_eq!(TrainingSet::from_annotations(&set).labels, ["a", "b"]);
        assert_eq!(
            TrainingSet::from_annotations(&AnnotationSet::default()).labels,
            ["object"]
        );
    }
}
