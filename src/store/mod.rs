//! Annotation file persistence
//!
//! Converts between the editing session's `AnnotationSet` and the JSON file
//! layout in `format`. Loading never touches a session directly: callers
//! hand the loaded set to the session, which merges labels and replaces
//! geometry in one step.

pub mod format;

use std::io::Write;
use std::path::Path;

use crate::calibration::Calibration;
use crate::domain::{
    AnnotationSet, BOUNDARY_LABEL, Boundary, ImageIdentity, LabelSet, MIN_POLYGON_VERTICES,
    Measurement, Point, Region, ScaleLine,
};
use crate::error::InputError;
use crate::session::Session;

use format::{
    AnnotationFile, BoundaryRecord, ImageRecord, LegacyFile, MeasurementRecord, RegionRecord,
    ScaleRecord,
};

/// Timestamp layout written to `created_at`
const CREATED_AT_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Snapshot the session's annotations, stamped with version and time
pub fn collect(session: &Session) -> AnnotationSet {
    let mut set = session.annotations().clone();
    set.app_version = env!("CARGO_PKG_VERSION").to_string();
    set.created_at = chrono::Local::now().format(CREATED_AT_FORMAT).to_string();
    set
}

/// Serialize to pretty JSON
///
/// Measurement `pixel_length` and `value` are computed from the live
/// endpoints and scale at save time.
pub fn save(set: &AnnotationSet) -> Result<Vec<u8>, InputError> {
    let file = to_file(set)?;
    let mut bytes = serde_json::to_vec_pretty(&file)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parse a current or legacy annotation file
pub fn load(bytes: &[u8]) -> Result<AnnotationSet, InputError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    if format::is_legacy(&value) {
        log::debug!("Reading legacy region-only annotation file");
        let legacy: LegacyFile = serde_json::from_value(value)?;
        Ok(from_legacy(legacy))
    } else {
        let file: AnnotationFile = serde_json::from_value(value)?;
        from_file(file)
    }
}

/// Read and parse an annotation file
pub fn read_file(path: &Path) -> Result<AnnotationSet, InputError> {
    let bytes = std::fs::read(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let set = load(&bytes)?;
    log::info!(
        "Loaded annotations from {}: {} regions, {} measurements",
        path.display(),
        set.regions.len(),
        set.measurements.len()
    );
    Ok(set)
}

/// Write an annotation file atomically
///
/// The JSON goes to a temporary file next to `path` which then replaces it,
/// so an interrupted save leaves the previous file intact.
pub fn write_file(path: &Path, set: &AnnotationSet) -> Result<(), InputError> {
    let bytes = save(set)?;
    let write_err = |source: std::io::Error| InputError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = tempfile::Builder::new()
        .prefix(".mregion-")
        .suffix(".json.tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    file.write_all(&bytes).map_err(write_err)?;
    file.as_file().sync_all().map_err(write_err)?;
    file.persist(path).map_err(|err| write_err(err.error))?;
    log::info!("Saved annotations to {}", path.display());
    Ok(())
}

// ============================================================================
// Conversions
// ============================================================================

fn to_file(set: &AnnotationSet) -> Result<AnnotationFile, InputError> {
    check_finite("region", set.regions.iter().flat_map(|r| r.vertices.iter()))?;
    check_finite("boundary", set.boundary.iter().flat_map(|b| b.vertices.iter()))?;
    check_finite("scale", set.scale.iter().flat_map(|s| [&s.p1, &s.p2]))?;
    check_finite("measurement", set.measurements.iter().flat_map(|m| [&m.p1, &m.p2]))?;

    let calibration = Calibration::from_scale(set.scale.as_ref());
    let (width, height) = set.image.size;

    Ok(AnnotationFile {
        app_version: set.app_version.clone(),
        created_at: set.created_at.clone(),
        image: ImageRecord {
            path: set.image.path.clone(),
            size: [width, height],
            sha256: set.image.sha256.clone(),
        },
        labels: set.labels.names().to_vec(),
        regions: set
            .regions
            .iter()
            .enumerate()
            .filter(|(i, r)| {
                if !r.is_complete() {
                    log::warn!(
                        "Not saving region {} ({}) with {} points",
                        i + 1,
                        r.label,
                        r.vertices.len()
                    );
                }
                r.is_complete()
            })
            .map(|(_, r)| RegionRecord {
                label: r.label.clone(),
                color: Some(r.color),
                points: r.vertices.clone(),
            })
            .collect(),
        boundary: set
            .boundary
            .as_ref()
            .filter(|b| {
                if !b.is_complete() {
                    log::warn!("Not saving boundary with {} points", b.vertices.len());
                }
                b.is_complete()
            })
            .map(|b| BoundaryRecord {
                label: BOUNDARY_LABEL.to_string(),
                points: b.vertices.clone(),
            }),
        scale: set.scale.as_ref().map(|s| ScaleRecord {
            p1: s.p1,
            p2: s.p2,
            value: s.value,
            unit: s.unit.clone(),
        }),
        measurements: set
            .measurements
            .iter()
            .map(|m| {
                let pixel_length = m.pixel_length();
                MeasurementRecord {
                    p1: m.p1,
                    p2: m.p2,
                    pixel_length,
                    value: calibration.as_ref().map(|c| c.length(pixel_length)),
                    unit: calibration
                        .as_ref()
                        .map(|c| c.unit.clone())
                        .unwrap_or_default(),
                }
            })
            .collect(),
    })
}

fn from_file(file: AnnotationFile) -> Result<AnnotationSet, InputError> {
    let scale = match file.scale {
        Some(s) if !(s.value.is_finite() && s.value > 0.0) => {
            return Err(InputError::InvalidScaleValue { value: s.value });
        }
        Some(s) => Some(ScaleLine {
            p1: s.p1,
            p2: s.p2,
            value: s.value,
            unit: s.unit,
        }),
        None => None,
    };

    let mut labels = LabelSet::default();
    labels.merge(file.labels.iter().map(String::as_str));

    let mut regions = Vec::with_capacity(file.regions.len());
    for (i, record) in file.regions.into_iter().enumerate() {
        if record.points.len() < MIN_POLYGON_VERTICES {
            log::warn!(
                "Skipping region {} ({}) with {} points",
                i + 1,
                record.label,
                record.points.len()
            );
            continue;
        }
        labels.insert(&record.label);
        let color = record.color.unwrap_or_else(|| labels.color(&record.label));
        labels.seed_color(&record.label, color);
        regions.push(Region {
            label: record.label,
            color,
            vertices: record.points,
        });
    }

    let boundary = match file.boundary {
        Some(b) if b.points.len() >= MIN_POLYGON_VERTICES => Some(Boundary { vertices: b.points }),
        Some(b) => {
            log::warn!("Skipping boundary with {} points", b.points.len());
            None
        }
        None => None,
    };

    // Stored pixel_length/value are snapshots; only the endpoints matter
    let measurements = file
        .measurements
        .into_iter()
        .map(|m| Measurement { p1: m.p1, p2: m.p2 })
        .collect();

    Ok(AnnotationSet {
        app_version: file.app_version,
        created_at: file.created_at,
        image: image_identity(file.image.path, file.image.size, file.image.sha256),
        labels,
        regions,
        boundary,
        scale,
        measurements,
    })
}

fn from_legacy(file: LegacyFile) -> AnnotationSet {
    let mut labels = LabelSet::default();
    labels.merge(file.labels.iter().map(String::as_str));

    let regions = file
        .polygons
        .into_iter()
        .filter(|p| p.points.len() >= MIN_POLYGON_VERTICES)
        .map(|p| {
            labels.insert(&p.label);
            labels.seed_color(&p.label, p.color);
            Region {
                label: p.label,
                color: p.color,
                vertices: p.points,
            }
        })
        .collect();

    AnnotationSet {
        app_version: file.app_version,
        created_at: file.created_at,
        image: image_identity(file.image_path, file.image_size, file.image_sha256),
        labels,
        regions,
        ..Default::default()
    }
}

fn image_identity(path: String, [width, height]: [u32; 2], sha256: String) -> ImageIdentity {
    ImageIdentity {
        path,
        size: (width, height),
        sha256,
    }
}

fn check_finite<'a>(
    entity: &'static str,
    mut points: impl Iterator<Item = &'a Point>,
) -> Result<(), InputError> {
    if points.any(|p| !(p.x.is_finite() && p.y.is_finite())) {
        return Err(InputError::NonFiniteCoordinate { entity });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rgba;

    fn sample() -> AnnotationSet {
        let mut labels = LabelSet::with_label("object", Rgba::default());
        labels.insert_generated("nucleus");
        AnnotationSet {
            app_version: "0.6.0".into(),
            created_at: "20250101_120000".into(),
            image: ImageIdentity {
                path: "/data/slide.tif".into(),
                size: (2048, 1536),
                sha256: "ab".repeat(32),
            },
            regions: vec![Region {
                label: "nucleus".into(),
                color: labels.color("nucleus"),
                vertices: vec![
                    Point::new(0.1, 0.2),
                    Point::new(1.0 / 3.0, 1e-9),
                    Point::new(1234.5678901234, 987.654321),
                ],
            }],
            labels,
            boundary: Some(Boundary {
                vertices: vec![
                    Point::new(0.0, 0.0),
                    Point::new(std::f64::consts::PI, 0.0),
                    Point::new(2.0, std::f64::consts::E),
                ],
            }),
            scale: Some(ScaleLine {
                p1: Point::new(0.0, 0.0),
                p2: Point::new(10.0, 0.0),
                value: 5.0,
                unit: "mm".into(),
            }),
            measurements: vec![Measurement {
                p1: Point::new(0.0, 0.0),
                p2: Point::new(3.0, 4.0),
            }],
        }
    }

    #[test]
    fn test_round_trip_is_bit_exact() {
        let set = sample();
        let loaded = load(&save(&set).unwrap()).unwrap();
        assert_eq!(loaded.regions, set.regions);
        assert_eq!(loaded.boundary, set.boundary);
        assert_eq!(loaded.scale, set.scale);
        assert_eq!(loaded.measurements, set.measurements);
        assert_eq!(loaded.labels.names(), set.labels.names());
        assert_eq!(loaded.image, set.image);
        let x = loaded.regions[0].vertices[1].x;
        assert_eq!(x.to_bits(), (1.0f64 / 3.0).to_bits());
    }

    #[test]
    fn test_saved_layout() {
        let bytes = save(&sample()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["image"]["size"], serde_json::json!([2048, 1536]));
        assert_eq!(json["boundary"]["label"], "boundary");
        assert_eq!(json["labels"], serde_json::json!(["object", "nucleus"]));
        let m = &json["measurements"][0];
        assert_eq!(m["pixel_length"], 5.0);
        assert_eq!(m["value"], 2.5);
        assert_eq!(m["unit"], "mm");
    }

    #[test]
    fn test_uncalibrated_measurement_saves_null_value() {
        let mut set = sample();
        set.scale = None;
        let json: serde_json::Value = serde_json::from_slice(&save(&set).unwrap()).unwrap();
        assert!(json["scale"].is_null());
        assert!(json["measurements"][0]["value"].is_null());
        assert_eq!(json["measurements"][0]["unit"], "");
    }

    #[test]
    fn test_stored_measurement_value_is_ignored() {
        let text = r#"{
            "scale": {"p1": [0, 0], "p2": [10, 0], "value": 5, "unit": "mm"},
            "measurements": [{"p1": [0, 0], "p2": [0, 8], "pixel_length": 99, "value": 1234, "unit": "cm"}]
        }"#;
        let set = load(text.as_bytes()).unwrap();
        let m = &set.measurements[0];
        assert_eq!(m.pixel_length(), 8.0);
        assert_eq!(
            crate::calibration::measurement_length(m, set.scale.as_ref()),
            Some(4.0)
        );
    }

    #[test]
    fn test_labels_include_region_labels() {
        let text = r#"{
            "labels": ["object"],
            "regions": [{"label": "cell", "color": [0, 1, 0, 1], "points": [[0,0],[1,0],[1,1]]}]
        }"#;
        let set = load(text.as_bytes()).unwrap();
        assert_eq!(set.labels.names(), ["object", "cell"]);
        assert_eq!(set.labels.color("cell"), Rgba::new(0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn test_degenerate_regions_are_skipped() {
        let text = r#"{
            "regions": [
                {"label": "a", "points": [[0,0],[1,0]]},
                {"label": "b", "points": [[0,0],[1,0],[1,1]]}
            ],
            "boundary": {"label": "boundary", "points": [[0,0]]}
        }"#;
        let set = load(text.as_bytes()).unwrap();
        assert_eq!(set.regions.len(), 1);
        assert_eq!(set.regions[0].label, "b");
        assert!(set.boundary.is_none());
    }

    #[test]
    fn test_incomplete_polygons_are_not_saved() {
        let mut set = sample();
        set.regions.insert(
            0,
            Region {
                label: "nucleus".into(),
                color: Rgba::default(),
                vertices: vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
            },
        );
        set.boundary = Some(Boundary {
            vertices: vec![Point::new(0.0, 0.0)],
        });

        let bytes = save(&set).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["regions"].as_array().unwrap().len(), 1);
        assert!(json["boundary"].is_null());

        // What was saved loads back unchanged
        let loaded = load(&bytes).unwrap();
        assert_eq!(loaded.regions, set.regions[1..]);
        assert_eq!(loaded.boundary, None);
        assert_eq!(save(&loaded).unwrap(), bytes);
    }

    #[test]
    fn test_invalid_scale_value_is_rejected() {
        let text = r#"{"scale": {"p1": [0,0], "p2": [1,0], "value": 0, "unit": "mm"}}"#;
        assert!(matches!(
            load(text.as_bytes()),
            Err(InputError::InvalidScaleValue { .. })
        ));
    }

    #[test]
    fn test_malformed_json_is_input_error() {
        assert!(matches!(load(b"{not json"), Err(InputError::Json(_))));
        assert!(matches!(
            load(br#"{"regions": [{"points": [[0, "x"]]}]}"#),
            Err(InputError::Json(_))
        ));
    }

    #[test]
    fn test_non_finite_points_are_not_saved() {
        let mut set = sample();
        set.measurements[0].p2 = Point::new(f64::NAN, 0.0);
        assert!(matches!(
            save(&set),
            Err(InputError::NonFiniteCoordinate {
                entity: "measurement"
            })
        ));
    }

    #[test]
    fn test_legacy_file() {
        let text = r#"{
            "image_path": "old.tif",
            "image_sha256": "cafe",
            "image_size": [640, 480],
            "labels": ["object", "cell"],
            "polygons": [
                {"label": "cell", "points": [[0,0],[4,0],[4,4]]},
                {"label": "object", "points": [[0,0],[1,0],[1,1]], "color": [0, 0, 1, 1]}
            ]
        }"#;
        let set = load(text.as_bytes()).unwrap();
        assert_eq!(set.app_version, "unknown");
        assert_eq!(set.image.size, (640, 480));
        assert_eq!(set.regions.len(), 2);
        assert_eq!(set.regions[0].color, Rgba::new(1.0, 0.0, 0.0, 0.4));
        assert_eq!(set.regions[1].color, Rgba::new(0.0, 0.0, 1.0, 1.0));
        assert!(set.boundary.is_none());
        assert!(set.scale.is_none());
    }

    #[test]
    fn test_write_file_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slide.annotations.json");
        std::fs::write(&path, "old contents").unwrap();

        write_file(&path, &sample()).unwrap();
        let loaded = read_file(&path).unwrap();
        assert_eq!(loaded.regions, sample().regions);

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }

    #[test]
    fn test_collect_stamps_metadata() {
        let session = Session::new(&crate::config::AppConfig::default());
        let set = collect(&session);
        assert_eq!(set.app_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(set.created_at.len(), 15);
        assert_eq!(set.labels.names(), ["object"]);
    }
}
