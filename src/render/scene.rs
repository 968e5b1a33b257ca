//! Projection of annotations into drawing primitives
//!
//! Rendering is a pure function of the model: `draw_session` walks the
//! committed entities, the selected entity's handles and the scratch preview
//! and issues `render_path` / `render_point` calls on a `Canvas`. Hosts
//! implement `Canvas` for their toolkit; `render::image` implements it for
//! tiny-skia.

use crate::domain::{AnnotationSet, EntityId, Point, Rgba};
use crate::session::{Session, Tool};

use super::geometry::{self, handle, line, marker, scratch};

/// Stroke and optional fill of a polyline or polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStyle {
    pub stroke: Rgba,
    /// Stroke width in view pixels
    pub width: f32,
    pub fill: Option<Rgba>,
    /// Whether the last point connects back to the first
    pub closed: bool,
}

/// Circle drawn at a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    /// Radius in view pixels
    pub radius: f32,
    pub fill: Option<Rgba>,
    /// Outline colour and width
    pub outline: Option<(Rgba, f32)>,
}

/// 2-D drawing surface in image pixel coordinates
pub trait Canvas {
    fn render_path(&mut self, points: &[Point], style: &PathStyle);
    fn render_point(&mut self, pos: Point, style: &PointStyle);
}

/// Draw committed annotations, highlighting `selected`
pub fn draw_annotations(canvas: &mut impl Canvas, set: &AnnotationSet, selected: Option<EntityId>) {
    let is_selected = |id| selected == Some(id);

    for (i, region) in set.regions.iter().enumerate() {
        canvas.render_path(
            &region.vertices,
            &PathStyle {
                stroke: region.color,
                width: geometry::stroke_width(is_selected(EntityId::Region(i))),
                fill: Some(geometry::region_fill(region.color)),
                closed: true,
            },
        );
    }

    if let Some(boundary) = &set.boundary {
        canvas.render_path(
            &boundary.vertices,
            &PathStyle {
                stroke: line::BOUNDARY,
                width: geometry::stroke_width(is_selected(EntityId::Boundary)),
                fill: None,
                closed: true,
            },
        );
    }

    if let Some(scale) = &set.scale {
        canvas.render_path(
            &[scale.p1, scale.p2],
            &segment_style(line::SCALE, is_selected(EntityId::Scale)),
        );
    }

    for (i, m) in set.measurements.iter().enumerate() {
        canvas.render_path(
            &[m.p1, m.p2],
            &segment_style(line::MEASUREMENT, is_selected(EntityId::Measurement(i))),
        );
    }
}

fn segment_style(stroke: Rgba, selected: bool) -> PathStyle {
    PathStyle {
        stroke,
        width: geometry::stroke_width(selected),
        fill: None,
        closed: false,
    }
}

/// Draw everything the editor shows: annotations, handles and the preview
pub fn draw_session(canvas: &mut impl Canvas, session: &Session) {
    draw_annotations(canvas, session.annotations(), session.selected());

    // Handles of the selected entity
    if let Some(vertices) = session
        .selected()
        .and_then(|id| session.annotations().vertices(id))
    {
        let style = PointStyle {
            radius: handle::RADIUS,
            fill: Some(handle::FILL),
            outline: Some((handle::OUTLINE, handle::OUTLINE_WIDTH)),
        };
        for v in vertices {
            canvas.render_point(v, &style);
        }
    }

    let Some(preview) = session.scratch_preview() else {
        return;
    };

    let (stroke, dot) = match preview.tool {
        Tool::Region | Tool::Boundary if preview.snapping => (scratch::SNAP, marker::POLYGON),
        Tool::Region => (scratch::REGION, marker::POLYGON),
        Tool::Boundary => (scratch::BOUNDARY, marker::POLYGON),
        Tool::Scale => (line::SCALE, marker::SCALE),
        Tool::Measure => (line::MEASUREMENT, marker::MEASUREMENT),
    };

    if preview.path.len() >= 2 {
        canvas.render_path(
            &preview.path,
            &PathStyle {
                stroke,
                width: scratch::WIDTH,
                fill: None,
                closed: false,
            },
        );
    }

    let dot_style = PointStyle {
        radius: marker::RADIUS,
        fill: Some(dot),
        outline: None,
    };
    for m in &preview.markers {
        canvas.render_point(*m, &dot_style);
    }

    if preview.snapping
        && let Some(anchor) = preview.snap_anchor
    {
        canvas.render_point(
            anchor,
            &PointStyle {
                radius: scratch::SNAP_RING_RADIUS,
                fill: None,
                outline: Some((scratch::SNAP, scratch::WIDTH)),
            },
        );
    }
}
