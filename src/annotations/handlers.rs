//! Session message handlers
//!
//! `handle_msg` is the single dispatch point mapping (state, message) to a
//! state transition plus model mutation. Events are processed one at a time
//! to completion.

use crate::domain::{
    AnnotationSet, Boundary, EntityId, MIN_POLYGON_VERTICES, Measurement, Point, Region,
    ScaleLine,
};
use crate::session::messages::{
    EditMsg, Effect, LabelMsg, Msg, PointerButton, PointerMsg, ScaleMsg, ToolMsg, ViewMsg,
};
use crate::session::state::{DragState, EditorState, Scratch, Session, Tool};

/// Handle a Msg, mutating the session
///
/// Returns the effects the host UI should react to.
pub fn handle_msg(session: &mut Session, msg: Msg) -> Vec<Effect> {
    let mut effects = Vec::new();
    match msg {
        Msg::Pointer(pointer) => handle_pointer(session, pointer, &mut effects),
        Msg::Tool(tool) => handle_tool(session, tool, &mut effects),
        Msg::Edit(edit) => handle_edit(session, edit, &mut effects),
        Msg::Scale(scale) => handle_scale(session, scale, &mut effects),
        Msg::Label(label) => handle_label(session, label, &mut effects),
        Msg::View(view) => handle_view(session, view),
        Msg::Loaded(set) => {
            apply_loaded(session, *set);
            effects.push(Effect::SelectionChanged(None));
            effects.push(Effect::LabelsChanged);
            effects.push(Effect::ListsChanged);
        }
    }
    effects
}

// ============================================================================
// Pointer handlers
// ============================================================================

fn handle_pointer(session: &mut Session, msg: PointerMsg, effects: &mut Vec<Effect>) {
    match msg {
        PointerMsg::Press {
            button: PointerButton::Left,
            pos,
        } => left_press(session, pos, effects),
        PointerMsg::Press {
            button: PointerButton::Right,
            pos: _,
        } => right_press(session, effects),
        PointerMsg::Move(pos) => {
            if let Some(drag) = session.drag {
                move_vertex(&mut session.set, drag, pos);
            } else if let Some(scratch) = session.state.scratch_mut() {
                scratch.cursor = Some(pos);
            }
        }
        PointerMsg::Release(pos) => {
            if let Some(drag) = session.drag.take() {
                move_vertex(&mut session.set, drag, pos);
                log::debug!("Vertex {} of {:?} released", drag.index, drag.entity);
                effects.push(Effect::PanZoom(true));
                session.refresh_lists();
                effects.push(Effect::ListsChanged);
            }
        }
    }
}

fn left_press(session: &mut Session, pos: Point, effects: &mut Vec<Effect>) {
    // The scale dialog is modal
    if matches!(session.state, EditorState::ScalePending { .. }) {
        return;
    }

    // Handles take priority over drawing clicks
    if session.drag.is_none()
        && let Some(drag) = session.hit_handle(pos)
    {
        log::debug!("Vertex {} of {:?} grabbed", drag.index, drag.entity);
        session.drag = Some(drag);
        effects.push(Effect::PanZoom(false));
        return;
    }

    let closes = match &session.state {
        EditorState::DrawingRegion(s) | EditorState::DrawingBoundary(s) => {
            session.closes_polygon(s, pos)
        }
        _ => false,
    };
    if closes {
        finish_polygon(session, effects);
        return;
    }

    let Some(scratch) = session.state.scratch_mut() else {
        return;
    };
    scratch.points.push(pos);
    scratch.cursor = Some(pos);

    match &session.state {
        EditorState::SettingScale(s) if s.points.len() == 2 => {
            let (p1, p2) = (s.points[0], s.points[1]);
            session.state = EditorState::ScalePending { p1, p2 };
            effects.push(Effect::ScaleValueRequested {
                pixel_length: p1.distance_to(p2),
            });
        }
        EditorState::Measuring(s) if s.points.len() == 2 => {
            let measurement = Measurement {
                p1: s.points[0],
                p2: s.points[1],
            };
            session.set.measurements.push(measurement);
            session.state = EditorState::Idle;
            let id = EntityId::Measurement(session.set.measurements.len() - 1);
            log::info!(
                "Measurement added: {:.1}px",
                measurement.pixel_length()
            );
            effects.push(Effect::Committed(id));
            session.refresh_lists();
            effects.push(Effect::ListsChanged);
        }
        _ => {}
    }
}

fn right_press(session: &mut Session, effects: &mut Vec<Effect>) {
    match session.state.tool() {
        Some(tool) if tool.is_polygon() => finish_polygon(session, effects),
        Some(_) if session.state.scratch().is_some() => cancel_gesture(session, effects),
        _ => {}
    }
}

/// Commit the scratch polygon, or discard it when it has too few points
fn finish_polygon(session: &mut Session, effects: &mut Vec<Effect>) {
    let state = std::mem::take(&mut session.state);
    let (tool, scratch) = match state {
        EditorState::DrawingRegion(s) => (Tool::Region, s),
        EditorState::DrawingBoundary(s) => (Tool::Boundary, s),
        other => {
            session.state = other;
            return;
        }
    };

    if scratch.points.len() < MIN_POLYGON_VERTICES {
        log::debug!(
            "Discarding {:?} draft with {} points",
            tool,
            scratch.points.len()
        );
        effects.push(Effect::Canceled(tool));
        return;
    }

    let Scratch { points, .. } = scratch;
    let id = match tool {
        Tool::Region => {
            let label = session.active_label.clone();
            let color = session.set.labels.color(&label);
            log::info!("Added polygon ({}) with {} vertices", label, points.len());
            session.set.regions.push(Region {
                label,
                color,
                vertices: points,
            });
            EntityId::Region(session.set.regions.len() - 1)
        }
        _ => {
            log::info!("Boundary added with {} vertices", points.len());
            if session.drag.is_some_and(|d| d.entity == EntityId::Boundary) {
                session.drag = None;
                effects.push(Effect::PanZoom(true));
            }
            session.set.boundary = Some(Boundary { vertices: points });
            EntityId::Boundary
        }
    };
    effects.push(Effect::Committed(id));
    session.refresh_lists();
    effects.push(Effect::ListsChanged);
}

/// Drop scratch points and return to idle; committed entities are untouched
fn cancel_gesture(session: &mut Session, effects: &mut Vec<Effect>) {
    if let Some(tool) = session.state.tool() {
        log::debug!("{:?} gesture canceled", tool);
        session.state = EditorState::Idle;
        effects.push(Effect::Canceled(tool));
    }
}

fn move_vertex(set: &mut AnnotationSet, drag: DragState, pos: Point) {
    if let Some(vertex) = set.vertex_mut(drag.entity, drag.index) {
        *vertex = pos;
    }
}

// ============================================================================
// Tool handlers
// ============================================================================

fn handle_tool(session: &mut Session, msg: ToolMsg, effects: &mut Vec<Effect>) {
    match msg {
        ToolMsg::Start(tool) => {
            if session.require_image && !session.image_open {
                log::warn!("{:?} tool needs an open image", tool);
                effects.push(Effect::NeedsImage);
                return;
            }
            cancel_gesture(session, effects);
            session.state = EditorState::start(tool);
            log::debug!("{:?} tool started", tool);
        }
        ToolMsg::Cancel => cancel_gesture(session, effects),
        ToolMsg::Finish => {
            if session.state.tool().is_some_and(Tool::is_polygon) {
                finish_polygon(session, effects);
            }
        }
    }
}

// ============================================================================
// Edit handlers
// ============================================================================

fn handle_edit(session: &mut Session, msg: EditMsg, effects: &mut Vec<Effect>) {
    match msg {
        EditMsg::Select(entity) => {
            let entity = entity.filter(|id| session.set.contains(*id));
            if session.selected != entity {
                session.selected = entity;
                effects.push(Effect::SelectionChanged(entity));
            }
        }
        EditMsg::VertexMoved { entity, index, pos } => {
            move_vertex(&mut session.set, DragState { entity, index }, pos);
            if session.refresh_lists() {
                effects.push(Effect::ListsChanged);
            }
        }
        EditMsg::Delete(entity) => delete_entity(session, entity, effects),
        EditMsg::DeleteSelected => {
            if let Some(entity) = session.selected {
                delete_entity(session, entity, effects);
            }
        }
    }
}

fn delete_entity(session: &mut Session, entity: EntityId, effects: &mut Vec<Effect>) {
    if !session.set.contains(entity) {
        return;
    }
    if session.drag.is_some_and(|d| d.entity == entity) {
        session.drag = None;
        effects.push(Effect::PanZoom(true));
    }
    session.set.remove(entity);
    log::info!("Deleted {:?}", entity);

    let selected = session.selected.and_then(|sel| reindex_after_delete(sel, entity));
    if selected != session.selected {
        session.selected = selected;
        effects.push(Effect::SelectionChanged(selected));
    }
    if let Some(drag) = session.drag {
        session.drag = reindex_after_delete(drag.entity, entity).map(|e| DragState {
            entity: e,
            index: drag.index,
        });
    }
    session.refresh_lists();
    effects.push(Effect::ListsChanged);
}

/// Where `id` points after `deleted` was removed, None if it was the deleted one
fn reindex_after_delete(id: EntityId, deleted: EntityId) -> Option<EntityId> {
    match (id, deleted) {
        (a, b) if a == b => None,
        (EntityId::Region(i), EntityId::Region(d)) if i > d => Some(EntityId::Region(i - 1)),
        (EntityId::Measurement(i), EntityId::Measurement(d)) if i > d => {
            Some(EntityId::Measurement(i - 1))
        }
        (a, _) => Some(a),
    }
}

// ============================================================================
// Scale handlers
// ============================================================================

fn handle_scale(session: &mut Session, msg: ScaleMsg, effects: &mut Vec<Effect>) {
    let EditorState::ScalePending { p1, p2 } = session.state else {
        return;
    };
    match msg {
        ScaleMsg::Confirm { value, unit } => {
            if !(value.is_finite() && value > 0.0) {
                log::warn!("Rejected scale value {}", value);
                effects.push(Effect::InvalidScaleValue);
                return;
            }
            if session.drag.is_some_and(|d| d.entity == EntityId::Scale) {
                session.drag = None;
                effects.push(Effect::PanZoom(true));
            }
            log::info!("Scale set: {} {}", value, unit);
            session.set.scale = Some(ScaleLine { p1, p2, value, unit });
            session.state = EditorState::Idle;
            effects.push(Effect::Committed(EntityId::Scale));
            session.refresh_lists();
            effects.push(Effect::ListsChanged);
        }
        ScaleMsg::Cancel => {
            log::debug!("Scale canceled");
            session.state = EditorState::Idle;
            effects.push(Effect::Canceled(Tool::Scale));
        }
    }
}

// ============================================================================
// Label and view handlers
// ============================================================================

fn handle_label(session: &mut Session, msg: LabelMsg, effects: &mut Vec<Effect>) {
    match msg {
        LabelMsg::Add(name) => {
            let name = name.trim();
            if name.is_empty() || !session.set.labels.insert_generated(name) {
                return;
            }
            log::info!("Label added: {}", name);
            effects.push(Effect::LabelsChanged);
        }
        LabelMsg::SetActive(name) => {
            if session.set.labels.contains(&name) && session.active_label != name {
                session.active_label = name;
                effects.push(Effect::LabelsChanged);
            }
        }
    }
}

fn handle_view(session: &mut Session, msg: ViewMsg) {
    match msg {
        ViewMsg::Zoomed { view_pixel_size } => {
            if view_pixel_size.is_finite() && view_pixel_size > 0.0 {
                session.viewport.view_pixel_size = view_pixel_size;
            }
        }
    }
}

// ============================================================================
// Load
// ============================================================================

/// Replace all geometry with `loaded`, merging its labels after the existing ones
///
/// Any gesture, drag and selection in progress is dropped.
pub fn apply_loaded(session: &mut Session, loaded: AnnotationSet) {
    let AnnotationSet {
        labels,
        regions,
        boundary,
        scale,
        measurements,
        ..
    } = loaded;

    let added = session.set.labels.merge(labels.names().iter().map(String::as_str));
    for region in &regions {
        session.set.labels.insert(&region.label);
        session.set.labels.seed_color(&region.label, region.color);
    }
    if !added.is_empty() {
        log::info!("Labels merged from file: {:?}", added);
    }

    session.state = EditorState::Idle;
    session.drag = None;
    session.selected = None;
    session.set.regions = regions;
    session.set.boundary = boundary;
    session.set.scale = scale;
    session.set.measurements = measurements;
    session.refresh_lists();
}
