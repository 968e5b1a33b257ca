//! Message types for the editing session
//!
//! This module contains:
//! - Msg enum with nested sub-enums for organized message handling
//! - Effect enum reporting what a handled message changed

use crate::domain::{AnnotationSet, EntityId, Point};

use super::state::Tool;

// ============================================================================
// Pointer Input Types
// ============================================================================

/// Mouse button relevant to drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
}

/// Pointer events already mapped to image pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum PointerMsg {
    /// Button pressed (a click) at position
    Press { button: PointerButton, pos: Point },
    /// Pointer moved to position
    Move(Point),
    /// Button released at position
    Release(Point),
}

// ============================================================================
// Tool / Editing Types
// ============================================================================

/// Drawing tool activation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolMsg {
    /// Enter a tool, cancelling any other gesture in progress
    Start(Tool),
    /// Discard the gesture in progress
    Cancel,
    /// Force-close the open polygon (same as a right-click)
    Finish,
}

/// Edits on committed entities
#[derive(Debug, Clone, PartialEq)]
pub enum EditMsg {
    /// Select an entity (or clear the selection); only the selected entity
    /// exposes vertex handles
    Select(Option<EntityId>),
    /// Move one vertex of an entity to a new position
    VertexMoved {
        entity: EntityId,
        index: usize,
        pos: Point,
    },
    /// Delete one entity
    Delete(EntityId),
    /// Delete the selected entity
    DeleteSelected,
}

/// Answers to the scale value/unit request
#[derive(Debug, Clone, PartialEq)]
pub enum ScaleMsg {
    /// The two scale points span `value` `unit`
    Confirm { value: f64, unit: String },
    /// Discard the captured points, keeping any previous scale
    Cancel,
}

/// Label list management
#[derive(Debug, Clone, PartialEq)]
pub enum LabelMsg {
    /// Add a label with the next palette colour
    Add(String),
    /// Label used for new regions
    SetActive(String),
}

/// View changes reported by the host canvas
#[derive(Debug, Clone, PartialEq)]
pub enum ViewMsg {
    /// Zoom changed: image pixels covered by one screen pixel
    Zoomed { view_pixel_size: f64 },
}

/// All session messages
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Pointer(PointerMsg),
    Tool(ToolMsg),
    Edit(EditMsg),
    Scale(ScaleMsg),
    Label(LabelMsg),
    View(ViewMsg),
    /// Replace geometry with a loaded annotation set, merging labels
    Loaded(Box<AnnotationSet>),
}

impl Msg {
    pub fn left_click(x: f64, y: f64) -> Self {
        Msg::Pointer(PointerMsg::Press {
            button: PointerButton::Left,
            pos: Point::new(x, y),
        })
    }

    pub fn right_click(x: f64, y: f64) -> Self {
        Msg::Pointer(PointerMsg::Press {
            button: PointerButton::Right,
            pos: Point::new(x, y),
        })
    }

    pub fn pointer_moved(x: f64, y: f64) -> Self {
        Msg::Pointer(PointerMsg::Move(Point::new(x, y)))
    }

    pub fn pointer_released(x: f64, y: f64) -> Self {
        Msg::Pointer(PointerMsg::Release(Point::new(x, y)))
    }

    pub fn start(tool: Tool) -> Self {
        Msg::Tool(ToolMsg::Start(tool))
    }

    pub fn cancel() -> Self {
        Msg::Tool(ToolMsg::Cancel)
    }

    pub fn finish() -> Self {
        Msg::Tool(ToolMsg::Finish)
    }

    pub fn select(entity: EntityId) -> Self {
        Msg::Edit(EditMsg::Select(Some(entity)))
    }

    pub fn delete_selected() -> Self {
        Msg::Edit(EditMsg::DeleteSelected)
    }

    pub fn scale_confirm(value: f64, unit: impl Into<String>) -> Self {
        Msg::Scale(ScaleMsg::Confirm {
            value,
            unit: unit.into(),
        })
    }

    pub fn scale_cancel() -> Self {
        Msg::Scale(ScaleMsg::Cancel)
    }

    pub fn add_label(name: impl Into<String>) -> Self {
        Msg::Label(LabelMsg::Add(name.into()))
    }

    pub fn set_label(name: impl Into<String>) -> Self {
        Msg::Label(LabelMsg::SetActive(name.into()))
    }

    pub fn zoomed(view_pixel_size: f64) -> Self {
        Msg::View(ViewMsg::Zoomed { view_pixel_size })
    }
}

// ============================================================================
// Effects
// ============================================================================

/// Observable outcome of handling a message, for the host UI to act on
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// A gesture produced (or replaced) a committed entity
    Committed(EntityId),
    /// A gesture was discarded without touching committed entities
    Canceled(Tool),
    /// Both scale points are set; the host should ask for value and unit
    ScaleValueRequested { pixel_length: f64 },
    /// The scale answer was not a positive number; the request stays open
    InvalidScaleValue,
    /// Drawing tools need an open image first
    NeedsImage,
    /// Canvas pan/zoom via pointer must be enabled (true) or disabled (false)
    PanZoom(bool),
    /// Derived list entries were recomputed
    ListsChanged,
    /// The selected entity changed
    SelectionChanged(Option<EntityId>),
    /// The label list or active label changed
    LabelsChanged,
}
