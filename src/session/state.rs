use crate::annotations::lists::EntityLists;
use crate::calibration::Calibration;
use crate::config::AppConfig;
use crate::domain::{AnnotationSet, EntityId, ImageIdentity, LabelSet, Point, nearest_within};

/// Drawing tools; at most one is active at a time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    Region,
    Boundary,
    Scale,
    Measure,
}

impl Tool {
    /// Tools that build a closed polygon click by click
    pub fn is_polygon(self) -> bool {
        matches!(self, Tool::Region | Tool::Boundary)
    }
}

/// Uncommitted points of the gesture in progress
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scratch {
    /// Clicked points in click order
    pub points: Vec<Point>,
    /// Last known pointer position, for the live preview
    pub cursor: Option<Point>,
}

/// Drawing state machine
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EditorState {
    #[default]
    Idle,
    DrawingRegion(Scratch),
    DrawingBoundary(Scratch),
    SettingScale(Scratch),
    /// Both scale points captured, waiting for the value/unit answer
    ScalePending { p1: Point, p2: Point },
    Measuring(Scratch),
}

impl EditorState {
    /// Fresh state for a tool
    pub fn start(tool: Tool) -> Self {
        let scratch = Scratch::default();
        match tool {
            Tool::Region => EditorState::DrawingRegion(scratch),
            Tool::Boundary => EditorState::DrawingBoundary(scratch),
            Tool::Scale => EditorState::SettingScale(scratch),
            Tool::Measure => EditorState::Measuring(scratch),
        }
    }

    /// Tool owning the current state, None when idle
    pub fn tool(&self) -> Option<Tool> {
        match self {
            EditorState::Idle => None,
            EditorState::DrawingRegion(_) => Some(Tool::Region),
            EditorState::DrawingBoundary(_) => Some(Tool::Boundary),
            EditorState::SettingScale(_) | EditorState::ScalePending { .. } => Some(Tool::Scale),
            EditorState::Measuring(_) => Some(Tool::Measure),
        }
    }

    pub fn scratch(&self) -> Option<&Scratch> {
        match self {
            EditorState::DrawingRegion(s)
            | EditorState::DrawingBoundary(s)
            | EditorState::SettingScale(s)
            | EditorState::Measuring(s) => Some(s),
            EditorState::Idle | EditorState::ScalePending { .. } => None,
        }
    }

    pub fn scratch_mut(&mut self) -> Option<&mut Scratch> {
        match self {
            EditorState::DrawingRegion(s)
            | EditorState::DrawingBoundary(s)
            | EditorState::SettingScale(s)
            | EditorState::Measuring(s) => Some(s),
            EditorState::Idle | EditorState::ScalePending { .. } => None,
        }
    }
}

/// Vertex being dragged
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragState {
    pub entity: EntityId,
    pub index: usize,
}

/// Current zoom of the host canvas
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Image pixels covered by one screen pixel
    pub view_pixel_size: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            view_pixel_size: 1.0,
        }
    }
}

impl Viewport {
    /// Convert a screen-pixel distance into image pixels
    pub fn to_image(&self, screen_px: f64) -> f64 {
        screen_px * self.view_pixel_size
    }
}

/// Live preview of the gesture in progress
#[derive(Clone, Debug, PartialEq)]
pub struct ScratchPreview {
    pub tool: Tool,
    /// Clicked points followed by the (possibly snapped) cursor
    pub path: Vec<Point>,
    /// Clicked points only
    pub markers: Vec<Point>,
    /// First polygon point, shown with a snap ring
    pub snap_anchor: Option<Point>,
    /// Whether the cursor is snapped onto the first point
    pub snapping: bool,
}

/// The editing session: owns the annotations and the drawing state
#[derive(Clone, Debug)]
pub struct Session {
    pub(crate) set: AnnotationSet,
    pub(crate) state: EditorState,
    pub(crate) drag: Option<DragState>,
    pub(crate) selected: Option<EntityId>,
    pub(crate) active_label: String,
    pub(crate) viewport: Viewport,
    pub(crate) image_open: bool,
    pub(crate) snap_radius_px: f64,
    pub(crate) handle_radius_px: f64,
    pub(crate) require_image: bool,
    pub(crate) lists: EntityLists,
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        let set = AnnotationSet {
            labels: LabelSet::with_label(&config.default_label, config.default_label_color),
            ..Default::default()
        };
        Self {
            set,
            state: EditorState::Idle,
            drag: None,
            selected: None,
            active_label: config.default_label.clone(),
            viewport: Viewport::default(),
            image_open: false,
            snap_radius_px: config.snap_radius_px,
            handle_radius_px: config.handle_radius_px,
            require_image: config.require_image,
            lists: EntityLists::default(),
        }
    }

    /// Attach the source image; annotations already drawn are kept
    pub fn open_image(&mut self, image: ImageIdentity) {
        log::info!(
            "Image opened: {} [{}x{}]",
            image.path,
            image.size.0,
            image.size.1
        );
        self.set.image = image;
        self.image_open = true;
        self.refresh_lists();
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.set
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn drag(&self) -> Option<DragState> {
        self.drag
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn active_label(&self) -> &str {
        &self.active_label
    }

    pub fn labels(&self) -> &LabelSet {
        &self.set.labels
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn lists(&self) -> &EntityLists {
        &self.lists
    }

    /// Canvas pan/zoom is off while a vertex is dragged
    pub fn pan_zoom_enabled(&self) -> bool {
        self.drag.is_none()
    }

    /// Calibration from the current scale endpoints
    pub fn calibration(&self) -> Option<Calibration> {
        Calibration::from_scale(self.set.scale.as_ref())
    }

    /// Points awaiting a scale value, if the request is open
    pub fn pending_scale(&self) -> Option<(Point, Point)> {
        match self.state {
            EditorState::ScalePending { p1, p2 } => Some((p1, p2)),
            _ => None,
        }
    }

    /// Snap radius in image pixels at the current zoom
    pub fn snap_radius(&self) -> f64 {
        self.viewport.to_image(self.snap_radius_px)
    }

    /// Handle hit radius in image pixels at the current zoom
    pub fn handle_radius(&self) -> f64 {
        self.viewport.to_image(self.handle_radius_px)
    }

    /// Handle of the selected entity under `pos`, if any
    pub fn hit_handle(&self, pos: Point) -> Option<DragState> {
        let entity = self.selected?;
        let vertices = self.set.vertices(entity)?;
        let index = nearest_within(&vertices, pos, self.handle_radius())?;
        Some(DragState { entity, index })
    }

    /// Whether a polygon click at `pos` closes the scratch polygon
    pub(crate) fn closes_polygon(&self, scratch: &Scratch, pos: Point) -> bool {
        match scratch.points.first() {
            Some(first) if scratch.points.len() >= 3 => first.is_near(pos, self.snap_radius()),
            _ => false,
        }
    }

    /// Preview path and markers of the gesture in progress
    pub fn scratch_preview(&self) -> Option<ScratchPreview> {
        let tool = self.state.tool()?;
        let Some(scratch) = self.state.scratch() else {
            // Scale request open: show the captured segment
            let (p1, p2) = self.pending_scale()?;
            return Some(ScratchPreview {
                tool,
                path: vec![p1, p2],
                markers: vec![p1, p2],
                snap_anchor: None,
                snapping: false,
            });
        };

        let mut path = scratch.points.clone();
        let mut snapping = false;
        let snap_anchor = if tool.is_polygon() {
            scratch.points.first().copied()
        } else {
            None
        };
        if let Some(cursor) = scratch.cursor
            && !scratch.points.is_empty()
        {
            match snap_anchor {
                // Preview snaps from the second point on so the closing edge is visible
                Some(first) if scratch.points.len() >= 2 && first.is_near(cursor, self.snap_radius()) => {
                    snapping = true;
                    path.push(first);
                }
                _ => path.push(cursor),
            }
        }
        Some(ScratchPreview {
            tool,
            path,
            markers: scratch.points.clone(),
            snap_anchor,
            snapping,
        })
    }

    /// Recompute list entries unless a drag is in progress
    pub(crate) fn refresh_lists(&mut self) -> bool {
        if self.drag.is_some() {
            return false;
        }
        self.lists = EntityLists::build(&self.set);
        true
    }
}
