//! Interactive canvas editor.
//!
//! The editor owns the annotation store and interprets pointer events
//! according to the active tool. Hosts feed it [`EditorMessage`]s and act on
//! the returned [`Outcome`]: redraw when asked, open or close the label popup.

mod construction;

#[cfg(test)]
mod tests;

pub use construction::{Interaction, Preview, closes_polygon};

use crate::constants::{hit, polygon};
use crate::geometry::{Point, find_nearest_vertex, find_shape_at_point};
use crate::history::HistoryConfig;
use crate::inference::InferenceMode;
use crate::labels::{AnnotationActions, LabelSelection, LabelSink};
use crate::model::{DrawingId, DrawingKind};
use crate::render::Scene;
use crate::scaling::{CanvasSpace, Coords};
use crate::store::AnnotationStore;
use crate::tool::{ToolMode, ToolbarAction};

/// Thresholds that shape pointer interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Polygon close radius and reshape grab radius
    pub snap_threshold: f32,
    /// Move-tool hit distance for lines and points
    pub shape_tolerance: f32,
    /// Undo snapshot cap, unbounded when `None`
    pub max_history: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_threshold: hit::SNAP_THRESHOLD,
            shape_tolerance: hit::SHAPE_TOLERANCE,
            max_history: None,
        }
    }
}

/// Input to the editor. Pointer positions are in displayed-canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorMessage {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    /// Pointer left the canvas
    PointerLeave,
    /// Pointer released anywhere in the window
    WindowPointerUp,
    /// Double click while drawing a polygon
    FinishPolygon,
    SelectTool(ToolMode),
    Undo,
    SubmitLabel(LabelSelection),
    ToggleDrawingVisibility(DrawingId),
    DeleteDrawing(DrawingId),
    RenameDrawing(DrawingId, String),
    ToggleRegionVisibility(String),
    DeleteRegion(String),
    RenameRegion(String, String),
    SetAnnotationsEnabled(bool),
}

/// Change to the label-selection popup requested by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelStep {
    /// Ask for a label for this freshly committed drawing
    Open(DrawingId),
    Close,
}

/// Result of handling one message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub redraw: bool,
    pub label_step: Option<LabelStep>,
}

impl Outcome {
    fn none() -> Self {
        Self::default()
    }

    fn redraw() -> Self {
        Self {
            redraw: true,
            label_step: None,
        }
    }

    fn with_label_step(step: LabelStep) -> Self {
        Self {
            redraw: true,
            label_step: Some(step),
        }
    }
}

// ============================================================================
// Editor
// ============================================================================

/// Single state object for the annotation canvas.
#[derive(Debug, Clone)]
pub struct Editor {
    store: AnnotationStore,
    tool: ToolMode,
    interaction: Interaction,
    /// Drawing awaiting the label step
    pending_label: Option<DrawingId>,
    annotations_enabled: bool,
    /// Set while an inference request is in flight
    input_locked: bool,
    config: EditorConfig,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            store: AnnotationStore::with_history_config(HistoryConfig {
                max_history: config.max_history,
            }),
            tool: ToolMode::default(),
            interaction: Interaction::Idle,
            pending_label: None,
            annotations_enabled: true,
            input_locked: false,
            config,
        }
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AnnotationStore {
        &mut self.store
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn pending_label(&self) -> Option<&DrawingId> {
        self.pending_label.as_ref()
    }

    pub fn annotations_enabled(&self) -> bool {
        self.annotations_enabled
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Reject or accept pointer input, e.g. while inference is running.
    /// Locking abandons any construction in progress.
    pub fn set_input_locked(&mut self, locked: bool) {
        if locked && !self.interaction.is_idle() {
            log::debug!("🔒 Input locked, dropping {}", self.interaction.name());
            self.reset_interaction();
        }
        self.input_locked = locked;
    }

    pub fn is_input_locked(&self) -> bool {
        self.input_locked
    }

    /// In-progress construction to draw on top of the scene.
    pub fn preview(&self) -> Option<Preview> {
        Preview::of(&self.interaction, self.config.snap_threshold)
    }

    /// Everything the render pipeline needs for one frame.
    pub fn scene(&self, mode: InferenceMode) -> Scene<'_> {
        Scene {
            detections: self.store.detections(),
            drawings: self.store.drawings(),
            preview: self.preview(),
            annotations_enabled: self.annotations_enabled,
            mode,
        }
    }

    /// Run a toolbar button.
    pub fn activate(&mut self, action: ToolbarAction) -> Outcome {
        match action {
            ToolbarAction::Undo => self.update(EditorMessage::Undo),
            ToolbarAction::SelectTool(tool) => self.update(EditorMessage::SelectTool(tool)),
        }
    }

    /// Handle one message.
    pub fn update(&mut self, message: EditorMessage) -> Outcome {
        match message {
            EditorMessage::PointerDown(p) => self.handle_pointer_down(p),
            EditorMessage::PointerMove(p) => self.handle_pointer_move(p),
            EditorMessage::PointerUp(p) => self.handle_pointer_up(p),
            EditorMessage::PointerLeave => self.handle_pointer_leave(),
            EditorMessage::WindowPointerUp => self.handle_window_pointer_up(),
            EditorMessage::FinishPolygon => self.handle_finish_polygon(),
            EditorMessage::SelectTool(tool) => self.handle_select_tool(tool),
            EditorMessage::Undo => self.handle_undo(),
            EditorMessage::SubmitLabel(selection) => self.handle_label(selection),
            EditorMessage::ToggleDrawingVisibility(id) => {
                changed(self.store.toggle_drawing_visibility(&id))
            }
            EditorMessage::DeleteDrawing(id) => changed(self.store.delete_drawing(&id)),
            EditorMessage::RenameDrawing(id, label) => {
                changed(self.store.rename_drawing(&id, &label))
            }
            EditorMessage::ToggleRegionVisibility(id) => {
                changed(self.store.toggle_region_visibility(&id))
            }
            EditorMessage::DeleteRegion(id) => changed(self.store.delete_region(&id)),
            EditorMessage::RenameRegion(id, label) => changed(self.store.rename_region(&id, &label)),
            EditorMessage::SetAnnotationsEnabled(enabled) => {
                self.annotations_enabled = enabled;
                if !enabled {
                    self.reset_interaction();
                }
                log::debug!("🦷 Annotations enabled: {}", enabled);
                Outcome::redraw()
            }
        }
    }

    // ========================================================================
    // Pointer handling
    // ========================================================================

    fn accepts_pointer(&self) -> bool {
        self.annotations_enabled && !self.input_locked
    }

    fn handle_pointer_down(&mut self, p: Point) -> Outcome {
        if !self.accepts_pointer() {
            return Outcome::none();
        }

        // A drag left behind by a lost pointer-up is abandoned, not committed
        if matches!(self.interaction, Interaction::Drawing { .. }) {
            log::debug!("✖️ Cancelled stale drag");
            self.reset_interaction();
            return Outcome::redraw();
        }

        match self.tool {
            ToolMode::Select => Outcome::none(),
            ToolMode::Move => {
                match find_shape_at_point(p.x, p.y, self.store.drawings(), self.config.shape_tolerance)
                {
                    Some(id) => {
                        log::debug!("✋ Grabbed {}", id);
                        self.interaction = Interaction::Transforming {
                            drawing_id: id.clone(),
                            last: p,
                        };
                    }
                    None => log::debug!("✋ Nothing to move at ({:.0}, {:.0})", p.x, p.y),
                }
                Outcome::none()
            }
            ToolMode::Reshape => {
                if let Some(hit) =
                    find_nearest_vertex(p.x, p.y, self.store.drawings(), self.config.snap_threshold)
                {
                    log::debug!("🔧 Grabbed vertex {} of {}", hit.vertex_index, hit.drawing_id);
                    self.interaction = Interaction::DraggingVertex {
                        offset: Point::new(hit.original_x - p.x, hit.original_y - p.y),
                        drawing_id: hit.drawing_id,
                        vertex_index: hit.vertex_index,
                    };
                }
                Outcome::none()
            }
            tool => match tool.drawing_kind() {
                Some(DrawingKind::Point) => {
                    self.commit(DrawingKind::Point, Coords::from_points(&[p]))
                }
                Some(DrawingKind::Polygon) => self.handle_polygon_click(p),
                Some(kind) => {
                    self.interaction = Interaction::Drawing {
                        kind,
                        start: p,
                        current: p,
                    };
                    Outcome::none()
                }
                None => Outcome::none(),
            },
        }
    }

    fn handle_polygon_click(&mut self, p: Point) -> Outcome {
        let snap = self.config.snap_threshold;
        match &mut self.interaction {
            Interaction::Polygon { vertices, cursor } => {
                if closes_polygon(vertices, p, snap) {
                    let points = Coords::from_points(vertices);
                    log::debug!("🔺 Closing polygon with {} vertices", vertices.len());
                    return self.commit(DrawingKind::Polygon, points);
                }
                vertices.push(p);
                *cursor = Some(p);
            }
            _ => {
                self.interaction = Interaction::Polygon {
                    vertices: vec![p],
                    cursor: Some(p),
                };
            }
        }
        Outcome::redraw()
    }

    fn handle_pointer_move(&mut self, p: Point) -> Outcome {
        match &mut self.interaction {
            Interaction::Idle => Outcome::none(),
            Interaction::Drawing { current, .. } => {
                *current = p;
                Outcome::redraw()
            }
            Interaction::Polygon { cursor, .. } => {
                *cursor = Some(p);
                Outcome::redraw()
            }
            Interaction::DraggingVertex {
                drawing_id,
                vertex_index,
                offset,
            } => {
                let target = Point::new(p.x + offset.x, p.y + offset.y);
                let index = *vertex_index;
                let id = drawing_id.clone();
                match self.store.drawing_mut(&id) {
                    Some(drawing) => {
                        drawing.move_handle(index, target);
                        Outcome::redraw()
                    }
                    None => {
                        log::debug!("🔧 Drag target {} is gone", id);
                        self.reset_interaction();
                        Outcome::none()
                    }
                }
            }
            Interaction::Transforming { drawing_id, last } => {
                let delta = p.offset_from(last);
                *last = p;
                let id = drawing_id.clone();
                match self.store.drawing_mut(&id) {
                    Some(drawing) => {
                        drawing.translate(delta.x, delta.y);
                        Outcome::redraw()
                    }
                    None => {
                        self.reset_interaction();
                        Outcome::none()
                    }
                }
            }
        }
    }

    fn handle_pointer_up(&mut self, p: Point) -> Outcome {
        match std::mem::take(&mut self.interaction) {
            Interaction::Drawing { kind, start, .. } => {
                self.commit(kind, Coords::from_points(&[start, p]))
            }
            // Polygons finish by click, not release
            polygon @ Interaction::Polygon { .. } => {
                self.interaction = polygon;
                Outcome::none()
            }
            Interaction::DraggingVertex { .. } | Interaction::Transforming { .. } => {
                Outcome::redraw()
            }
            Interaction::Idle => Outcome::none(),
        }
    }

    fn handle_pointer_leave(&mut self) -> Outcome {
        match &mut self.interaction {
            Interaction::Drawing { .. } => {
                log::debug!("✖️ Pointer left canvas, drag cancelled");
                self.reset_interaction();
                Outcome::redraw()
            }
            Interaction::Polygon { cursor, .. } => {
                *cursor = None;
                Outcome::redraw()
            }
            _ => Outcome::none(),
        }
    }

    fn handle_window_pointer_up(&mut self) -> Outcome {
        match self.interaction {
            Interaction::Transforming { .. } | Interaction::DraggingVertex { .. } => {
                self.reset_interaction();
                Outcome::redraw()
            }
            _ => Outcome::none(),
        }
    }

    fn handle_finish_polygon(&mut self) -> Outcome {
        let Interaction::Polygon { vertices, .. } = &self.interaction else {
            return Outcome::none();
        };

        // The clicks of the double click itself land on the same spot
        let mut vertices = vertices.clone();
        vertices.dedup();
        if vertices.len() < polygon::MIN_VERTICES {
            log::debug!("🔺 Too few vertices to finish polygon");
            return Outcome::none();
        }
        self.commit(DrawingKind::Polygon, Coords::from_points(&vertices))
    }

    fn commit(&mut self, kind: DrawingKind, points: Coords<CanvasSpace>) -> Outcome {
        let id = self.store.commit_drawing(kind, points);
        self.interaction = Interaction::Idle;
        self.pending_label = Some(id.clone());
        Outcome::with_label_step(LabelStep::Open(id))
    }

    fn reset_interaction(&mut self) {
        self.interaction = Interaction::Idle;
    }

    // ========================================================================
    // Tools, undo and labels
    // ========================================================================

    fn handle_select_tool(&mut self, tool: ToolMode) -> Outcome {
        if !self.interaction.is_idle() {
            log::debug!("✖️ Discarding {} on tool switch", self.interaction.name());
        }
        self.reset_interaction();
        self.tool = tool;
        log::debug!("🛠️ Tool: {}", tool.name());
        Outcome::redraw()
    }

    fn handle_undo(&mut self) -> Outcome {
        if !self.store.undo() {
            return Outcome::none();
        }
        self.reset_interaction();
        if self.pending_label.take().is_some() {
            return Outcome::with_label_step(LabelStep::Close);
        }
        Outcome::redraw()
    }

    fn handle_label(&mut self, selection: LabelSelection) -> Outcome {
        self.pending_label = None;
        if selection.is_cancel() {
            log::debug!("🏷️ Label step cancelled");
            return Outcome::with_label_step(LabelStep::Close);
        }

        if let Some(id) = self.store.last_drawing_id().cloned() {
            self.store.apply_label(&id, &selection);
        }
        Outcome::with_label_step(LabelStep::Close)
    }
}

fn changed(found: bool) -> Outcome {
    if found { Outcome::redraw() } else { Outcome::none() }
}

// ============================================================================
// Capabilities
// ============================================================================

impl LabelSink for Editor {
    fn submit_label(&mut self, tooth_number: &str, pathology: &str, custom_pathology: Option<&str>) {
        self.update(EditorMessage::SubmitLabel(LabelSelection::new(
            tooth_number,
            pathology,
            custom_pathology,
        )));
    }
}

impl AnnotationActions for Editor {
    fn toggle_visibility(&mut self, id: &str) -> bool {
        self.store.toggle_drawing_visibility(id) || self.store.toggle_region_visibility(id)
    }

    fn delete(&mut self, id: &str) -> bool {
        self.store.delete_drawing(id) || self.store.delete_region(id)
    }
}
