//! Browser binding.
//!
//! The page owns the `<img>`, the overlay `<canvas>`, the inference HTTP call
//! and the label popup. It forwards pointer and panel events here and calls
//! [`WebAnnotator::frame`] from `requestAnimationFrame`; the overlay is only
//! redrawn when something changed since the last frame.

use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::config::AppConfig;
use crate::editor::{EditorMessage, LabelStep, Outcome};
use crate::export::export_file_name;
use crate::geometry::Point;
use crate::inference::{InferenceError, InferenceMode, InferenceResponse, RequestToken};
use crate::labels::{AnnotationActions, LabelOptions, LabelSink};
use crate::render::WebCanvasSurface;
use crate::scaling::Size;
use crate::session::{InferenceOutcome, PendingRequest, Session};
use crate::tool::ToolMode;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let level = AppConfig::load_from_local_storage()
        .unwrap_or_default()
        .log_level
        .to_level();
    if console_log::init_with_level(level).is_err() {
        web_sys::console::log_1(&"Logger already initialized".into());
    }
    log::info!("🦷 OPGAT WASM starting");
}

/// Annotation engine bound to one overlay canvas.
#[wasm_bindgen]
pub struct WebAnnotator {
    session: Session,
    config: AppConfig,
    surface: WebCanvasSurface,
    needs_redraw: bool,
    /// Drawing awaiting the label popup, taken by the host
    label_request: Option<String>,
}

#[wasm_bindgen]
impl WebAnnotator {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<WebAnnotator, JsValue> {
        let config = AppConfig::load_from_local_storage().unwrap_or_default();
        let surface = WebCanvasSurface::new(canvas).map_err(js_error)?;
        Ok(Self {
            session: Session::from_config(&config),
            config,
            surface,
            needs_redraw: true,
            label_request: None,
        })
    }

    // ========================================================================
    // Pointer input (displayed-canvas pixels)
    // ========================================================================

    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.send(EditorMessage::PointerDown(Point::new(x, y)))
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.send(EditorMessage::PointerMove(Point::new(x, y)))
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.send(EditorMessage::PointerUp(Point::new(x, y)))
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.send(EditorMessage::PointerLeave)
    }

    pub fn window_pointer_up(&mut self) -> bool {
        self.send(EditorMessage::WindowPointerUp)
    }

    pub fn double_click(&mut self) -> bool {
        self.send(EditorMessage::FinishPolygon)
    }

    // ========================================================================
    // Toolbar, labels and side panel
    // ========================================================================

    /// Select a tool by id (`select`, `move`, `reshape`, `rectangle`, ...).
    pub fn select_tool(&mut self, id: &str) -> bool {
        match ToolMode::from_id(id) {
            Some(tool) => self.send(EditorMessage::SelectTool(tool)),
            None => {
                log::warn!("⚠️ Unknown tool '{}'", id);
                false
            }
        }
    }

    pub fn tool(&self) -> String {
        self.session.editor().tool().id().to_string()
    }

    pub fn undo(&mut self) -> bool {
        self.send(EditorMessage::Undo)
    }

    /// Id of a drawing that needs the label popup, cleared once read.
    pub fn take_label_request(&mut self) -> Option<String> {
        self.label_request.take()
    }

    pub fn tooth_numbers(&self) -> Vec<String> {
        LabelOptions::default()
            .tooth_numbers
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn pathologies(&self) -> Vec<String> {
        LabelOptions::default()
            .pathologies
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn submit_label(&mut self, tooth_number: &str, pathology: &str, custom_pathology: Option<String>) {
        self.session
            .editor_mut()
            .submit_label(tooth_number, pathology, custom_pathology.as_deref());
        self.label_request = None;
        self.needs_redraw = true;
    }

    /// Toggle a drawing or detection region by id.
    pub fn toggle_visibility(&mut self, id: &str) -> bool {
        let changed = self.session.editor_mut().toggle_visibility(id);
        self.needs_redraw |= changed;
        changed
    }

    /// Delete a drawing or detection region by id.
    pub fn delete(&mut self, id: &str) -> bool {
        let changed = self.session.editor_mut().delete(id);
        self.needs_redraw |= changed;
        changed
    }

    pub fn rename_drawing(&mut self, id: &str, label: &str) -> bool {
        self.send(EditorMessage::RenameDrawing(id.to_string(), label.to_string()))
    }

    pub fn rename_region(&mut self, id: &str, label: &str) -> bool {
        self.send(EditorMessage::RenameRegion(id.to_string(), label.to_string()))
    }

    pub fn set_annotations_enabled(&mut self, enabled: bool) -> bool {
        self.send(EditorMessage::SetAnnotationsEnabled(enabled))
    }

    pub fn drawings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.editor().store().drawings()).map_err(js_error)
    }

    pub fn detections_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.editor().store().detections()).map_err(js_error)
    }

    // ========================================================================
    // Image and inference
    // ========================================================================

    /// Select an image. Returns the token of the inference request the host
    /// should now send.
    pub fn load_image(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<Option<f64>, JsValue> {
        let pending = self.session.load_image(file_name, bytes).map_err(js_error)?;
        Ok(self.started(pending))
    }

    pub fn remove_image(&mut self) {
        self.session.remove_image();
        self.label_request = None;
        self.needs_redraw = true;
    }

    /// Switch between `qc` and `path`. Returns a request token when a refetch
    /// is needed. The choice is remembered for the next visit.
    pub fn set_mode(&mut self, model_name: &str) -> Option<f64> {
        let mode = InferenceMode::from_model_name(model_name)?;
        let pending = self.session.set_mode(mode);
        if self.config.default_mode != mode {
            self.config.default_mode = mode;
            if let Err(e) = self.config.save_to_local_storage() {
                log::warn!("⚠️ Could not persist mode: {}", e);
            }
        }
        self.started(pending)
    }

    /// URL the host posts the `file` and `model_name` form fields to.
    pub fn inference_url(&self) -> String {
        self.session.inference_url().to_string()
    }

    pub fn model_name(&self) -> String {
        self.session.mode().model_name().to_string()
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    /// Deliver the response body for `token`. Returns true if applied.
    pub fn complete_inference(&mut self, token: f64, body: &str) -> bool {
        let result = InferenceResponse::from_json(body);
        self.finish(token, result)
    }

    /// Report that the request for `token` failed.
    pub fn fail_inference(&mut self, token: f64, message: &str) {
        self.finish(token, Err(InferenceError::backend(message)));
    }

    // ========================================================================
    // Display
    // ========================================================================

    /// Report the displayed `<img>` box. Returns a request token when the
    /// change triggers a refetch.
    pub fn observe_display_size(&mut self, width: f32, height: f32) -> Option<f64> {
        let pending = self.session.observe_display_size(Size::new(width, height));
        self.needs_redraw = true;
        pending.map(|p| p.token.value() as f64)
    }

    /// Redraw the overlay if anything changed since the last frame.
    pub fn frame(&mut self) -> Result<bool, JsValue> {
        let dirty = self.needs_redraw || self.session.editor().store().is_dirty();
        if !dirty {
            return Ok(false);
        }
        self.session.render(&mut self.surface).map_err(js_error)?;
        self.needs_redraw = false;
        Ok(true)
    }

    /// Flattened PNG of the image and annotations.
    pub fn export_png(&mut self) -> Result<Vec<u8>, JsValue> {
        self.session
            .export()
            .map(|artifact| artifact.png)
            .map_err(js_error)
    }

    pub fn export_file_name(&self) -> Option<String> {
        self.session
            .image()
            .map(|source| export_file_name(&source.file_name))
    }

    /// Pending notifications as a JSON array of `{level, message}`.
    pub fn take_notices(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.take_notices()).map_err(js_error)
    }
}

impl WebAnnotator {
    fn apply(&mut self, outcome: Outcome) -> bool {
        self.needs_redraw |= outcome.redraw;
        match outcome.label_step {
            Some(LabelStep::Open(id)) => self.label_request = Some(id),
            Some(LabelStep::Close) => self.label_request = None,
            None => {}
        }
        outcome.redraw
    }

    fn send(&mut self, message: EditorMessage) -> bool {
        let outcome = self.session.update(message);
        self.apply(outcome)
    }

    fn started(&mut self, pending: Option<PendingRequest>) -> Option<f64> {
        self.needs_redraw = true;
        pending.map(|p| p.token.value() as f64)
    }

    fn finish(&mut self, token: f64, result: Result<InferenceResponse, InferenceError>) -> bool {
        let outcome = self
            .session
            .complete_inference(RequestToken::from_value(token as u64), result);
        self.needs_redraw = true;
        matches!(outcome, InferenceOutcome::Applied { .. })
    }
}
