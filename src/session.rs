//! Page-level controller around the [`Editor`].
//!
//! Owns the loaded image, the inference mode and request serialization, the
//! loading gate, the resize detector that triggers refetches, export, and the
//! queue of user notifications.

use ab_glyph::FontArc;
use image::DynamicImage;
use serde::Serialize;

use crate::config::AppConfig;
use crate::constants::RESIZE_THRESHOLD;
use crate::editor::{Editor, EditorConfig, EditorMessage, Outcome};
use crate::export::{ExportArtifact, ExportError, export_annotated};
use crate::inference::{
    InferenceClient, InferenceError, InferenceMode, InferenceRequest, InferenceResponse,
    RequestToken, RequestTracker,
};
use crate::render::{RenderError, Surface, render_display};
use crate::scaling::Size;

/// Message shown when an inference call fails.
pub const INFERENCE_FAILED: &str = "Failed to process image";
/// Message shown after a successful export.
pub const EXPORT_COMPLETED: &str = "Download completed";

// ============================================================================
// Notices
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A toast-style message for the host to show once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

// ============================================================================
// Resize detection
// ============================================================================

/// Coalesces display-size changes: only a change larger than the threshold
/// on either axis, measured against the last significant size, counts.
#[derive(Debug, Clone)]
pub struct ResizeWatcher {
    last: Size,
    threshold: f32,
}

impl Default for ResizeWatcher {
    fn default() -> Self {
        Self::new(RESIZE_THRESHOLD)
    }
}

impl ResizeWatcher {
    pub fn new(threshold: f32) -> Self {
        Self {
            last: Size::default(),
            threshold,
        }
    }

    /// Record `size`. Returns true and remembers it if the change is significant.
    pub fn observe(&mut self, size: Size) -> bool {
        if !size.differs_from(&self.last, self.threshold) {
            return false;
        }
        log::debug!(
            "📐 Display size {}x{} -> {}x{}",
            self.last.width,
            self.last.height,
            size.width,
            size.height
        );
        self.last = size;
        true
    }

    pub fn last(&self) -> Size {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = Size::default();
    }
}

// ============================================================================
// Session
// ============================================================================

/// The uploaded radiograph.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub image: DynamicImage,
}

impl SourceImage {
    pub fn decode(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, image::ImageError> {
        let image = image::load_from_memory(&bytes)?;
        Ok(Self {
            file_name: file_name.into(),
            bytes,
            image,
        })
    }

    /// Native pixel size.
    pub fn size(&self) -> Size {
        Size::from((self.image.width(), self.image.height()))
    }
}

/// An inference call the host should now perform.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub token: RequestToken,
    /// URL the multipart form is posted to
    pub endpoint: String,
    pub request: InferenceRequest,
}

/// What happened to a completed inference call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceOutcome {
    /// Detections replaced with this many classes
    Applied { classes: usize },
    /// A newer request superseded this one
    Stale,
    Failed,
}

pub struct Session {
    editor: Editor,
    image: Option<SourceImage>,
    mode: InferenceMode,
    endpoint: String,
    requests: RequestTracker,
    /// Whether a response has been applied for the current image
    has_response: bool,
    displayed: Size,
    resize: ResizeWatcher,
    notices: Vec<Notice>,
    font: Option<FontArc>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("image", &self.image.as_ref().map(|i| i.file_name.as_str()))
            .field("mode", &self.mode)
            .field("loading", &self.is_loading())
            .field("displayed", &self.displayed)
            .field("notices", &self.notices.len())
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EditorConfig::default(), RESIZE_THRESHOLD)
    }
}

impl Session {
    pub fn new(editor_config: EditorConfig, resize_threshold: f32) -> Self {
        Self {
            editor: Editor::new(editor_config),
            image: None,
            mode: InferenceMode::default(),
            endpoint: AppConfig::default().inference_url,
            requests: RequestTracker::new(),
            has_response: false,
            displayed: Size::default(),
            resize: ResizeWatcher::new(resize_threshold),
            notices: Vec::new(),
            font: None,
        }
    }

    /// Session using the thresholds and default mode of `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut session = Self::new(config.editor_config(), config.resize_threshold);
        session.mode = config.default_mode;
        session.endpoint = config.inference_url.clone();
        session
    }

    /// Font used for export label text.
    pub fn with_font(mut self, font: Option<FontArc>) -> Self {
        self.font = font;
        self
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    /// Forward one message to the editor.
    pub fn update(&mut self, message: EditorMessage) -> Outcome {
        self.editor.update(message)
    }

    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    pub fn mode(&self) -> InferenceMode {
        self.mode
    }

    /// Inference service URL requests are sent to.
    pub fn inference_url(&self) -> &str {
        &self.endpoint
    }

    pub fn displayed_size(&self) -> Size {
        self.displayed
    }

    /// True while an inference request is in flight.
    pub fn is_loading(&self) -> bool {
        self.requests.is_pending()
    }

    /// Drain the pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ========================================================================
    // Image lifecycle
    // ========================================================================

    /// Decode and select a new image, then request inference for it.
    ///
    /// Detections of the previous image are dropped; drawings are kept.
    pub fn load_image(
        &mut self,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Option<PendingRequest>, image::ImageError> {
        let source = SourceImage::decode(file_name, bytes)?;
        log::info!(
            "🖼️ Loaded {} ({}x{})",
            source.file_name,
            source.image.width(),
            source.image.height()
        );
        self.image = Some(source);
        self.has_response = false;
        self.editor.store_mut().clear_detections();
        Ok(self.begin_inference().ok())
    }

    /// Drop the image together with every detection and drawing.
    pub fn remove_image(&mut self) {
        if let Some(source) = self.image.take() {
            log::info!("🗑️ Removed {}", source.file_name);
        }
        self.requests.invalidate();
        self.has_response = false;
        self.editor.set_input_locked(false);
        self.editor.store_mut().clear();
        self.displayed = Size::default();
        self.resize.reset();
    }

    // ========================================================================
    // Inference
    // ========================================================================

    /// Switch the model. Refetches when an image is loaded and the mode changed.
    pub fn set_mode(&mut self, mode: InferenceMode) -> Option<PendingRequest> {
        if mode == self.mode {
            return None;
        }
        log::info!("🔀 Inference mode: {}", mode.name());
        self.mode = mode;
        self.editor.store_mut().mark_dirty();
        self.begin_inference().ok()
    }

    /// Start a request for the current image: clear detections, show the
    /// loading state and lock drawing input.
    pub fn begin_inference(&mut self) -> Result<PendingRequest, InferenceError> {
        let source = self.image.as_ref().ok_or(InferenceError::NoImage)?;
        let request = InferenceRequest::new(source.file_name.clone(), source.bytes.clone(), self.mode);
        let token = self.requests.begin();
        self.editor.store_mut().clear_detections();
        self.editor.set_input_locked(true);
        log::info!(
            "📨 Requesting {} inference for {}",
            self.mode.model_name(),
            request.file_name
        );
        Ok(PendingRequest {
            token,
            endpoint: self.endpoint.clone(),
            request,
        })
    }

    /// Apply the result of the request identified by `token`.
    pub fn complete_inference(
        &mut self,
        token: RequestToken,
        result: Result<InferenceResponse, InferenceError>,
    ) -> InferenceOutcome {
        if !self.requests.finish(token) {
            return InferenceOutcome::Stale;
        }
        self.editor.set_input_locked(false);

        match result {
            Ok(response) => {
                log::debug!(
                    "⏱️ Inference took {:.3}s ({})",
                    response.data.inference_time,
                    response.message
                );
                let detections = response.into_detections();
                let classes = detections.len();
                self.editor.store_mut().replace_detections(detections);
                self.has_response = true;
                InferenceOutcome::Applied { classes }
            }
            Err(e) => {
                log::error!("❌ Inference failed: {}", e);
                self.notices.push(Notice::error(INFERENCE_FAILED));
                self.editor.store_mut().mark_dirty();
                InferenceOutcome::Failed
            }
        }
    }

    /// Run a request to completion with a blocking client.
    pub fn run_inference<C: InferenceClient>(
        &mut self,
        client: &mut C,
        pending: PendingRequest,
    ) -> InferenceOutcome {
        let result = client.infer(&pending.request);
        self.complete_inference(pending.token, result)
    }

    // ========================================================================
    // Display size
    // ========================================================================

    /// Record the displayed image box. Returns a refetch request when the
    /// change is significant and the current image already has a response.
    pub fn observe_display_size(&mut self, size: Size) -> Option<PendingRequest> {
        self.displayed = size;
        if !self.resize.observe(size) || !self.has_response {
            return None;
        }
        self.on_significant_resize(size.width, size.height)
    }

    /// Refetch after a significant resize.
    pub fn on_significant_resize(&mut self, new_width: f32, new_height: f32) -> Option<PendingRequest> {
        log::debug!("📐 Refetching after resize to {}x{}", new_width, new_height);
        self.displayed = Size::new(new_width, new_height);
        self.begin_inference().ok()
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Redraw the overlay at the current displayed size.
    pub fn render(&mut self, surface: &mut dyn Surface) -> Result<(), RenderError> {
        let original = self.image.as_ref().map(SourceImage::size).unwrap_or_default();
        render_display(surface, &self.editor.scene(self.mode), original, self.displayed)?;
        self.editor.store_mut().clear_dirty();
        Ok(())
    }

    /// Flatten the image and annotations into a PNG.
    pub fn export(&mut self) -> Result<ExportArtifact, ExportError> {
        let result = match &self.image {
            Some(source) => export_annotated(
                &source.file_name,
                &source.image,
                &self.editor.scene(self.mode),
                self.displayed,
                self.font.clone(),
            ),
            None => Err(ExportError::MissingSourceImage),
        };

        match &result {
            Ok(artifact) => {
                log::info!("📤 Exported {}", artifact.file_name);
                self.notices.push(Notice::success(EXPORT_COMPLETED));
            }
            Err(e) if e.is_user_visible() => {
                log::error!("❌ Export failed: {}", e);
                self.notices.push(Notice::error(e.to_string()));
            }
            Err(e) => log::warn!("⚠️ Export skipped: {}", e),
        }
        result
    }
}
