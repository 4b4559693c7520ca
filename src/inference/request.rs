//! Outgoing requests and the token scheme that serializes them.

use super::{InferenceError, InferenceMode, InferenceResponse};

/// Name of the multipart field carrying the image.
pub const FILE_FIELD: &str = "file";
/// Name of the multipart field carrying the model selector.
pub const MODEL_FIELD: &str = "model_name";

/// One multipart form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField<'a> {
    File {
        name: &'static str,
        file_name: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'static str,
        value: &'static str,
    },
}

/// The image and model selection for one inference call.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mode: InferenceMode,
}

impl InferenceRequest {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>, mode: InferenceMode) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            mode,
        }
    }

    /// Multipart fields in send order: `file`, then `model_name`.
    pub fn form_fields(&self) -> Vec<FormField<'_>> {
        vec![
            FormField::File {
                name: FILE_FIELD,
                file_name: &self.file_name,
                bytes: &self.bytes,
            },
            FormField::Text {
                name: MODEL_FIELD,
                value: self.mode.model_name(),
            },
        ]
    }
}

/// Identifies one request. Later requests always get larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Rebuild a token whose value crossed an FFI boundary.
    pub fn from_value(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Hands out request tokens and remembers the latest one.
///
/// A response is applied only if its token is still the latest; anything
/// older was overtaken by a newer request and is dropped.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    latest: u64,
    pending: bool,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding any in flight.
    pub fn begin(&mut self) -> RequestToken {
        self.latest += 1;
        self.pending = true;
        log::debug!("📨 Inference request #{} started", self.latest);
        RequestToken(self.latest)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }

    /// Mark the request as finished. Returns false for stale tokens, which
    /// leave the pending state untouched.
    pub fn finish(&mut self, token: RequestToken) -> bool {
        if !self.is_current(token) {
            log::warn!(
                "⚠️ Discarding response #{} (latest is #{})",
                token.0,
                self.latest
            );
            return false;
        }
        self.pending = false;
        true
    }

    /// Forget any request in flight; its response will be discarded.
    pub fn invalidate(&mut self) {
        self.latest += 1;
        self.pending = false;
    }

    /// True while the latest request has not finished.
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Performs inference calls for a host without an async runtime.
pub trait InferenceClient {
    fn infer(&mut self, request: &InferenceRequest) -> Result<InferenceResponse, InferenceError>;
}

/// Client that answers every request with a pre-recorded response body.
#[derive(Debug, Clone)]
pub struct RecordedClient {
    body: String,
}

impl RecordedClient {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl InferenceClient for RecordedClient {
    fn infer(&mut self, request: &InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        log::debug!(
            "📼 Replaying recorded response for {} ({})",
            request.file_name,
            request.mode.model_name()
        );
        InferenceResponse::from_json(&self.body)
    }
}
