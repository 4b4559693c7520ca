//! Error types for inference requests and responses.

use thiserror::Error;

/// Errors that can occur while talking to the inference service.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// Response body was not valid JSON or had the wrong shape
    #[error("Invalid inference response: {0}")]
    Json(#[from] serde_json::Error),

    /// The request did not complete (network, HTTP status)
    #[error("Inference request failed: {0}")]
    Backend(String),

    /// No image is loaded to send
    #[error("No image selected")]
    NoImage,
}

impl InferenceError {
    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}
