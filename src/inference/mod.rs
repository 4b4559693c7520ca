//! Inference service contract.
//!
//! The HTTP call itself is owned by the host. This module defines what is
//! sent (multipart form fields), what comes back (the JSON response), how
//! results are regrouped into per-class [`Detection`](crate::model::Detection)s,
//! and how overlapping requests are serialized with request tokens.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut tracker = RequestTracker::new();
//! let token = tracker.begin();
//! let json = host_post(&request.form_fields())?;
//! if tracker.is_current(token) {
//!     let detections = InferenceResponse::from_json(&json)?.into_detections();
//! }
//! ```

mod error;
mod request;
mod response;

pub use error::InferenceError;
pub use request::{
    FormField, InferenceClient, InferenceRequest, RecordedClient, RequestToken, RequestTracker,
};
pub use response::{InferenceData, InferenceResponse, InferenceResult, group_detections};

use serde::{Deserialize, Serialize};

/// Which model the service should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InferenceMode {
    /// Image quality check, boxes only
    #[default]
    #[serde(rename = "qc")]
    QualityCheck,
    /// Pathology detection, boxes with polygon outlines
    #[serde(rename = "path")]
    PathologyCheck,
}

impl InferenceMode {
    /// Value of the `model_name` form field.
    pub fn model_name(&self) -> &'static str {
        match self {
            InferenceMode::QualityCheck => "qc",
            InferenceMode::PathologyCheck => "path",
        }
    }

    /// Parse a `model_name` value.
    pub fn from_model_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|m| m.model_name() == name)
    }

    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            InferenceMode::QualityCheck => "Quality Check",
            InferenceMode::PathologyCheck => "Pathology Check",
        }
    }

    /// Get all modes.
    pub fn all() -> &'static [InferenceMode] {
        &[InferenceMode::QualityCheck, InferenceMode::PathologyCheck]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_names() {
        assert_eq!(InferenceMode::QualityCheck.model_name(), "qc");
        assert_eq!(InferenceMode::PathologyCheck.model_name(), "path");
        assert_eq!(
            InferenceMode::from_model_name("path"),
            Some(InferenceMode::PathologyCheck)
        );
        assert_eq!(InferenceMode::from_model_name("xray"), None);
    }

    #[test]
    fn test_serde_matches_model_name() {
        for mode in InferenceMode::all() {
            let json = serde_json::to_string(mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.model_name()));
        }
    }
}
