//! Inference response JSON and its regrouping into detections.

use serde::{Deserialize, Serialize};

use super::InferenceError;
use crate::model::{Detection, Region};
use crate::scaling::{Coords, ImageSpace};

/// Top-level response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    #[serde(default)]
    pub message: String,
    pub data: InferenceData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceData {
    #[serde(default)]
    pub inference_time: f64,
    #[serde(default)]
    pub results: Vec<InferenceResult>,
    #[serde(default)]
    pub unique_id: String,
}

/// One detected instance in the flat result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    #[serde(rename = "class")]
    pub class_label: String,
    /// Boxes `[x1, y1, x2, y2]` in original-image pixels; only the first is used
    #[serde(default)]
    pub roi_xyxy: Vec<[f32; 4]>,
    /// Polygon outlines as `[x, y]` pairs; only the first is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poly: Option<Vec<Vec<[f32; 2]>>>,
}

impl InferenceResult {
    /// Region for this result at `index` in the flat list, or None when the
    /// result carries no box.
    fn to_region(&self, index: usize) -> Option<Region> {
        let Some(bbox) = self.roi_xyxy.first() else {
            log::warn!(
                "⚠️ Result {} ({}) has no box, skipping",
                index,
                self.class_label
            );
            return None;
        };
        let polygon = self
            .poly
            .as_ref()
            .and_then(|outlines| outlines.first())
            .map(|outline| {
                Coords::<ImageSpace>::new(outline.iter().flat_map(|[x, y]| [*x, *y]).collect())
            });

        Some(Region {
            id: format!("{}-{}", self.class_label, index),
            label: (index + 1).to_string(),
            bbox: Coords::new(bbox.to_vec()),
            polygon,
            visible: true,
        })
    }
}

impl InferenceResponse {
    /// Parse a response body.
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Regroup the flat result list into per-class detections.
    pub fn into_detections(self) -> Vec<Detection> {
        group_detections(&self.data.results)
    }
}

/// Group results by class in first-appearance order.
///
/// Region labels are the 1-based position in the flat list and region ids are
/// `"{class}-{0-based position}"`, so numbering is shared across classes.
pub fn group_detections(results: &[InferenceResult]) -> Vec<Detection> {
    let mut detections: Vec<Detection> = Vec::new();

    for (index, result) in results.iter().enumerate() {
        let Some(region) = result.to_region(index) else {
            continue;
        };
        match detections
            .iter_mut()
            .find(|d| d.class_label == result.class_label)
        {
            Some(detection) => detection.regions.push(region),
            None => {
                let mut detection = Detection::new(result.class_label.clone());
                detection.regions.push(region);
                detections.push(detection);
            }
        }
    }

    log::debug!(
        "🦷 Grouped {} results into {} classes",
        results.len(),
        detections.len()
    );
    detections
}
