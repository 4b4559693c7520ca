//! Regions proposed by the inference service.

use serde::{Deserialize, Serialize};

use crate::constants::polygon;
use crate::geometry::Point;
use crate::scaling::{Coords, ImageSpace};

/// A single detected region, in original-image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Stable identifier, `"{class}-{response index}"`
    pub id: String,
    /// Editable index label, initially the 1-based response position
    pub label: String,
    /// Axis-aligned box `[x1, y1, x2, y2]`
    pub bbox: Coords<ImageSpace>,
    /// Optional outline, flattened `[x0, y0, x1, y1, ...]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Coords<ImageSpace>>,
    pub visible: bool,
}

impl Region {
    /// Polygon outline if it has enough vertices to be filled.
    pub fn fillable_polygon(&self) -> Option<&Coords<ImageSpace>> {
        self.polygon
            .as_ref()
            .filter(|p| p.vertex_count() >= polygon::MIN_VERTICES)
    }

    /// Top-left corner of the box.
    pub fn box_origin(&self) -> Option<Point> {
        self.bbox.vertex(0)
    }

    /// Chip caption, `"{index} {class}"`.
    pub fn caption(&self, class_label: &str) -> String {
        format!("{} {}", self.label, class_label).trim().to_string()
    }
}

/// All regions of one pathology class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_label: String,
    pub regions: Vec<Region>,
}

impl Detection {
    pub fn new(class_label: impl Into<String>) -> Self {
        Self {
            class_label: class_label.into(),
            regions: Vec::new(),
        }
    }

    pub fn visible_regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| r.visible)
    }
}
