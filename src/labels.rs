//! Tooth/pathology labelling for user drawings.
//!
//! The label-selection popup is an external collaborator. It receives the
//! option lists from [`LabelOptions`] and reports back through [`LabelSink`];
//! the annotations side panel reaches the engine through
//! [`AnnotationActions`].

use serde::{Deserialize, Serialize};

/// Pathology value that enables free-text entry in the popup.
pub const OTHER_PATHOLOGY: &str = "Other";

/// FDI tooth numbers, quadrant by quadrant.
pub const TOOTH_NUMBERS: &[&str] = &[
    "11", "12", "13", "14", "15", "16", "17", "18", //
    "21", "22", "23", "24", "25", "26", "27", "28", //
    "31", "32", "33", "34", "35", "36", "37", "38", //
    "41", "42", "43", "44", "45", "46", "47", "48",
];

/// Selectable pathologies. [`OTHER_PATHOLOGY`] is always last.
pub const PATHOLOGIES: &[&str] = &[
    "Caries",
    "Deep Caries",
    "Crown",
    "Filling",
    "Implant",
    "Misaligned Teeth",
    "Mandibular Canal",
    "Missing Teeth",
    "Periapical Lesion",
    "Retained Root",
    "Root Canal Treatment",
    "Root Piece",
    "Impacted Tooth",
    "Maxillary Sinus",
    "Bone Loss",
    "Fractured Teeth",
    "Permanent Teeth",
    "Primary Teeth",
    "Supra Eruption",
    "TAD (Temporary Anchorage Device)",
    "Abutment",
    "Attrition",
    "Bone Defect",
    "Gingival Former",
    "Metal Band",
    "Orthodontic Brackets",
    "Permanent Retainer",
    "Post-core",
    "Plating",
    "Wire",
    "Cyst",
    "Root Resorption",
    "Hyperdontia",
    "Hypodontia",
    "Amalgam Tattoo",
    "Periodontal Abscess",
    "Fibrous Dysplasia",
    "Enamel Hypoplasia",
    "Temporomandibular Joint (TMJ) Disorders",
    "Sinusitis",
    "Torus Mandibularis",
    "Zygomatic Process Abnormalities",
    "Cemento-Osseous Dysplasia",
    "Osteosclerosis",
    "Pulp Stones",
    "Dilaceration",
    OTHER_PATHOLOGY,
];

/// Option lists handed to the label-selection popup.
#[derive(Debug, Clone, Copy)]
pub struct LabelOptions {
    pub tooth_numbers: &'static [&'static str],
    pub pathologies: &'static [&'static str],
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            tooth_numbers: TOOTH_NUMBERS,
            pathologies: PATHOLOGIES,
        }
    }
}

/// What the popup submitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelSelection {
    pub tooth_number: String,
    pub pathology: String,
    pub custom_pathology: Option<String>,
}

impl LabelSelection {
    pub fn new(
        tooth_number: impl Into<String>,
        pathology: impl Into<String>,
        custom_pathology: Option<&str>,
    ) -> Self {
        Self {
            tooth_number: tooth_number.into(),
            pathology: pathology.into(),
            custom_pathology: custom_pathology.map(str::to_string),
        }
    }

    /// The popup was closed without choosing: both fields empty.
    pub fn is_cancel(&self) -> bool {
        self.tooth_number.is_empty() && self.pathology.is_empty()
    }

    /// Free-text pathology, if one was typed.
    pub fn custom(&self) -> Option<&str> {
        self.custom_pathology.as_deref().filter(|c| !c.is_empty())
    }

    /// `"{tooth}  {custom}"` when a custom pathology was typed, otherwise
    /// `"{tooth}  {pathology}"`. The double space matches the labels shown in
    /// the side panel.
    pub fn compose(&self) -> String {
        let pathology = self.custom().unwrap_or(&self.pathology);
        format!("{}  {}", self.tooth_number, pathology)
    }
}

/// Receives the result of the label-selection step.
pub trait LabelSink {
    /// Submit a selection. Two empty strings cancel the step.
    fn submit_label(&mut self, tooth_number: &str, pathology: &str, custom_pathology: Option<&str>);
}

/// Per-item operations exposed to the annotations list.
pub trait AnnotationActions {
    /// Flip visibility of a drawing or detection region. Returns false if the id is unknown.
    fn toggle_visibility(&mut self, id: &str) -> bool;

    /// Remove a drawing or detection region. Returns false if the id is unknown.
    fn delete(&mut self, id: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_with_custom_pathology() {
        let sel = LabelSelection::new("11", "Other", Some("Hairline crack"));
        assert_eq!(sel.compose(), "11  Hairline crack");
    }

    #[test]
    fn test_compose_without_custom_pathology() {
        let sel = LabelSelection::new("11", "Caries", Some(""));
        assert_eq!(sel.compose(), "11  Caries");

        let sel = LabelSelection::new("11", "Caries", None);
        assert_eq!(sel.compose(), "11  Caries");
    }

    #[test]
    fn test_cancel_detection() {
        assert!(LabelSelection::new("", "", None).is_cancel());
        assert!(!LabelSelection::new("11", "", None).is_cancel());
    }

    #[test]
    fn test_option_lists() {
        let options = LabelOptions::default();
        assert_eq!(options.tooth_numbers.len(), 32);
        assert_eq!(options.pathologies.last(), Some(&OTHER_PATHOLOGY));
    }
}
