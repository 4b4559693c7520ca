//! Colors used by the render pipeline.

/// An sRGB color with straight (non-premultiplied) alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Alpha as an 8-bit channel.
    pub fn alpha_u8(&self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// CSS color string for the 2D canvas API.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Fixed colors of the annotation overlay.
pub mod palette {
    use super::Rgba;

    pub const DETECTION_STROKE: Rgba = Rgba::opaque(255, 0, 0);
    pub const DETECTION_CHIP: Rgba = Rgba::new(255, 0, 0, 0.7);
    pub const DRAWING_STROKE: Rgba = Rgba::opaque(0, 255, 0);
    pub const DRAWING_CHIP: Rgba = Rgba::new(0, 255, 0, 0.7);
    pub const CHIP_TEXT: Rgba = Rgba::opaque(255, 255, 255);
    pub const SHADOW: Rgba = Rgba::new(0, 0, 0, 0.5);
    /// Fill for pathology classes missing from the class table
    pub const DEFAULT_CLASS_FILL: Rgba = Rgba::new(255, 0, 0, 0.5);
}

/// Polygon fill per pathology class, as returned by the inference service.
const CLASS_COLORS: &[(&str, Rgba)] = &[
    ("Caries", Rgba::new(255, 0, 0, 0.5)),
    ("Crown", Rgba::new(255, 215, 0, 0.5)),
    ("Filling", Rgba::new(0, 128, 255, 0.5)),
    ("Implant", Rgba::new(192, 192, 192, 0.5)),
    ("Malaligned", Rgba::new(255, 20, 147, 0.5)),
    ("Mandibular Canal", Rgba::new(0, 0, 255, 0.5)),
    ("Missing teeth", Rgba::new(211, 211, 211, 0.5)),
    ("Periapical lesion", Rgba::new(138, 43, 226, 0.5)),
    ("Retained root", Rgba::new(205, 92, 92, 0.5)),
    ("Root Canal Treatment", Rgba::new(75, 0, 130, 0.5)),
    ("Root Piece", Rgba::new(233, 150, 122, 0.5)),
    ("impacted tooth", Rgba::new(255, 165, 0, 0.5)),
    ("maxillary sinus", Rgba::new(65, 105, 225, 0.5)),
    ("Bone Loss", Rgba::new(139, 69, 19, 0.5)),
    ("Fracture teeth", Rgba::new(255, 69, 0, 0.5)),
    ("Permanent Teeth", Rgba::new(46, 139, 87, 0.5)),
    ("Supra Eruption", Rgba::new(34, 139, 34, 0.5)),
    ("TAD", Rgba::new(219, 112, 147, 0.5)),
    ("abutment", Rgba::new(218, 165, 32, 0.5)),
    ("attrition", Rgba::new(210, 105, 30, 0.5)),
    ("bone defect", Rgba::new(160, 82, 45, 0.5)),
    ("gingival former", Rgba::new(112, 128, 144, 0.5)),
    ("metal band", Rgba::new(119, 136, 153, 0.5)),
    ("orthodontic brackets", Rgba::new(255, 182, 193, 0.5)),
    ("permanent retainer", Rgba::new(255, 105, 180, 0.5)),
    ("post - core", Rgba::new(184, 134, 11, 0.5)),
    ("plating", Rgba::new(128, 128, 128, 0.5)),
    ("wire", Rgba::new(169, 169, 169, 0.5)),
    ("Cyst", Rgba::new(148, 0, 211, 0.5)),
    ("Root resorption", Rgba::new(186, 85, 211, 0.5)),
    ("Primary teeth", Rgba::new(60, 179, 113, 0.5)),
];

/// Fill color for a pathology class. Matching ignores ASCII case since the
/// service is inconsistent about it.
pub fn class_color(class_label: &str) -> Rgba {
    CLASS_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(class_label))
        .map(|(_, color)| *color)
        .unwrap_or(palette::DEFAULT_CLASS_FILL)
}
