//! Global constants for the OPGAT annotation engine

/// Pointer proximity thresholds, in displayed-canvas pixels.
pub mod hit {
    /// Radius for polygon closing and reshape vertex grabbing
    pub const SNAP_THRESHOLD: f32 = 10.0;
    /// Distance under which a line or point counts as hit by the move tool
    pub const SHAPE_TOLERANCE: f32 = 10.0;
}

/// Polygon construction limits.
pub mod polygon {
    /// A polygon needs at least this many vertices before it may be closed
    pub const MIN_VERTICES: usize = 3;
}

/// Stroke and marker metrics at a scale of 1.0.
pub mod stroke {
    /// Outline width for boxes, lines and polygons
    pub const WIDTH: f32 = 2.0;
    /// Radius of a point marker
    pub const POINT_RADIUS: f32 = 3.0;
    /// Radius of the snap indicator drawn around the first polygon vertex
    pub const SNAP_INDICATOR_RADIUS: f32 = 6.0;
}

/// Label chip metrics at a scale of 1.0.
pub mod label {
    /// Font size for chip text
    pub const FONT_SIZE: f32 = 14.0;
    /// Height of the chip rectangle drawn above the anchor
    pub const CHIP_HEIGHT: f32 = 20.0;
    /// Horizontal text inset, also the text baseline offset from the anchor
    pub const CHIP_PADDING: f32 = 5.0;
}

/// Drop shadow used for filled pathology polygons.
pub mod shadow {
    /// Blur radius
    pub const BLUR: f32 = 5.0;
    /// Offset step; detection class `n` (0-based) is offset by `STEP * (n + 1)`
    pub const STEP: f32 = 2.0;
}

/// Minimum change of the displayed image size (per axis) that counts as a resize.
pub const RESIZE_THRESHOLD: f32 = 10.0;
