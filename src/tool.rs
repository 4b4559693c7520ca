//! Editing tools and the toolbar that exposes them.

use serde::{Deserialize, Serialize};

use crate::model::DrawingKind;

/// The active canvas tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    /// Inspect only; pointer events never change shapes
    #[default]
    Select,
    /// Drag a whole drawing
    Move,
    /// Drag a single vertex of a drawing
    Reshape,
    Rectangle,
    Line,
    Point,
    Polygon,
}

impl ToolMode {
    /// Stable identifier used by the toolbar.
    pub fn id(&self) -> &'static str {
        match self {
            ToolMode::Select => "select",
            ToolMode::Move => "move",
            ToolMode::Reshape => "reshape",
            ToolMode::Rectangle => "rectangle",
            ToolMode::Line => "line",
            ToolMode::Point => "point",
            ToolMode::Polygon => "polygon",
        }
    }

    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            ToolMode::Select => "Select Tool",
            ToolMode::Move => "Move Tool",
            ToolMode::Reshape => "Reshape Tool",
            ToolMode::Rectangle => "Rectangle Tool",
            ToolMode::Line => "Line Tool",
            ToolMode::Point => "Point Tool",
            ToolMode::Polygon => "Polygon Tool",
        }
    }

    /// Icon token resolved by the host's icon set.
    pub fn icon(&self) -> &'static str {
        match self {
            ToolMode::Select => "mouse-pointer",
            ToolMode::Move => "arrows",
            ToolMode::Reshape => "edit",
            ToolMode::Rectangle => "square",
            ToolMode::Line => "dash",
            ToolMode::Point => "circle",
            ToolMode::Polygon => "bounding-box",
        }
    }

    /// Get all tools in toolbar order.
    pub fn all() -> &'static [ToolMode] {
        &[
            ToolMode::Select,
            ToolMode::Move,
            ToolMode::Reshape,
            ToolMode::Rectangle,
            ToolMode::Line,
            ToolMode::Point,
            ToolMode::Polygon,
        ]
    }

    pub fn from_id(id: &str) -> Option<ToolMode> {
        Self::all().iter().copied().find(|t| t.id() == id)
    }

    /// Kind of drawing this tool creates, if any.
    pub fn drawing_kind(&self) -> Option<DrawingKind> {
        match self {
            ToolMode::Rectangle => Some(DrawingKind::Rectangle),
            ToolMode::Line => Some(DrawingKind::Line),
            ToolMode::Point => Some(DrawingKind::Point),
            ToolMode::Polygon => Some(DrawingKind::Polygon),
            ToolMode::Select | ToolMode::Move | ToolMode::Reshape => None,
        }
    }
}

// ============================================================================
// Toolbar
// ============================================================================

/// What activating a toolbar entry does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Undo,
    SelectTool(ToolMode),
}

/// One toolbar button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarEntry {
    pub id: &'static str,
    pub display_label: &'static str,
    pub icon_token: &'static str,
    pub action: ToolbarAction,
}

/// Toolbar entries in display order: undo first, then every tool.
pub fn toolbar_entries() -> Vec<ToolbarEntry> {
    let undo = ToolbarEntry {
        id: "undo",
        display_label: "Undo",
        icon_token: "undo",
        action: ToolbarAction::Undo,
    };

    std::iter::once(undo)
        .chain(ToolMode::all().iter().map(|tool| ToolbarEntry {
            id: tool.id(),
            display_label: tool.name(),
            icon_token: tool.icon(),
            action: ToolbarAction::SelectTool(*tool),
        }))
        .collect()
}
