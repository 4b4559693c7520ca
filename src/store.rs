//! Annotation storage for a single radiograph.
//!
//! Holds the detections returned by inference (original-image pixels), the
//! user drawings (displayed-canvas pixels) and the undo history of the
//! drawings.

use web_time::{SystemTime, UNIX_EPOCH};

use crate::history::{DrawingHistory, HistoryConfig};
use crate::labels::LabelSelection;
use crate::model::{Detection, Drawing, DrawingId, DrawingKind, Region};
use crate::scaling::{CanvasSpace, Coords};

// ============================================================================
// Drawing IDs
// ============================================================================

/// Generates `drawing-<millis>` ids, suffixing `-<n>` when several drawings
/// are created within the same millisecond.
#[derive(Debug, Clone, Default)]
struct IdGenerator {
    last_millis: u128,
    sequence: u32,
}

impl IdGenerator {
    fn next(&mut self) -> DrawingId {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        if millis == self.last_millis {
            self.sequence += 1;
            format!("drawing-{}-{}", millis, self.sequence)
        } else {
            self.last_millis = millis;
            self.sequence = 0;
            format!("drawing-{}", millis)
        }
    }
}

// ============================================================================
// Annotation Store
// ============================================================================

/// Detections, drawings and drawing history for the current image.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    detections: Vec<Detection>,
    drawings: Vec<Drawing>,
    history: DrawingHistory,
    ids: IdGenerator,
    /// Set whenever something visible changes; the host redraws and clears it.
    dirty: bool,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::with_history_config(HistoryConfig::default())
    }

    pub fn with_history_config(config: HistoryConfig) -> Self {
        Self {
            history: DrawingHistory::with_config(config),
            dirty: true,
            ..Default::default()
        }
    }

    /// Check if the store has been modified since last clear_dirty().
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag. Call after redrawing.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn drawings(&self) -> &[Drawing] {
        &self.drawings
    }

    pub fn history(&self) -> &DrawingHistory {
        &self.history
    }

    // ========================================================================
    // Detections
    // ========================================================================

    /// Replace all detections with the result of a new inference call.
    pub fn replace_detections(&mut self, detections: Vec<Detection>) {
        log::info!(
            "🦷 Loaded {} detection classes ({} regions)",
            detections.len(),
            detections.iter().map(|d| d.regions.len()).sum::<usize>()
        );
        self.detections = detections;
        self.mark_dirty();
    }

    pub fn clear_detections(&mut self) {
        if !self.detections.is_empty() {
            self.detections.clear();
            self.mark_dirty();
        }
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.detections
            .iter()
            .flat_map(|d| d.regions.iter())
            .find(|r| r.id == id)
    }

    fn region_mut(&mut self, id: &str) -> Option<&mut Region> {
        self.detections
            .iter_mut()
            .flat_map(|d| d.regions.iter_mut())
            .find(|r| r.id == id)
    }

    /// Flip a region's visibility. Returns false if no region has this id.
    pub fn toggle_region_visibility(&mut self, id: &str) -> bool {
        let Some(region) = self.region_mut(id) else {
            return false;
        };
        region.visible = !region.visible;
        log::debug!("👁️ Region {} visible: {}", id, region.visible);
        self.mark_dirty();
        true
    }

    /// Edit a region's index label in place.
    pub fn rename_region(&mut self, id: &str, label: &str) -> bool {
        let Some(region) = self.region_mut(id) else {
            return false;
        };
        region.label = label.to_string();
        self.mark_dirty();
        true
    }

    /// Remove a region. A detection left without regions is removed as well.
    pub fn delete_region(&mut self, id: &str) -> bool {
        let mut removed = false;
        for detection in &mut self.detections {
            let before = detection.regions.len();
            detection.regions.retain(|r| r.id != id);
            removed |= detection.regions.len() != before;
        }
        if removed {
            self.detections.retain(|d| !d.regions.is_empty());
            log::debug!("🗑️ Deleted region {}", id);
            self.mark_dirty();
        }
        removed
    }

    // ========================================================================
    // Drawings
    // ========================================================================

    /// Snapshot the drawings, then append a new unlabeled shape.
    pub fn commit_drawing(&mut self, kind: DrawingKind, points: Coords<CanvasSpace>) -> DrawingId {
        self.history.push(self.drawings.clone());

        let id = self.ids.next();
        log::info!("✏️ Committed {} {} {:?}", kind.name(), id, points);
        self.drawings.push(Drawing::new(id.clone(), kind, points));
        self.mark_dirty();
        id
    }

    /// Restore the drawings from the most recent snapshot.
    /// Returns false (and changes nothing) if the history is empty.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(snapshot) => {
                self.drawings = snapshot;
                self.mark_dirty();
                true
            }
            None => {
                log::debug!("⏪ Nothing to undo");
                false
            }
        }
    }

    pub fn drawing(&self, id: &str) -> Option<&Drawing> {
        self.drawings.iter().find(|d| d.id == id)
    }

    /// Mutable access to a drawing. Marks the store dirty when found.
    pub fn drawing_mut(&mut self, id: &str) -> Option<&mut Drawing> {
        let drawing = self.drawings.iter_mut().find(|d| d.id == id)?;
        self.dirty = true;
        Some(drawing)
    }

    pub fn last_drawing_id(&self) -> Option<&DrawingId> {
        self.drawings.last().map(|d| &d.id)
    }

    /// Write a label selection onto a drawing.
    pub fn apply_label(&mut self, id: &str, selection: &LabelSelection) -> bool {
        let Some(drawing) = self.drawing_mut(id) else {
            return false;
        };
        drawing.apply_label(selection);
        log::info!("🏷️ Labeled {} as {:?}", id, drawing.label);
        true
    }

    /// Edit a drawing's label text directly. The tooth and pathology fields
    /// are left as they were.
    pub fn rename_drawing(&mut self, id: &str, label: &str) -> bool {
        let Some(drawing) = self.drawing_mut(id) else {
            return false;
        };
        drawing.label = label.to_string();
        true
    }

    pub fn toggle_drawing_visibility(&mut self, id: &str) -> bool {
        let Some(drawing) = self.drawing_mut(id) else {
            return false;
        };
        drawing.visible = !drawing.visible;
        log::debug!("👁️ Drawing {} visible: {}", id, drawing.visible);
        true
    }

    pub fn delete_drawing(&mut self, id: &str) -> bool {
        let before = self.drawings.len();
        self.drawings.retain(|d| d.id != id);
        let removed = self.drawings.len() != before;
        if removed {
            log::debug!("🗑️ Deleted drawing {}", id);
            self.mark_dirty();
        }
        removed
    }

    /// Replace the drawings wholesale, e.g. from a saved file. Clears history.
    pub fn replace_drawings(&mut self, drawings: Vec<Drawing>) {
        self.drawings = drawings;
        self.history.clear();
        self.mark_dirty();
    }

    /// Remove everything: detections, drawings and history.
    pub fn clear(&mut self) {
        self.detections.clear();
        self.drawings.clear();
        self.history.clear();
        self.mark_dirty();
    }
}
