//! Linear undo history for user drawings.
//!
//! Every mutation that adds or completes a shape first pushes a full copy of
//! the drawing collection. Undo pops the most recent copy and the caller
//! swaps it in as the live collection. There is no redo.

use crate::model::Drawing;

/// Configuration for the history stack
#[derive(Debug, Clone, Default)]
pub struct HistoryConfig {
    /// Maximum number of snapshots to keep; `None` keeps every snapshot
    pub max_history: Option<usize>,
}

/// Stack of drawing-collection snapshots, most recent at the end.
#[derive(Debug, Clone, Default)]
pub struct DrawingHistory {
    snapshots: Vec<Vec<Drawing>>,
    config: HistoryConfig,
}

impl DrawingHistory {
    /// Create a new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record the state of the collection before a mutation.
    pub fn push(&mut self, snapshot: Vec<Drawing>) {
        log::debug!("📝 History: pushed snapshot of {} drawings", snapshot.len());
        self.snapshots.push(snapshot);

        // Limit history size
        if let Some(max) = self.config.max_history {
            if self.snapshots.len() > max {
                let excess = self.snapshots.len() - max;
                self.snapshots.drain(..excess);
            }
        }
    }

    /// Take the most recent snapshot, or None if there is nothing to undo.
    pub fn pop(&mut self) -> Option<Vec<Drawing>> {
        let snapshot = self.snapshots.pop()?;
        log::debug!("⏪ History: restoring {} drawings", snapshot.len());
        Some(snapshot)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty()
    }

    /// Number of stored snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.snapshots.clear();
        log::debug!("🗑️ History cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DrawingKind;
    use crate::scaling::Coords;

    fn snapshot(n: usize) -> Vec<Drawing> {
        (0..n)
            .map(|i| {
                Drawing::new(
                    format!("drawing-{i}"),
                    DrawingKind::Point,
                    Coords::new(vec![i as f32, i as f32]),
                )
            })
            .collect()
    }

    #[test]
    fn test_push_pop_order() {
        let mut history = DrawingHistory::new();
        assert!(!history.can_undo());

        history.push(snapshot(0));
        history.push(snapshot(1));
        assert_eq!(history.len(), 2);

        assert_eq!(history.pop().map(|s| s.len()), Some(1));
        assert_eq!(history.pop().map(|s| s.len()), Some(0));
        assert!(history.pop().is_none());
    }

    #[test]
    fn test_max_history() {
        let mut history = DrawingHistory::with_config(HistoryConfig {
            max_history: Some(3),
        });
        for i in 0..5 {
            history.push(snapshot(i));
        }
        assert_eq!(history.len(), 3);
        // The oldest snapshots were dropped
        assert_eq!(history.pop().map(|s| s.len()), Some(4));
        assert_eq!(history.pop().map(|s| s.len()), Some(3));
        assert_eq!(history.pop().map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_unbounded_by_default() {
        let mut history = DrawingHistory::new();
        for i in 0..250 {
            history.push(snapshot(i % 3));
        }
        assert_eq!(history.len(), 250);
    }

    #[test]
    fn test_clear() {
        let mut history = DrawingHistory::new();
        history.push(snapshot(2));
        history.clear();
        assert!(history.is_empty());
    }
}
