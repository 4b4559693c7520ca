//! Data models for OPGAT.

mod detection;
mod drawing;

pub use detection::{Detection, Region};
pub use drawing::{Drawing, DrawingId, DrawingKind, Translation};
