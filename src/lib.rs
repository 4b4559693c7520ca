//! OPGAT - OPG Annotation Tool
//!
//! Interactive annotation engine for dental panoramic radiographs. Detections
//! come from a remote inference service; users hide, rename and delete them
//! and add their own rectangles, lines, points and polygons, each labelled
//! with a tooth number and pathology. The annotated image can be flattened
//! into a PNG at the source resolution.
//!
//! The engine runs natively (see the `opgat-native` binary) and in the
//! browser through the `wasm` binding.

pub mod config;
pub mod constants;
pub mod editor;
pub mod export;
pub mod geometry;
pub mod history;
pub mod inference;
pub mod labels;
pub mod model;
pub mod render;
pub mod scaling;
pub mod session;
pub mod store;
pub mod tool;

pub use config::AppConfig;
pub use editor::{Editor, EditorMessage};
pub use session::Session;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
