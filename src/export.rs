//! Flattened raster export.
//!
//! The source image is copied onto an offscreen surface at its native size and
//! the annotations are drawn over it with [`render_export`]. The result is
//! always encoded as PNG.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;

use crate::render::{RenderError, Scene, SkiaSurface, render_export};
use crate::scaling::Size;

/// Prefix added to the source file name.
const FILE_PREFIX: &str = "annotated_";

/// Errors raised while producing an export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Nothing has been loaded yet
    #[error("No image to download")]
    MissingSourceImage,

    /// The offscreen surface could not be created
    #[error("Render target unavailable: {0}")]
    Surface(#[from] RenderError),

    /// PNG encoding failed
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),

    /// Writing the artifact failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Whether the user should be told about this failure. A missing render
    /// target is skipped without a message.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, ExportError::Surface(_))
    }
}

/// An encoded export ready to be downloaded or written to disk.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub png: Vec<u8>,
}

impl ExportArtifact {
    /// Write the PNG into `dir` under its artifact name.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.png)?;
        log::info!("💾 Wrote {:?} ({} bytes)", path, self.png.len());
        Ok(path)
    }
}

/// Artifact name for a source file, `annotated_<name>`.
pub fn export_file_name(source_name: &str) -> String {
    format!("{}{}", FILE_PREFIX, source_name)
}

/// Draw the scene over a full-resolution copy of `image`.
///
/// `displayed` is the on-screen size the drawings were made at.
pub fn flatten(
    image: &DynamicImage,
    scene: &Scene<'_>,
    displayed: Size,
    font: Option<FontArc>,
) -> Result<RgbaImage, ExportError> {
    let mut surface = SkiaSurface::from_image(image)?.with_font(font);
    render_export(&mut surface, scene, displayed);
    Ok(surface.to_image())
}

/// Encode an RGBA buffer as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Flatten and encode in one step.
pub fn export_annotated(
    source_name: &str,
    image: &DynamicImage,
    scene: &Scene<'_>,
    displayed: Size,
    font: Option<FontArc>,
) -> Result<ExportArtifact, ExportError> {
    log::debug!(
        "📤 Exporting {} at {}x{}",
        source_name,
        image.width(),
        image.height()
    );
    let flattened = flatten(image, scene, displayed, font)?;
    let png = encode_png(&flattened)?;
    Ok(ExportArtifact {
        file_name: export_file_name(source_name),
        png,
    })
}
