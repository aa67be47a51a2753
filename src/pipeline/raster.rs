//! Rasterisation: turn the frozen preview surface into pixels.
//!
//! The [`Rasterizer`] trait is the seam; [`PdfiumRasterizer`] is the default
//! implementation. It paints the surface as a vector page
//! ([`crate::pipeline::surface`]) and renders that page with pdfium.
//!
//! ## Why bind pdfium per call?
//!
//! The pdfium library is loaded dynamically. Binding inside the render call
//! means a missing library fails one export with
//! [`PipelineError::DependencyLoad`] instead of failing at start-up, and the
//! rest of the quote builder keeps working without it.
//!
//! ## Why spawn_blocking?
//!
//! pdfium uses thread-local state internally and is not safe to call from
//! async contexts. `tokio::task::spawn_blocking` moves the work onto a
//! dedicated blocking thread.

use crate::error::PipelineError;
use crate::pipeline::surface::paint_surface;
use crate::preview::PreviewSurface;
use async_trait::async_trait;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Capture options passed to a [`Rasterizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Output pixels per native surface pixel.
    pub scale: f32,
    /// Only paint images whose bytes are inline in the surface.
    pub cross_origin_safe: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            cross_origin_safe: true,
        }
    }
}

/// A rasterised surface.
#[derive(Debug, Clone)]
pub struct RasterImage {
    image: DynamicImage,
}

impl RasterImage {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Converts a preview surface into a raster image.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn render(
        &self,
        surface: &PreviewSurface,
        options: RenderOptions,
    ) -> Result<RasterImage, PipelineError>;
}

/// Default rasteriser backed by pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    lib_path: Option<PathBuf>,
}

impl PdfiumRasterizer {
    /// Bind to the library at `lib_path` (a file or a directory containing
    /// the platform library), else `PDFIUM_LIB_PATH`, else the system library.
    pub fn new(lib_path: Option<PathBuf>) -> Self {
        Self { lib_path }
    }
}

#[async_trait]
impl Rasterizer for PdfiumRasterizer {
    async fn render(
        &self,
        surface: &PreviewSurface,
        options: RenderOptions,
    ) -> Result<RasterImage, PipelineError> {
        let surface = surface.clone();
        let target_width = (surface.width * f64::from(options.scale)).round() as i32;
        let lib_path = self.lib_path.clone();

        tokio::task::spawn_blocking(move || {
            let pdf = paint_surface(&surface, "preview", options.cross_origin_safe)?;
            rasterize_blocking(lib_path.as_deref(), &pdf, target_width)
        })
        .await
        .map_err(|e| PipelineError::Internal(format!("Raster task panicked: {}", e)))?
    }
}

/// Blocking implementation of the pdfium render.
fn rasterize_blocking(
    lib_path: Option<&Path>,
    pdf: &[u8],
    target_width: i32,
) -> Result<RasterImage, PipelineError> {
    let pdfium = bind_pdfium(lib_path)?;

    let document = pdfium
        .load_pdf_from_byte_slice(pdf, None)
        .map_err(|e| PipelineError::Rasterization(format!("{:?}", e)))?;
    let page = document
        .pages()
        .get(0)
        .map_err(|e| PipelineError::Rasterization(format!("{:?}", e)))?;

    let render_config = PdfRenderConfig::new().set_target_width(target_width);
    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| PipelineError::Rasterization(format!("{:?}", e)))?;

    let image = bitmap.as_image();
    debug!("Rasterised surface → {}x{} px", image.width(), image.height());
    Ok(RasterImage::new(image))
}

fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, PipelineError> {
    let explicit = lib_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match explicit {
        Some(path) => {
            let path = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            info!("Binding pdfium from {}", path.display());
            Pdfium::bind_to_library(&path)
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| PipelineError::DependencyLoad(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}
