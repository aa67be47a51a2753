//! Output document: place rasters on pages and persist the PDF.
//!
//! [`OutputDocument`] is the document handle (create, then place);
//! [`DocumentEncoder::save`] persists it. [`PrintPdfEncoder`] is the default
//! encoder and writes through a temp file + rename so a failed export never
//! leaves a truncated PDF behind.

use crate::config::PageFormat;
use crate::error::PipelineError;
use crate::pipeline::encode::encode_png;
use crate::pipeline::paginate::Placement;
use crate::pipeline::raster::RasterImage;
use async_trait::async_trait;
use printpdf::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Points to millimetres.
const PT_TO_MM: f32 = 0.352778;

/// An image with its target rectangle.
#[derive(Debug, Clone)]
pub struct PlacedImage {
    pub image: RasterImage,
    pub rect: Placement,
}

/// A single-page output document under construction.
#[derive(Debug, Clone)]
pub struct OutputDocument {
    format: PageFormat,
    title: String,
    placed: Vec<PlacedImage>,
}

impl OutputDocument {
    pub fn new(format: PageFormat, title: impl Into<String>) -> Self {
        Self {
            format,
            title: title.into(),
            placed: Vec::new(),
        }
    }

    /// Put `image` at `rect` (points, top-left origin).
    pub fn place(&mut self, image: RasterImage, rect: Placement) {
        self.placed.push(PlacedImage { image, rect });
    }

    pub fn format(&self) -> PageFormat {
        self.format
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn placed(&self) -> &[PlacedImage] {
        &self.placed
    }
}

/// Persists an [`OutputDocument`].
#[async_trait]
pub trait DocumentEncoder: Send + Sync {
    /// Write `doc` to `path` and return the path written.
    async fn save(&self, doc: &OutputDocument, path: &Path) -> Result<PathBuf, PipelineError>;
}

/// Default encoder backed by printpdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintPdfEncoder;

#[async_trait]
impl DocumentEncoder for PrintPdfEncoder {
    async fn save(&self, doc: &OutputDocument, path: &Path) -> Result<PathBuf, PipelineError> {
        let owned = doc.clone();
        let bytes = tokio::task::spawn_blocking(move || encode_pdf(&owned))
            .await
            .map_err(|e| PipelineError::Internal(format!("Encode task panicked: {}", e)))??;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    PipelineError::OutputWriteFailed {
                        path: path.to_path_buf(),
                        source: e,
                    }
                })?;
            }
        }

        // Atomic write: write to temp, then rename
        let tmp_path = path.with_extension("pdf.tmp");
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| PipelineError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| PipelineError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        info!("Wrote '{}' ({} bytes)", path.display(), bytes.len());
        Ok(path.to_path_buf())
    }
}

/// Render the document to PDF bytes.
pub fn encode_pdf(doc: &OutputDocument) -> Result<Vec<u8>, PipelineError> {
    let page_w = doc.format.width_pt;
    let page_h = doc.format.height_pt;
    let mut pdf = PdfDocument::new(&doc.title);
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let mut ops = Vec::new();

    for placed in &doc.placed {
        let png = encode_png(placed.image.as_image())
            .map_err(|e| PipelineError::Encoding(format!("PNG encoding failed: {e}")))?;
        let raw = RawImage::decode_from_bytes(&png, &mut warnings)
            .map_err(|e| PipelineError::Encoding(format!("PDF image embedding failed: {e}")))?;
        let xobj_id = pdf.add_image(&raw);

        let rect = placed.rect;
        // PDF origin is bottom-left; placement origin is top-left.
        // At dpi=72 printpdf renders 1 px = 1 pt, so scale = pt / px.
        ops.push(Op::UseXobject {
            id: xobj_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(rect.x)),
                translate_y: Some(Pt(page_h - rect.y - rect.height)),
                dpi: Some(72.0),
                scale_x: Some(rect.width / placed.image.width() as f32),
                scale_y: Some(rect.height / placed.image.height() as f32),
                rotate: None,
            },
        });
    }

    let page = PdfPage::new(Mm(page_w * PT_TO_MM), Mm(page_h * PT_TO_MM), ops);
    pdf.with_pages(vec![page]);
    let bytes = pdf.save(&PdfSaveOptions::default(), &mut warnings);
    debug!("Encoded PDF: {} image(s), {} bytes", doc.placed.len(), bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::paginate::place_on_page;
    use ::image::{DynamicImage, Rgba, RgbaImage};

    fn raster(w: u32, h: u32) -> RasterImage {
        RasterImage::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            w,
            h,
            Rgba([200, 200, 200, 255]),
        )))
    }

    #[test]
    fn encodes_single_page_pdf() {
        let img = raster(40, 60);
        let rect = place_on_page(img.width(), img.height(), PageFormat::A4, 20.0).unwrap();
        let mut doc = OutputDocument::new(PageFormat::A4, "Quote");
        doc.place(img, rect);

        let bytes = encode_pdf(&doc).unwrap();
        assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[tokio::test]
    async fn save_writes_file_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quote_output.pdf");
        let mut doc = OutputDocument::new(PageFormat::A4, "Quote");
        doc.place(raster(10, 10), place_on_page(10, 10, PageFormat::A4, 20.0).unwrap());

        let written = PrintPdfEncoder.save(&doc, &path).await.unwrap();
        assert_eq!(written, path);
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
        assert!(!path.with_extension("pdf.tmp").exists());
    }
}
