//! Paint a frozen [`PreviewSurface`] as a single vector PDF page.
//!
//! This is the input format of [`crate::pipeline::raster::PdfiumRasterizer`]:
//! pdfium can only rasterise PDF, so the preview is first drawn with printpdf
//! at its native size (1 px = 0.75 pt) and then rendered back to pixels.
//!
//! Text uses the PDF base-14 Helvetica faces. Those cover WinAnsi only, so
//! letters outside ASCII are folded to their unaccented form first.

use crate::error::PipelineError;
use crate::pipeline::encode::{is_data_uri, parse_data_uri};
use crate::preview::{PreviewSurface, SurfaceItem};
use printpdf::*;
use tracing::{debug, warn};

/// CSS pixels (96 dpi) to PDF points (72 dpi).
const PX_TO_PT: f32 = 0.75;
/// Points to millimetres.
const PT_TO_MM: f32 = 0.352778;

const RULE_GREY: f32 = 0.6;

/// Paint the surface and return PDF bytes.
///
/// With `inline_only` set, images whose source is not a `data:` URI are
/// skipped. Otherwise a non-inline source is read as a local file.
pub fn paint_surface(
    surface: &PreviewSurface,
    title: &str,
    inline_only: bool,
) -> Result<Vec<u8>, PipelineError> {
    let page_w = surface.width as f32 * PX_TO_PT;
    let page_h = surface.height as f32 * PX_TO_PT;
    if page_w <= 0.0 || page_h <= 0.0 {
        return Err(PipelineError::Rasterization(format!(
            "surface has no area ({}x{} px)",
            surface.width, surface.height
        )));
    }

    let mut doc = PdfDocument::new(title);
    let mut ops = Vec::new();
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();

    for item in &surface.items {
        match item {
            SurfaceItem::Text {
                x,
                y,
                size,
                bold,
                text,
            } => {
                if text.is_empty() {
                    continue;
                }
                let size_pt = *size as f32 * PX_TO_PT;
                // Baseline ≈ top of line + ascender (approx 0.8 × font size)
                let baseline = page_h - *y as f32 * PX_TO_PT - size_pt * 0.8;
                let font = if *bold {
                    BuiltinFont::HelveticaBold
                } else {
                    BuiltinFont::Helvetica
                };
                ops.push(Op::StartTextSection);
                ops.push(Op::SetTextCursor {
                    pos: Point {
                        x: Pt(*x as f32 * PX_TO_PT),
                        y: Pt(baseline),
                    },
                });
                ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(size_pt),
                    font,
                });
                ops.push(Op::SetFillColor {
                    col: Color::Rgb(Rgb {
                        r: 0.0,
                        g: 0.0,
                        b: 0.0,
                        icc_profile: None,
                    }),
                });
                ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(fold_to_ascii(text))],
                    font,
                });
                ops.push(Op::EndTextSection);
            }
            SurfaceItem::Rule { y } => {
                let line_y = page_h - *y as f32 * PX_TO_PT;
                ops.push(Op::SetOutlineColor {
                    col: Color::Rgb(Rgb {
                        r: RULE_GREY,
                        g: RULE_GREY,
                        b: RULE_GREY,
                        icc_profile: None,
                    }),
                });
                ops.push(Op::SetOutlineThickness { pt: Pt(0.75) });
                ops.push(Op::DrawLine {
                    line: Line {
                        points: vec![
                            LinePoint {
                                p: Point {
                                    x: Pt(36.0),
                                    y: Pt(line_y),
                                },
                                bezier: false,
                            },
                            LinePoint {
                                p: Point {
                                    x: Pt(page_w - 36.0),
                                    y: Pt(line_y),
                                },
                                bezier: false,
                            },
                        ],
                        is_closed: false,
                    },
                });
            }
            SurfaceItem::Image {
                x,
                y,
                width,
                height,
                src,
            } => {
                let Some(bytes) = image_bytes(src, inline_only) else {
                    continue;
                };
                let (px_w, px_h) = match ::image::load_from_memory(&bytes) {
                    Ok(img) => (img.width(), img.height()),
                    Err(e) => {
                        warn!("Skipping image — decode error: {e}");
                        continue;
                    }
                };
                let raw = match RawImage::decode_from_bytes(&bytes, &mut warnings) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!("Skipping image — PDF encode error: {e}");
                        continue;
                    }
                };
                if px_w == 0 || px_h == 0 {
                    continue;
                }
                let xobj_id = doc.add_image(&raw);
                let w_pt = *width as f32 * PX_TO_PT;
                let h_pt = *height as f32 * PX_TO_PT;
                // At dpi=72 printpdf renders 1 px = 1 pt.
                ops.push(Op::UseXobject {
                    id: xobj_id,
                    transform: XObjectTransform {
                        translate_x: Some(Pt(*x as f32 * PX_TO_PT)),
                        translate_y: Some(Pt(page_h - *y as f32 * PX_TO_PT - h_pt)),
                        dpi: Some(72.0),
                        scale_x: Some(w_pt / px_w as f32),
                        scale_y: Some(h_pt / px_h as f32),
                        rotate: None,
                    },
                });
            }
        }
    }

    let page = PdfPage::new(Mm(page_w * PT_TO_MM), Mm(page_h * PT_TO_MM), ops);
    doc.with_pages(vec![page]);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    debug!(
        "Painted surface {}x{} px → {} bytes PDF",
        surface.width,
        surface.height,
        bytes.len()
    );
    Ok(bytes)
}

fn image_bytes(src: &str, inline_only: bool) -> Option<Vec<u8>> {
    if is_data_uri(src) {
        return match parse_data_uri(src) {
            Ok((_, bytes)) => Some(bytes),
            Err(e) => {
                warn!("Skipping image — {e}");
                None
            }
        };
    }
    if inline_only {
        warn!("Skipping non-inline image in cross-origin-safe capture");
        return None;
    }
    match std::fs::read(src) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("Skipping image '{src}' — {e}");
            None
        }
    }
}

/// Fold Latin-1 letters to ASCII; anything else outside ASCII becomes `?`.
fn fold_to_ascii(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            c if c.is_ascii() => c,
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'È' | 'É' | 'Ê' | 'Ë' => 'E',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
            'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            'ñ' => 'n',
            'Ñ' => 'N',
            '\u{00A0}' => ' ',
            _ => '?',
        })
        .collect()
}
