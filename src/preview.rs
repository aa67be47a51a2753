//! Live preview: a pure projection of the header and ledger into a
//! printable document model.
//!
//! ## Idempotence
//!
//! [`PreviewRenderer::recompute`] rebuilds the whole [`PreviewDocument`] from
//! its inputs and replaces the previous one. Nothing is patched incrementally,
//! so calling it eagerly and then again once a container size is known yields
//! the same document both times.
//!
//! ## Fit-to-container
//!
//! The document has a fixed width (A4 at 96 dpi, 794 px). On screen it is
//! scaled down uniformly to fit its container and never scaled up. During
//! export the scale is disabled so the rasteriser sees native dimensions.

use crate::header::QuoteHeader;
use crate::ledger::{LedgerStore, Totals};
use crate::session::LogoAsset;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A4 width in CSS pixels (210 mm at 96 dpi).
pub const DOCUMENT_WIDTH_PX: f64 = 794.0;
/// A4 height in CSS pixels; the preview never lays out shorter than a page.
pub const DOCUMENT_MIN_HEIGHT_PX: f64 = 1123.0;

const PAD: f64 = 48.0;
const COL_PRICE: f64 = 430.0;
const COL_QTY: f64 = 560.0;
const COL_SUBTOTAL: f64 = 640.0;
const LOGO_W: f64 = 160.0;
const LOGO_H: f64 = 80.0;

/// One projected table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRow {
    pub description: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub subtotal: f64,
    pub unit_price_text: String,
    pub subtotal_text: String,
}

/// Logo as the preview shows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoView {
    pub src: String,
    pub hidden: bool,
}

/// The derived view model. Has no identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewDocument {
    pub client_name: String,
    pub device: String,
    pub date: String,
    pub labor_cost_text: String,
    pub notes: String,
    pub payment_method: String,
    pub rows: Vec<PreviewRow>,
    pub totals: Totals,
    pub subtotal_text: String,
    pub grand_total_text: String,
    pub logo: Option<LogoView>,
    pub width: f64,
    pub height: f64,
}

impl PreviewDocument {
    /// Project the inputs. Pure.
    pub fn project(header: &QuoteHeader, ledger: &LedgerStore, logo: Option<&LogoAsset>) -> Self {
        let rows = ledger
            .items()
            .iter()
            .map(|item| {
                let subtotal = item.subtotal();
                PreviewRow {
                    description: item.description.clone(),
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    subtotal,
                    unit_price_text: money(item.unit_price),
                    subtotal_text: money(subtotal),
                }
            })
            .collect();
        let totals = ledger.compute_totals(header.labor_cost);

        let mut doc = Self {
            client_name: header.client_name.clone(),
            device: header.device.clone(),
            date: header.date.clone(),
            labor_cost_text: money(header.labor_cost),
            notes: header.notes.clone(),
            payment_method: header.payment_method.clone(),
            rows,
            totals,
            subtotal_text: money(totals.subtotal),
            grand_total_text: money(totals.grand_total),
            logo: logo.map(|l| LogoView {
                src: l.src.clone(),
                hidden: l.hidden,
            }),
            width: DOCUMENT_WIDTH_PX,
            height: 0.0,
        };
        let (_, content_bottom) = doc.layout_with_bottom();
        doc.height = (content_bottom + PAD).max(DOCUMENT_MIN_HEIGHT_PX);
        doc
    }

    /// Deterministic serialisation, used to compare renders byte for byte.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Positioned content of the document in native pixels, top-left origin.
    pub fn layout(&self) -> Vec<SurfaceItem> {
        self.layout_with_bottom().0
    }

    fn layout_with_bottom(&self) -> (Vec<SurfaceItem>, f64) {
        let mut out = Vec::new();
        let mut y = PAD;

        if let Some(logo) = self.logo.as_ref().filter(|l| !l.hidden && !l.src.is_empty()) {
            out.push(SurfaceItem::Image {
                x: PAD,
                y,
                width: LOGO_W,
                height: LOGO_H,
                src: logo.src.clone(),
            });
            y += LOGO_H + 16.0;
        }

        out.push(text(PAD, y, 24.0, true, "Quote"));
        y += 40.0;
        for (label, value) in [
            ("Client", &self.client_name),
            ("Device", &self.device),
            ("Date", &self.date),
        ] {
            out.push(text(PAD, y, 12.0, false, format!("{label}: {value}")));
            y += 22.0;
        }

        y += 12.0;
        out.push(SurfaceItem::Rule { y });
        y += 12.0;

        for (x, label) in [
            (PAD, "Description"),
            (COL_PRICE, "Unit price"),
            (COL_QTY, "Qty"),
            (COL_SUBTOTAL, "Subtotal"),
        ] {
            out.push(text(x, y, 12.0, true, label));
        }
        y += 24.0;
        out.push(SurfaceItem::Rule { y });
        y += 8.0;

        for row in &self.rows {
            out.push(text(PAD, y, 12.0, false, row.description.as_str()));
            out.push(text(COL_PRICE, y, 12.0, false, row.unit_price_text.as_str()));
            out.push(text(COL_QTY, y, 12.0, false, row.quantity.to_string()));
            out.push(text(COL_SUBTOTAL, y, 12.0, false, row.subtotal_text.as_str()));
            y += 22.0;
        }

        out.push(SurfaceItem::Rule { y });
        y += 12.0;
        out.push(text(PAD, y, 12.0, false, format!("Items: {}", self.subtotal_text)));
        y += 22.0;
        out.push(text(PAD, y, 12.0, false, format!("Labor: {}", self.labor_cost_text)));
        y += 22.0;
        out.push(text(PAD, y, 14.0, true, format!("Total: {}", self.grand_total_text)));
        y += 28.0;
        out.push(text(PAD, y, 12.0, false, format!("Payment: {}", self.payment_method)));
        y += 22.0;

        if !self.notes.is_empty() {
            out.push(text(PAD, y, 12.0, true, "Notes:"));
            y += 20.0;
            for line in self.notes.lines() {
                out.push(text(PAD, y, 11.0, false, line));
                y += 18.0;
            }
        }

        (out, y)
    }
}

/// A positioned primitive of the preview surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceItem {
    /// Text run; `y` is the top of the line box.
    Text {
        x: f64,
        y: f64,
        size: f64,
        bold: bool,
        text: String,
    },
    /// Full-width horizontal rule.
    Rule { y: f64 },
    /// Image box.
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        src: String,
    },
}

fn text(x: f64, y: f64, size: f64, bold: bool, s: impl Into<String>) -> SurfaceItem {
    SurfaceItem::Text {
        x,
        y,
        size,
        bold,
        text: s.into(),
    }
}

/// Two-decimal money text.
pub fn money(v: f64) -> String {
    format!("{v:.2}")
}

/// Frozen, export-layout snapshot of the preview handed to a rasteriser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewSurface {
    /// Native width in pixels.
    pub width: f64,
    /// Native height in pixels.
    pub height: f64,
    pub items: Vec<SurfaceItem>,
}

/// Whether the responsive scale transform is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Screen-fitted scale applied (default).
    #[default]
    Responsive,
    /// Native fixed dimensions for rasterisation.
    Export,
}

/// Applied scale and the container height reserved for the scaled document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scale: f64,
    pub reserved_height: f64,
}

/// `min(1, container_width / document_width)`.
pub fn fit_scale(container_width: f64, document_width: f64) -> f64 {
    (container_width / document_width).min(1.0)
}

/// Holds the current preview and keeps it in sync with its inputs.
#[derive(Debug, Clone)]
pub struct PreviewRenderer {
    document: PreviewDocument,
    mode: LayoutMode,
    container_width: Option<f64>,
    viewport: Viewport,
    recomputes: u64,
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewRenderer {
    pub fn new() -> Self {
        let document = PreviewDocument::project(&QuoteHeader::default(), &LedgerStore::new(), None);
        let viewport = Viewport {
            scale: 1.0,
            reserved_height: document.height,
        };
        Self {
            document,
            mode: LayoutMode::Responsive,
            container_width: None,
            viewport,
            recomputes: 0,
        }
    }

    /// Rebuild the preview from the current inputs.
    pub fn recompute(&mut self, header: &QuoteHeader, ledger: &LedgerStore, logo: Option<&LogoAsset>) {
        self.document = PreviewDocument::project(header, ledger, logo);
        self.recomputes += 1;
        self.refresh_viewport();
        debug!(
            rows = self.document.rows.len(),
            total = %self.document.grand_total_text,
            "Preview recomputed"
        );
    }

    /// Fit the document into a container of the given width.
    ///
    /// Widths that are not finite and positive are ignored; the previous
    /// viewport stays in effect.
    pub fn fit_to_container(&mut self, container_width: f64) -> Viewport {
        if !container_width.is_finite() || container_width <= 0.0 {
            debug!(container_width, "Ignoring unusable container width");
            return self.viewport;
        }
        self.container_width = Some(container_width);
        self.refresh_viewport();
        self.viewport
    }

    /// Disable the responsive scale so the document renders at native size.
    pub fn enter_export_mode(&mut self) {
        self.mode = LayoutMode::Export;
        self.refresh_viewport();
    }

    /// Restore the responsive scale using the last known container width.
    pub fn exit_export_mode(&mut self) {
        self.mode = LayoutMode::Responsive;
        self.refresh_viewport();
    }

    pub fn is_export_mode(&self) -> bool {
        self.mode == LayoutMode::Export
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn document(&self) -> &PreviewDocument {
        &self.document
    }

    /// Number of recomputes performed so far.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    /// Snapshot the document at native dimensions.
    pub fn surface(&self) -> PreviewSurface {
        PreviewSurface {
            width: self.document.width,
            height: self.document.height,
            items: self.document.layout(),
        }
    }

    fn refresh_viewport(&mut self) {
        let height = self.document.height;
        let scale = match (self.mode, self.container_width) {
            (LayoutMode::Export, _) | (LayoutMode::Responsive, None) => 1.0,
            (LayoutMode::Responsive, Some(w)) => fit_scale(w, self.document.width),
        };
        self.viewport = Viewport {
            scale,
            reserved_height: height * scale,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (QuoteHeader, LedgerStore) {
        let mut header = QuoteHeader {
            client_name: "Ana".into(),
            device: "Phone X".into(),
            date: "01/02/2026".into(),
            notes: "Ready Friday\nBring charger".into(),
            payment_method: "Cash".into(),
            ..QuoteHeader::default()
        };
        header.set_labor_cost("50");
        let mut ledger = LedgerStore::new();
        ledger.add_item("Screen replacement", "150.00", "1").unwrap();
        ledger.add_item("Battery", "80.50", "2").unwrap();
        (header, ledger)
    }

    #[test]
    fn projection_formats_rows_and_totals() {
        let (header, ledger) = sample();
        let doc = PreviewDocument::project(&header, &ledger, None);
        assert_eq!(doc.rows.len(), 2);
        assert_eq!(doc.rows[1].unit_price_text, "80.50");
        assert_eq!(doc.rows[1].subtotal_text, "161.00");
        assert_eq!(doc.subtotal_text, "311.00");
        assert_eq!(doc.labor_cost_text, "50.00");
        assert_eq!(doc.grand_total_text, "361.00");
    }

    #[test]
    fn recompute_is_idempotent() {
        let (header, ledger) = sample();
        let mut renderer = PreviewRenderer::new();
        renderer.recompute(&header, &ledger, None);
        let first = renderer.document().to_json().unwrap();
        renderer.recompute(&header, &ledger, None);
        let second = renderer.document().to_json().unwrap();
        assert_eq!(first, second);
        assert_eq!(renderer.recompute_count(), 2);
    }

    #[test]
    fn scale_shrinks_for_narrow_container() {
        let mut renderer = PreviewRenderer::new();
        let vp = renderer.fit_to_container(400.0);
        assert_eq!(vp.scale, 400.0 / 794.0);
        assert!((vp.scale - 0.5038).abs() < 1e-4);
        assert_ne!(vp.scale, 1.0);
        assert_eq!(vp.reserved_height, renderer.document().height * vp.scale);
    }

    #[test]
    fn scale_never_exceeds_one() {
        let mut renderer = PreviewRenderer::new();
        let vp = renderer.fit_to_container(1000.0);
        assert_eq!(vp.scale, 1.0);
    }

    #[test]
    fn unusable_widths_keep_previous_viewport() {
        let mut renderer = PreviewRenderer::new();
        let before = renderer.fit_to_container(500.0);
        for w in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert_eq!(renderer.fit_to_container(w), before);
        }
    }

    #[test]
    fn export_mode_disables_scale_and_restores_it() {
        let mut renderer = PreviewRenderer::new();
        renderer.fit_to_container(400.0);
        renderer.enter_export_mode();
        assert!(renderer.is_export_mode());
        assert_eq!(renderer.viewport().scale, 1.0);

        renderer.exit_export_mode();
        assert!(!renderer.is_export_mode());
        assert_eq!(renderer.viewport().scale, 400.0 / 794.0);
    }

    #[test]
    fn reserved_height_tracks_document_growth() {
        let (header, mut ledger) = sample();
        let mut renderer = PreviewRenderer::new();
        renderer.fit_to_container(397.0);
        for i in 0..60 {
            ledger.add_item(&format!("part {i}"), "1", "1").unwrap();
        }
        renderer.recompute(&header, &ledger, None);
        let doc_h = renderer.document().height;
        assert!(doc_h > DOCUMENT_MIN_HEIGHT_PX);
        assert_eq!(renderer.viewport().reserved_height, doc_h * 0.5);
    }

    #[test]
    fn hidden_logo_is_not_laid_out() {
        let (header, ledger) = sample();
        let logo = LogoAsset {
            src: "data:image/png;base64,AAAA".into(),
            hidden: true,
        };
        let doc = PreviewDocument::project(&header, &ledger, Some(&logo));
        assert!(!doc
            .layout()
            .iter()
            .any(|item| matches!(item, SurfaceItem::Image { .. })));

        let shown = LogoAsset { hidden: false, ..logo };
        let doc = PreviewDocument::project(&header, &ledger, Some(&shown));
        assert!(doc
            .layout()
            .iter()
            .any(|item| matches!(item, SurfaceItem::Image { .. })));
    }
}
