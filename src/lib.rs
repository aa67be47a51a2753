//! # quote-forge
//!
//! Build a service quote from form input, keep a live preview of it, and
//! export that preview as a single-page A4 PDF.
//!
//! ## Why a raster export?
//!
//! The preview is the document. Re-typesetting the quote for print would
//! give two layouts that drift apart. Instead the export freezes the preview
//! at its native 794 px width, rasterises it at 2× and places the image on
//! an A4 page, so the PDF looks exactly like what the user saw.
//!
//! ## Pipeline Overview
//!
//! ```text
//! form input
//!  │
//!  ├─ FormBinding      coerce header fields, validate line items
//!  ├─ LedgerStore      ordered line items + totals
//!  ├─ PreviewRenderer  pure projection, fit-to-container scale
//!  │
//!  └─ ExportPipeline
//!      ├─ 1. Preparing    recompute, inline the logo (or hide it), freeze
//!      ├─ 2. Rasterizing  paint + rasterise via pdfium (spawn_blocking)
//!      ├─ 3. Paginating   A4, 20 pt margin, keep aspect ratio
//!      └─ 4. Emitting     printpdf → quote_output.pdf (atomic write)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quote_forge::{
//!     ExportConfig, ExportOutcome, ExportPipeline, FormBinding, FormField, Prompter,
//!     QuoteSession,
//! };
//! use std::sync::Arc;
//!
//! struct Console;
//!
//! impl Prompter for Console {
//!     fn alert(&self, message: &str) {
//!         eprintln!("{message}");
//!     }
//!     fn confirm(&self, _message: &str) -> bool {
//!         true
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = QuoteSession::new();
//!     let mut form = FormBinding::new(Arc::new(Console));
//!
//!     form.on_input(&mut session, FormField::ClientName, "Ana");
//!     form.on_input(&mut session, FormField::LaborCost, "50");
//!     form.entry_mut().description = "Screen".into();
//!     form.entry_mut().unit_price = "120.50".into();
//!     form.entry_mut().quantity = "2".into();
//!     form.add_item(&mut session)?;
//!
//!     let pipeline = ExportPipeline::new(ExportConfig::default());
//!     if let ExportOutcome::Written(report) = pipeline.export(&session.into_shared()).await? {
//!         eprintln!("wrote {}", report.path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## PDF engine
//!
//! [`PdfiumRasterizer`] binds the pdfium shared library when an export runs.
//! Point `PDFIUM_LIB_PATH` (or [`ExportConfigBuilder::pdfium_lib_path`]) at
//! the library or its directory; otherwise the system library is used. The
//! rest of the crate works without pdfium.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod form;
pub mod header;
pub mod ledger;
pub mod pipeline;
pub mod preview;
pub mod progress;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExportConfig, ExportConfigBuilder, PageFormat, DEFAULT_OUTPUT_FILENAME};
pub use error::{AssetError, PipelineError, ValidationError};
pub use export::{ExportOutcome, ExportPipeline, ExportReport, ExportState};
pub use form::{EntryForm, FormBinding, FormField, Prompter, RemovalOutcome};
pub use header::QuoteHeader;
pub use ledger::{ItemId, LedgerStore, LineItem, Totals};
pub use pipeline::asset::InlineOutcome;
pub use pipeline::emit::{DocumentEncoder, OutputDocument, PrintPdfEncoder};
pub use pipeline::paginate::Placement;
pub use pipeline::raster::{PdfiumRasterizer, RasterImage, Rasterizer, RenderOptions};
pub use preview::{LayoutMode, PreviewDocument, PreviewRenderer, PreviewSurface, Viewport};
pub use progress::{ExportProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::{LogoAsset, QuoteSession, SharedSession};
