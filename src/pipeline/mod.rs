//! Export stages.
//!
//! Each submodule implements exactly one transformation step; the
//! orchestration, state machine and cleanup live in [`crate::export`].
//!
//! ## Data Flow
//!
//! ```text
//! asset ──▶ surface ──▶ raster ──▶ paginate ──▶ emit
//! (inline)  (paint)     (pdfium)   (A4 rect)    (printpdf)
//! ```
//!
//! 1. [`asset`]    — turn the logo into a `data:` URI or hide it; the only
//!    stage with network I/O
//! 2. [`surface`]  — paint the frozen preview as a vector page (blocking,
//!    called from the rasteriser's worker thread)
//! 3. [`raster`]   — rasterise the painted page; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 4. [`paginate`] — fit the raster onto the output page, keeping its aspect
//! 5. [`emit`]     — write the single-page PDF, atomically
//!
//! [`encode`] holds the PNG / data-URI helpers shared by these stages.

pub mod asset;
pub mod emit;
pub mod encode;
pub mod paginate;
pub mod raster;
pub mod surface;
