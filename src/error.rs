//! Error types for the quote-forge library.
//!
//! Three error types reflect three distinct recovery strategies:
//!
//! * [`ValidationError`] — **Local**: a line item was rejected. Nothing was
//!   mutated; the form prompts the user with the violated constraint.
//!
//! * [`AssetError`] — **Degrading**: the logo could not be inlined. The
//!   asset inliner hides the logo, logs the cause and the export carries on.
//!   Callers never see this error from [`crate::export::ExportPipeline`].
//!
//! * [`PipelineError`] — **Fatal for one export**: rasterisation, encoding or
//!   dependency loading failed. The export aborts, the user receives one
//!   notification and the preview is returned to its responsive layout.

use std::path::PathBuf;
use thiserror::Error;

/// A line item failed validation and was not admitted to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ValidationError {
    /// Description was empty after trimming.
    #[error("Please fill in the description")]
    EmptyDescription,

    /// Unit price is not a finite number ≥ 0.
    #[error("Please enter a valid price")]
    InvalidPrice,

    /// Quantity is not an integer > 0.
    #[error("Please enter a valid quantity")]
    InvalidQuantity,
}

/// Why an image reference could not be turned into an inline `data:` URI.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The source is neither a URL, a local path nor a `data:` URI.
    #[error("Unsupported image source '{src}'")]
    Unsupported { src: String },

    /// The HTTP request could not be completed.
    #[error("Failed to fetch '{src}': {reason}")]
    Fetch { src: String, reason: String },

    /// The request exceeded the configured asset timeout.
    #[error("Fetching '{src}' timed out after {secs}s")]
    Timeout { src: String, secs: u64 },

    /// The server answered with a non-success status.
    #[error("Fetching '{src}' returned HTTP {status}")]
    Status { src: String, status: u16 },

    /// A local image file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes were fetched but are not a decodable image.
    #[error("'{src}' is not a decodable image: {detail}")]
    Decode { src: String, detail: String },
}

/// Fatal errors returned by [`crate::export::ExportPipeline::export`].
#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Rendering ─────────────────────────────────────────────────────────
    /// The rasteriser returned an error for the preview surface.
    #[error("Rasterisation failed: {0}")]
    Rasterization(String),

    /// The raster could not be encoded or written into the output document.
    #[error("Document encoding failed: {0}")]
    Encoding(String),

    /// A rendering engine could not be loaded.
    #[error(
        "Failed to load rendering engine: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    DependencyLoad(String),

    // ── I/O ───────────────────────────────────────────────────────────────
    /// Could not create or write the output PDF.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config ────────────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// The short message shown to the user when an export fails.
    ///
    /// Diagnostic detail goes to the log; the notification stays generic.
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::DependencyLoad(_) => {
                "Could not load the PDF engine. See the log for details."
            }
            _ => "Error generating PDF. See the log for details.",
        }
    }
}
