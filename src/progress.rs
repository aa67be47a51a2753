//! Progress-callback trait for export events.
//!
//! Inject an [`Arc<dyn ExportProgressCallback>`] via
//! [`crate::config::ExportConfigBuilder::progress_callback`] to follow the
//! export state machine and to surface the outcome to the user.
//!
//! # Example
//!
//! ```rust
//! use quote_forge::{ExportConfig, ExportProgressCallback, ExportState};
//! use std::sync::Arc;
//!
//! struct StatusLine;
//!
//! impl ExportProgressCallback for StatusLine {
//!     fn on_stage(&self, stage: ExportState) {
//!         eprintln!("export: {stage}");
//!     }
//!
//!     fn on_export_failed(&self, message: &str) {
//!         eprintln!("{message}");
//!     }
//! }
//!
//! let config = ExportConfig::builder()
//!     .progress_callback(Arc::new(StatusLine) as Arc<dyn ExportProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::export::ExportState;
use std::path::Path;
use std::sync::Arc;

/// Called by [`crate::export::ExportPipeline`] as an export advances.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ExportProgressCallback: Send + Sync {
    /// Called on every state transition, including the final return to
    /// [`ExportState::Idle`].
    fn on_stage(&self, stage: ExportState) {
        let _ = stage;
    }

    /// Called once when the output file has been written.
    fn on_export_complete(&self, path: &Path) {
        let _ = path;
    }

    /// The single user-visible failure notification of an export.
    ///
    /// `message` is short and user-facing; the diagnostic detail is logged.
    fn on_export_failed(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op implementation for callers that don't need export events.
pub struct NoopProgressCallback;

impl ExportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExportConfig`].
pub type ProgressCallback = Arc<dyn ExportProgressCallback>;
