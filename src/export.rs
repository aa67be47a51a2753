//! The export pipeline: preview → rasterised single-page PDF.
//!
//! ## State machine
//!
//! ```text
//! Idle ─▶ Preparing ─▶ Rasterizing ─▶ Paginating ─▶ Emitting ─▶ Idle
//!             │             │              │            │
//!             └─────────────┴──────┬───────┴────────────┘
//!                                  ▼
//!                               Failed ─▶ Idle
//! ```
//!
//! Only one export runs at a time per pipeline. A second call to
//! [`ExportPipeline::export`] while the state is not [`ExportState::Idle`]
//! returns [`ExportOutcome::AlreadyRunning`] without touching the session.
//!
//! Whatever happens, the preview is back in its responsive layout when
//! `export` returns. If the export future is dropped mid-flight, a guard
//! resets the state and restores the layout as soon as the session is free.

use crate::config::ExportConfig;
use crate::error::PipelineError;
use crate::pipeline::asset::{inline_or_hide, InlineOutcome};
use crate::pipeline::emit::{DocumentEncoder, OutputDocument, PrintPdfEncoder};
use crate::pipeline::paginate::{place_on_page, Placement};
use crate::pipeline::raster::{PdfiumRasterizer, RenderOptions, Rasterizer};
use crate::session::SharedSession;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info};

/// Where an export currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportState {
    #[default]
    Idle,
    Preparing,
    Rasterizing,
    Paginating,
    Emitting,
    Failed,
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportState::Idle => "idle",
            ExportState::Preparing => "preparing",
            ExportState::Rasterizing => "rasterizing",
            ExportState::Paginating => "paginating",
            ExportState::Emitting => "emitting",
            ExportState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Summary of a finished export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub path: PathBuf,
    pub logo: InlineOutcome,
    pub raster_width: u32,
    pub raster_height: u32,
    pub placement: Placement,
    pub duration_ms: u64,
}

/// Result of an export request that did not fail.
#[derive(Debug, Clone)]
pub enum ExportOutcome {
    Written(ExportReport),
    /// Another export was in flight; this request was ignored.
    AlreadyRunning,
}

/// Runs exports of a [`SharedSession`].
pub struct ExportPipeline {
    config: ExportConfig,
    rasterizer: Arc<dyn Rasterizer>,
    encoder: Arc<dyn DocumentEncoder>,
    state: Mutex<ExportState>,
}

impl fmt::Debug for ExportPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportPipeline")
            .field("config", &self.config)
            .field("rasterizer", &"<dyn Rasterizer>")
            .field("encoder", &"<dyn DocumentEncoder>")
            .field("state", &self.state())
            .finish()
    }
}

impl ExportPipeline {
    /// Pipeline with the default pdfium rasteriser and printpdf encoder.
    pub fn new(config: ExportConfig) -> Self {
        let rasterizer = Arc::new(PdfiumRasterizer::new(config.pdfium_lib_path.clone()));
        Self::with_services(config, rasterizer, Arc::new(PrintPdfEncoder))
    }

    /// Pipeline with caller-provided services.
    pub fn with_services(
        config: ExportConfig,
        rasterizer: Arc<dyn Rasterizer>,
        encoder: Arc<dyn DocumentEncoder>,
    ) -> Self {
        Self {
            config,
            rasterizer,
            encoder,
            state: Mutex::new(ExportState::Idle),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn state(&self) -> ExportState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Export the session's preview to `config.output_path()`.
    ///
    /// # Returns
    /// - `Ok(ExportOutcome::Written)` — the PDF was written
    /// - `Ok(ExportOutcome::AlreadyRunning)` — ignored, another export is active
    ///
    /// # Errors
    /// Any stage failure. The user has already been notified once through
    /// the progress callback when this returns `Err`.
    pub async fn export(&self, session: &SharedSession) -> Result<ExportOutcome, PipelineError> {
        if !self.try_begin() {
            info!("Export already in progress, ignoring request");
            return Ok(ExportOutcome::AlreadyRunning);
        }
        let mut guard = ExportGuard {
            state: &self.state,
            session,
            armed: true,
        };

        let start = Instant::now();
        info!("Starting export → {}", self.config.output_path().display());
        let result = self.run(session, start).await;

        // ── Cleanup: always leave export layout ──────────────────────────
        session.lock().await.preview_mut().exit_export_mode();
        guard.armed = false;

        match result {
            Ok(report) => {
                info!(
                    "Export complete: {} ({}x{} px) in {}ms",
                    report.path.display(),
                    report.raster_width,
                    report.raster_height,
                    report.duration_ms
                );
                self.enter(ExportState::Idle);
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_export_complete(&report.path);
                }
                Ok(ExportOutcome::Written(report))
            }
            Err(e) => {
                error!("Export failed: {}", e);
                self.enter(ExportState::Failed);
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_export_failed(e.user_message());
                }
                self.enter(ExportState::Idle);
                Err(e)
            }
        }
    }

    async fn run(&self, session: &SharedSession, start: Instant) -> Result<ExportReport, PipelineError> {
        let config = &self.config;

        // ── Preparing ────────────────────────────────────────────────────
        // The session is not held across the logo fetch so the form stays
        // responsive; the inlined logo is written back afterwards.
        let mut logo = {
            let mut s = session.lock().await;
            s.recompute();
            s.logo().cloned()
        };
        let logo_outcome = inline_or_hide(logo.as_mut(), config.asset_timeout_secs).await;
        debug!(?logo_outcome, "Logo prepared");

        let surface = {
            let mut s = session.lock().await;
            if let (Some(slot), Some(updated)) = (s.logo_mut(), logo) {
                *slot = updated;
            }
            s.recompute();
            s.preview_mut().enter_export_mode();
            s.preview().surface()
        };

        // ── Rasterizing ──────────────────────────────────────────────────
        self.enter(ExportState::Rasterizing);
        let options = RenderOptions {
            scale: config.raster_scale,
            cross_origin_safe: config.cross_origin_safe,
        };
        let raster = self.rasterizer.render(&surface, options).await?;

        // ── Paginating ───────────────────────────────────────────────────
        self.enter(ExportState::Paginating);
        let (raster_width, raster_height) = (raster.width(), raster.height());
        let placement = place_on_page(
            raster_width,
            raster_height,
            config.page_format,
            config.page_margin_pt,
        )?;

        // ── Emitting ─────────────────────────────────────────────────────
        self.enter(ExportState::Emitting);
        let mut doc = OutputDocument::new(config.page_format, config.title.as_str());
        doc.place(raster, placement);
        let path = self.encoder.save(&doc, &config.output_path()).await?;

        Ok(ExportReport {
            path,
            logo: logo_outcome,
            raster_width,
            raster_height,
            placement,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Idle → Preparing, atomically. `false` if an export is already active.
    fn try_begin(&self) -> bool {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state != ExportState::Idle {
                return false;
            }
            *state = ExportState::Preparing;
        }
        self.notify_stage(ExportState::Preparing);
        true
    }

    fn enter(&self, stage: ExportState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = stage;
        self.notify_stage(stage);
    }

    fn notify_stage(&self, stage: ExportState) {
        debug!(%stage, "Export stage");
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_stage(stage);
        }
    }
}

/// Restores the pipeline if an export future is dropped before cleanup.
struct ExportGuard<'a> {
    state: &'a Mutex<ExportState>,
    session: &'a SharedSession,
    armed: bool,
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut s) = self.session.try_lock() {
            s.preview_mut().exit_export_mode();
        } else {
            let session = Arc::clone(self.session);
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    session.lock().await.preview_mut().exit_export_mode();
                });
            }
        }
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = ExportState::Idle;
    }
}
