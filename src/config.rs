//! Configuration for the export pipeline.
//!
//! All export behaviour is controlled through [`ExportConfig`], built via its
//! [`ExportConfigBuilder`]. The defaults reproduce the fixed contract: A4
//! page, 20 pt margin, 2× raster scale, cross-origin-safe capture and the
//! file name `quote_output.pdf`.

use crate::error::PipelineError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default output file name.
pub const DEFAULT_OUTPUT_FILENAME: &str = "quote_output.pdf";

/// Page size of the emitted document, in PDF points (1 pt = 1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageFormat {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageFormat {
    /// A4: 210 mm × 297 mm.
    pub const A4: PageFormat = PageFormat {
        width_pt: 595.28,
        height_pt: 841.89,
    };
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::A4
    }
}

/// Configuration for [`crate::export::ExportPipeline`].
///
/// # Example
/// ```rust
/// use quote_forge::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .output_dir("/tmp/quotes")
///     .asset_timeout_secs(5)
///     .build()
///     .unwrap();
/// assert!(config.output_path().ends_with("quote_output.pdf"));
/// ```
#[derive(Clone)]
pub struct ExportConfig {
    /// Raster upscaling factor for print quality. Range: 1–4. Default: 2.
    pub raster_scale: f32,

    /// Output page size. Default: A4.
    pub page_format: PageFormat,

    /// Margin around the placed image, in points. Default: 20.
    pub page_margin_pt: f32,

    /// Directory the PDF is written to. Default: current directory.
    pub output_dir: PathBuf,

    /// Output file name. Default: `quote_output.pdf`.
    pub output_filename: String,

    /// Timeout for fetching the logo, in seconds. Default: 10.
    pub asset_timeout_secs: u64,

    /// Only paint inline (`data:`) images when rasterising. Default: true.
    pub cross_origin_safe: bool,

    /// Explicit path to the pdfium shared library.
    /// Falls back to `PDFIUM_LIB_PATH`, then the system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Title embedded in the PDF metadata. Default: "Quote".
    pub title: String,

    /// Stage and outcome notifications.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            raster_scale: 2.0,
            page_format: PageFormat::A4,
            page_margin_pt: 20.0,
            output_dir: PathBuf::from("."),
            output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
            asset_timeout_secs: 10,
            cross_origin_safe: true,
            pdfium_lib_path: None,
            title: "Quote".to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("raster_scale", &self.raster_scale)
            .field("page_format", &self.page_format)
            .field("page_margin_pt", &self.page_margin_pt)
            .field("output_dir", &self.output_dir)
            .field("output_filename", &self.output_filename)
            .field("asset_timeout_secs", &self.asset_timeout_secs)
            .field("cross_origin_safe", &self.cross_origin_safe)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("title", &self.title)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExportProgressCallback>"),
            )
            .finish()
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full path of the emitted PDF.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_filename)
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn raster_scale(mut self, scale: f32) -> Self {
        self.config.raster_scale = scale.clamp(1.0, 4.0);
        self
    }

    pub fn page_format(mut self, format: PageFormat) -> Self {
        self.config.page_format = format;
        self
    }

    pub fn page_margin_pt(mut self, margin: f32) -> Self {
        self.config.page_margin_pt = margin.max(0.0);
        self
    }

    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn output_filename(mut self, name: impl Into<String>) -> Self {
        self.config.output_filename = name.into();
        self
    }

    pub fn asset_timeout_secs(mut self, secs: u64) -> Self {
        self.config.asset_timeout_secs = secs.max(1);
        self
    }

    pub fn cross_origin_safe(mut self, v: bool) -> Self {
        self.config.cross_origin_safe = v;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.pdfium_lib_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, PipelineError> {
        let c = &self.config;
        if c.output_filename.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "Output file name must not be empty".into(),
            ));
        }
        let usable_width = c.page_format.width_pt - 2.0 * c.page_margin_pt;
        let usable_height = c.page_format.height_pt - 2.0 * c.page_margin_pt;
        if usable_width <= 0.0 || usable_height <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "Margin {}pt leaves no room on a {}×{}pt page",
                c.page_margin_pt, c.page_format.width_pt, c.page_format.height_pt
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_export_contract() {
        let c = ExportConfig::default();
        assert_eq!(c.raster_scale, 2.0);
        assert_eq!(c.page_margin_pt, 20.0);
        assert_eq!(c.page_format, PageFormat::A4);
        assert!(c.cross_origin_safe);
        assert_eq!(c.output_path(), PathBuf::from("./quote_output.pdf"));
    }

    #[test]
    fn builder_clamps_scale() {
        let c = ExportConfig::builder().raster_scale(10.0).build().unwrap();
        assert_eq!(c.raster_scale, 4.0);
        let c = ExportConfig::builder().raster_scale(0.1).build().unwrap();
        assert_eq!(c.raster_scale, 1.0);
    }

    #[test]
    fn builder_rejects_oversized_margin() {
        let err = ExportConfig::builder().page_margin_pt(400.0).build().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_empty_filename() {
        assert!(ExportConfig::builder().output_filename("  ").build().is_err());
    }
}
