//! Asset inlining: make the logo safe to rasterise, or hide it.
//!
//! ## Why inline?
//!
//! The rasteriser only paints images it holds the bytes of (see
//! [`crate::pipeline::raster::RenderOptions::cross_origin_safe`]). Fetching
//! the logo ahead of time and re-encoding it as a `data:` URI makes the
//! surface self-contained.
//!
//! ## Why hide on failure?
//!
//! A half-loaded logo would give a broken raster. A quote without its logo is
//! still a valid quote, so every failure here degrades to a hidden logo and a
//! `warn!` line, and the export carries on.

use crate::error::AssetError;
use crate::pipeline::encode::{is_data_uri, mime_for, parse_data_uri, to_data_uri};
use crate::session::LogoAsset;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What [`inline_or_hide`] did with the logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InlineOutcome {
    /// There is no logo, or its source is empty.
    Absent,
    /// The source already was a valid `data:` URI.
    AlreadyInline,
    /// The logo was fetched and replaced by a `data:` URI.
    Inlined,
    /// Inlining failed; the logo is now hidden.
    Hidden,
}

/// Check if the source looks like a URL.
pub fn is_url(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

/// Inline the logo, or hide it if that fails. Never returns an error.
pub async fn inline_or_hide(logo: Option<&mut LogoAsset>, timeout_secs: u64) -> InlineOutcome {
    let Some(logo) = logo else {
        return InlineOutcome::Absent;
    };
    if logo.src.is_empty() {
        return InlineOutcome::Absent;
    }

    let already_inline = is_data_uri(&logo.src);
    match fetch_inline(&logo.src, timeout_secs).await {
        Ok(data_uri) => {
            logo.src = data_uri;
            logo.hidden = false;
            if already_inline {
                InlineOutcome::AlreadyInline
            } else {
                InlineOutcome::Inlined
            }
        }
        Err(e) => {
            warn!("Could not inline the logo, hiding it for export: {}", e);
            logo.hidden = true;
            InlineOutcome::Hidden
        }
    }
}

/// Load the image behind `src` and return it as a `data:` URI.
///
/// Accepts http(s) URLs, `file://` URLs, plain local paths and existing
/// `data:` URIs. The bytes must decode as an image.
pub async fn fetch_inline(src: &str, timeout_secs: u64) -> Result<String, AssetError> {
    let bytes = if is_data_uri(src) {
        let (_, bytes) = parse_data_uri(src).map_err(|detail| AssetError::Decode {
            src: abbreviate(src),
            detail,
        })?;
        bytes
    } else if is_url(src) {
        download(src, timeout_secs).await?
    } else if let Some(path) = local_path(src) {
        tokio::fs::read(&path)
            .await
            .map_err(|source| AssetError::Read { path, source })?
    } else {
        return Err(AssetError::Unsupported {
            src: abbreviate(src),
        });
    };

    let format = image::guess_format(&bytes).map_err(|e| AssetError::Decode {
        src: abbreviate(src),
        detail: e.to_string(),
    })?;
    image::load_from_memory_with_format(&bytes, format).map_err(|e| AssetError::Decode {
        src: abbreviate(src),
        detail: e.to_string(),
    })?;

    debug!("Inlined {} ({} bytes)", abbreviate(src), bytes.len());
    Ok(to_data_uri(&bytes, mime_for(format)))
}

/// Fetch a URL with a bounded timeout.
async fn download(url: &str, timeout_secs: u64) -> Result<Vec<u8>, AssetError> {
    info!("Fetching logo from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AssetError::Fetch {
            src: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| classify(url, timeout_secs, e))?;

    if !response.status().is_success() {
        return Err(AssetError::Status {
            src: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| classify(url, timeout_secs, e))?;
    Ok(bytes.to_vec())
}

fn classify(url: &str, timeout_secs: u64, e: reqwest::Error) -> AssetError {
    if e.is_timeout() {
        AssetError::Timeout {
            src: url.to_string(),
            secs: timeout_secs,
        }
    } else {
        AssetError::Fetch {
            src: url.to_string(),
            reason: e.to_string(),
        }
    }
}

fn local_path(src: &str) -> Option<PathBuf> {
    let path = src.strip_prefix("file://").unwrap_or(src);
    if path.contains("://") {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Keep log lines readable when the source is a long data URI.
fn abbreviate(src: &str) -> String {
    match src.char_indices().nth(64) {
        Some((idx, _)) => format!("{}…", &src[..idx]),
        None => src.to_string(),
    }
}
