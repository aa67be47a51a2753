//! Page placement: fit a raster onto the output page.
//!
//! The raster spans the page width minus the margins and keeps its aspect
//! ratio: `height = width × (raster_height / raster_width)`.

use crate::config::PageFormat;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Target rectangle on the page, in points, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Compute where a `raster_width × raster_height` image goes on `page`.
pub fn place_on_page(
    raster_width: u32,
    raster_height: u32,
    page: PageFormat,
    margin_pt: f32,
) -> Result<Placement, PipelineError> {
    if raster_width == 0 || raster_height == 0 {
        return Err(PipelineError::Rasterization(format!(
            "raster is empty ({raster_width}x{raster_height} px)"
        )));
    }

    let width = page.width_pt - 2.0 * margin_pt;
    let height = width * (raster_height as f32 / raster_width as f32);

    if margin_pt + height > page.height_pt {
        warn!(
            "Raster height {:.1}pt runs past the page bottom ({:.1}pt)",
            height, page.height_pt
        );
    }

    Ok(Placement {
        x: margin_pt,
        y: margin_pt,
        width,
        height,
    })
}
