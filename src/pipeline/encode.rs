//! Image encoding helpers: PNG bytes and base64 `data:` URIs.
//!
//! PNG is used for the raster because it is lossless; JPEG artefacts around
//! small printed digits make totals hard to read.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Encode an image as PNG bytes.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    debug!("Encoded {}x{} image → {} bytes PNG", img.width(), img.height(), buf.len());
    Ok(buf)
}

/// Wrap raw bytes as `data:<mime>;base64,<…>`.
pub fn to_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Whether `src` is a `data:` URI.
pub fn is_data_uri(src: &str) -> bool {
    src.starts_with("data:")
}

/// Parse a `data:<mime>;base64,<data>` URI into its MIME type and bytes.
///
/// Returns `Err` if `src` is not a data URI or does not use base64 encoding.
pub fn parse_data_uri(src: &str) -> Result<(String, Vec<u8>), String> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URI".to_string())?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| "missing `,` between header and data".to_string())?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| "only base64-encoded data URIs are supported".to_string())?;
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| format!("base64 decode error: {e}"))?;
    Ok((mime.to_string(), bytes))
}

/// MIME type for a sniffed image format.
pub fn mime_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn png_round_trips_through_data_uri() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let png = encode_png(&img).expect("encode should succeed");
        assert_eq!(&png[1..4], b"PNG");

        let uri = to_data_uri(&png, "image/png");
        assert!(uri.starts_with("data:image/png;base64,"));
        let (mime, bytes) = parse_data_uri(&uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, png);
    }

    #[test]
    fn rejects_non_base64_data_uri() {
        assert!(parse_data_uri("data:image/svg+xml,<svg/>").is_err());
        assert!(parse_data_uri("https://cdn.example/logo.png").is_err());
        assert!(parse_data_uri("data:image/png;base64").is_err());
    }

    #[test]
    fn sniffed_formats_have_mime_types() {
        assert_eq!(mime_for(ImageFormat::Png), "image/png");
        assert_eq!(mime_for(ImageFormat::Jpeg), "image/jpeg");
    }
}
