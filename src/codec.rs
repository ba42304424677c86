//! Binary codec for image payloads
//!
//! Converts uploaded image bytes to the base64 form Gemini expects inline,
//! and formats/parses the data URLs that carry image results back out.

use crate::ai::mime::detect_image_mime;
use crate::models::{EncodedImage, ImagePayload};
use crate::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::Path;

/// Read an image file without blocking the runtime and sniff its mime type.
pub async fn read_image(path: &Path) -> Result<ImagePayload> {
    let bytes = tokio::fs::read(path).await?;
    let mime_type = detect_image_mime(&bytes)
        .ok_or_else(|| Error::UnsupportedImage(path.display().to_string()))?;

    tracing::debug!(
        "Read {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        mime_type
    );

    Ok(ImagePayload::new(bytes, mime_type))
}

/// Base64-encode an image payload.
///
/// Encoding runs on the blocking pool so large uploads do not stall the
/// async caller.
pub async fn encode(image: &ImagePayload) -> Result<EncodedImage> {
    let bytes = image.shared_bytes();
    let data = tokio::task::spawn_blocking(move || STANDARD.encode(&bytes))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(format!("encode task failed: {}", e))))?;

    Ok(EncodedImage {
        mime_type: image.mime_type().to_string(),
        data,
    })
}

/// Format a data URL. The base64 payload is passed through untouched.
pub fn data_url(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// Split a base64 data URL back into its mime type and decoded bytes.
pub fn decode_data_url(value: &str) -> Result<(String, Vec<u8>)> {
    let (meta, payload) = value
        .split_once(',')
        .ok_or_else(|| Error::InvalidDataUrl("missing ',' separator".to_string()))?;

    let meta = meta
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| Error::InvalidDataUrl("missing 'data:' scheme".to_string()))?;
    let mime_type = meta
        .strip_suffix(";base64")
        .ok_or_else(|| Error::InvalidDataUrl("payload is not base64".to_string()))?;
    if mime_type.is_empty() {
        return Err(Error::InvalidDataUrl("missing mime type".to_string()));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::InvalidDataUrl(format!("base64 decode failed: {}", e)))?;

    Ok((mime_type.to_string(), bytes))
}
