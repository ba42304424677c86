//! Response extraction
//!
//! Pulls the typed result out of a Gemini response. Selection is "first
//! match in candidate order, then part order"; nothing is scored or ranked.

use crate::ai::InferenceResponse;
use crate::codec::data_url;
use crate::models::{GeminiResult, OperationMode};
use crate::{Error, Result};

const NO_IMAGE_MESSAGE: &str = "No image was generated in the response. The model may not have produced image output for this prompt.";
const NO_EDIT_IMAGE_MESSAGE: &str = "No image was generated in the response. The model may not have understood the prompt for image editing.";
const NO_ENHANCED_IMAGE_MESSAGE: &str =
    "No image was generated in the response. The model may have failed to enhance the image.";
const NO_TEXT_MESSAGE: &str = "No text was returned by the model for the image analysis.";

/// Text answer of an analysis call.
///
/// Prefers the top-level convenience `text`; otherwise joins the non-thought
/// text parts of the first candidate.
pub fn extract_text(response: &InferenceResponse) -> Result<String> {
    if let Some(text) = response.text.as_deref().filter(|t| !t.trim().is_empty()) {
        return Ok(text.to_string());
    }

    let text: String = response
        .candidates()
        .first()
        .map(|candidate| {
            candidate
                .parts()
                .iter()
                .filter(|part| !part.is_thought())
                .filter_map(|part| part.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(Error::EmptyResult(NO_TEXT_MESSAGE.to_string()));
    }
    Ok(text)
}

/// Data URL of the first image part across all candidates.
pub fn extract_image(response: &InferenceResponse) -> Result<String> {
    let found = response
        .candidates()
        .iter()
        .flat_map(|candidate| candidate.parts())
        .filter_map(|part| part.inline_data.as_ref())
        .find_map(|inline| match (inline.mime_type.as_deref(), inline.data.as_deref()) {
            (Some(mime_type), Some(data)) if mime_type.starts_with("image/") => {
                Some((mime_type, data))
            }
            _ => None,
        });

    match found {
        Some((mime_type, data)) => {
            tracing::debug!("Gemini returned image with mime_type: {}", mime_type);
            Ok(data_url(mime_type, data))
        }
        None => Err(Error::NoImageGenerated(NO_IMAGE_MESSAGE.to_string())),
    }
}

/// Extract the result kind `mode` produces, with a mode-specific message
/// when the expected image is missing.
pub fn extract_result(mode: OperationMode, response: &InferenceResponse) -> Result<GeminiResult> {
    if !mode.produces_image() {
        return extract_text(response).map(|content| GeminiResult::Text { content });
    }

    extract_image(response)
        .map(|data_url| GeminiResult::Image { data_url })
        .map_err(|err| match err {
            Error::NoImageGenerated(_) if mode == OperationMode::Enhance => {
                Error::NoImageGenerated(NO_ENHANCED_IMAGE_MESSAGE.to_string())
            }
            Error::NoImageGenerated(_) => {
                Error::NoImageGenerated(NO_EDIT_IMAGE_MESSAGE.to_string())
            }
            other => other,
        })
}
