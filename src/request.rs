//! Request builder
//!
//! Turns an operation mode, an encoded image and the user's prompt into the
//! exact multimodal request sent to Gemini.

use crate::models::{
    Config, EncodedImage, OperationMode, DEFAULT_ANALYSIS_MODEL, DEFAULT_IMAGE_MODEL,
};
use crate::prompts::ENHANCE_INSTRUCTION;

/// One fragment of the outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    InlineImage(EncodedImage),
}

/// Output kind the caller expects back when it is not plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseModality {
    Image,
}

impl ResponseModality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseModality::Image => "IMAGE",
        }
    }
}

/// A fully assembled request. Built per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    pub model: String,
    pub parts: Vec<ContentPart>,
    pub response_modality: Option<ResponseModality>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBuilder {
    analysis_model: String,
    image_model: String,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ANALYSIS_MODEL, DEFAULT_IMAGE_MODEL)
    }
}

impl RequestBuilder {
    pub fn new(analysis_model: impl Into<String>, image_model: impl Into<String>) -> Self {
        Self {
            analysis_model: analysis_model.into(),
            image_model: image_model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.analysis_model.clone(), config.image_model.clone())
    }

    /// Assemble the request for `mode`.
    ///
    /// The image part always comes first. Enhance ignores `prompt` and sends
    /// [`ENHANCE_INSTRUCTION`] instead. Prompt presence is checked upstream.
    pub fn build(
        &self,
        mode: OperationMode,
        image: EncodedImage,
        prompt: &str,
    ) -> InferenceRequest {
        let (model, text, response_modality) = match mode {
            OperationMode::Analyze => (&self.analysis_model, prompt, None),
            OperationMode::Edit => (&self.image_model, prompt, Some(ResponseModality::Image)),
            OperationMode::Enhance => (
                &self.image_model,
                ENHANCE_INSTRUCTION,
                Some(ResponseModality::Image),
            ),
        };

        tracing::debug!(
            "Built {} request for model {} ({} base64 chars)",
            mode,
            model,
            image.data.len()
        );

        InferenceRequest {
            model: model.clone(),
            parts: vec![
                ContentPart::InlineImage(image),
                ContentPart::Text(text.to_string()),
            ],
            response_modality,
        }
    }
}
