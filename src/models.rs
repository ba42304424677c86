//! Data models and structures
//!
//! Defines the image payloads, operation modes, typed results and process
//! configuration shared by the codec, request builder and state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// What the user wants done with the uploaded image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationMode {
    #[default]
    Edit,
    Analyze,
    Enhance,
}

impl OperationMode {
    pub const ALL: [OperationMode; 3] = [
        OperationMode::Edit,
        OperationMode::Analyze,
        OperationMode::Enhance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationMode::Edit => "edit",
            OperationMode::Analyze => "analyze",
            OperationMode::Enhance => "enhance",
        }
    }

    /// Enhance carries its own instruction; the other modes need user text.
    pub fn requires_prompt(&self) -> bool {
        !matches!(self, OperationMode::Enhance)
    }

    /// Whether a successful call yields an image rather than text.
    pub fn produces_image(&self) -> bool {
        !matches!(self, OperationMode::Analyze)
    }

    pub fn action_label(&self) -> &'static str {
        match self {
            OperationMode::Edit => "Generate Edit",
            OperationMode::Analyze => "Analyze Image",
            OperationMode::Enhance => "Enhance Image",
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "edit" => Ok(OperationMode::Edit),
            "analyze" | "analyse" => Ok(OperationMode::Analyze),
            "enhance" => Ok(OperationMode::Enhance),
            other => Err(format!(
                "Invalid mode '{}'. Expected one of: edit, analyze, enhance",
                other
            )),
        }
    }
}

/// Raw image bytes plus their mime type, as supplied by the uploader.
///
/// The byte buffer is shared, so cloning a payload into an in-flight
/// submission does not copy the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl ImagePayload {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Base64 form of an [`ImagePayload`], ready to be inlined in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: String,
    pub data: String,
}

/// The typed result handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeminiResult {
    Text { content: String },
    Image { data_url: String },
}

impl GeminiResult {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            GeminiResult::Text { content } => Some(content),
            GeminiResult::Image { .. } => None,
        }
    }

    pub fn as_data_url(&self) -> Option<&str> {
        match self {
            GeminiResult::Image { data_url } => Some(data_url),
            GeminiResult::Text { .. } => None,
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub analysis_model: String,
    pub image_model: String,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if any).
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_blank("GEMINI_API_KEY")
            .or_else(|| non_blank("API_KEY"))
            .ok_or_else(|| crate::Error::Config("GEMINI_API_KEY not set".to_string()))?;

        Ok(Self {
            api_key,
            base_url: non_blank("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            analysis_model: non_blank("GEMINI_ANALYSIS_MODEL")
                .unwrap_or_else(|| DEFAULT_ANALYSIS_MODEL.to_string()),
            image_model: non_blank("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
        })
    }
}
