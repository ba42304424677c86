//! Remote inference integration
//!
//! Provides the Gemini `generateContent` client behind a trait so the
//! orchestration layer can be driven by a mock in tests.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiClient;
pub use mock::MockInferenceClient;

use crate::request::InferenceRequest;
use crate::Result;
use async_trait::async_trait;

/// Response shape returned by the remote model.
pub type InferenceResponse = gemini::GenerateContentResponse;

#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Send one request and wait for the complete response.
    async fn generate_content(&self, request: &InferenceRequest) -> Result<InferenceResponse>;
}
