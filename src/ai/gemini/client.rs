use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::ai::InferenceService;
use crate::models::{Config, DEFAULT_BASE_URL};
use crate::request::InferenceRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// Gemini REST client owning the single outbound `generateContent` call.
///
/// Configuration is fixed at construction; the client is shared read-only
/// across submissions. No retries and no timeout beyond reqwest's default.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_client(api_key, Client::new())
    }

    pub fn new_with_client(api_key: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_key.clone()).with_base_url(config.base_url.clone())
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

/// Auth failures are 401/403, plus Gemini's 400 for an unrecognised key.
fn is_auth_failure(status: StatusCode, body: &str) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || (status == StatusCode::BAD_REQUEST && body.contains("API_KEY_INVALID"))
}

#[async_trait]
impl InferenceService for GeminiClient {
    async fn generate_content(
        &self,
        request: &InferenceRequest,
    ) -> Result<GenerateContentResponse> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Auth("API key is missing".to_string()));
        }

        let url = self.endpoint(&request.model);
        let body = GenerateContentRequest::from(request);

        tracing::debug!("Sending generateContent request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            if is_auth_failure(status, &error_text) {
                return Err(Error::Auth(format!("status {}: {}", status, error_text)));
            }
            return Err(Error::Transport(format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, text);
            Error::Transport(format!("Failed to parse Gemini response: {}", e))
        })
    }
}
