//! Interaction state machine sequencing validation, dispatch and extraction.
//!
//! [`Studio`] owns the state the view layer renders. A submission is tagged
//! with a sequence number; a completion whose number is no longer current
//! (the user uploaded a new image or submitted again) is discarded.

use crate::ai::InferenceService;
use crate::models::{GeminiResult, ImagePayload, OperationMode};
use crate::request::RequestBuilder;
use crate::{codec, extract, prompts, Error, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything the presentation layer observes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub image: Option<ImagePayload>,
    pub prompt: String,
    pub mode: OperationMode,
    pub is_loading: bool,
    pub last_result: Option<GeminiResult>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// A validated submission, detached from the [`Studio`] so the call can run
/// while the state stays free to change.
pub struct Submission {
    sequence: u64,
    mode: OperationMode,
    image: ImagePayload,
    prompt: String,
    builder: RequestBuilder,
    service: Arc<dyn InferenceService>,
}

/// Outcome of a [`Submission`], to be handed back to [`Studio::complete`].
#[derive(Debug)]
pub struct Completion {
    sequence: u64,
    outcome: Result<GeminiResult>,
}

impl Completion {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl Submission {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Encode, build, send and extract, strictly in that order.
    pub async fn run(self) -> Completion {
        let outcome = self.execute().await;
        Completion {
            sequence: self.sequence,
            outcome,
        }
    }

    async fn execute(&self) -> Result<GeminiResult> {
        let encoded = codec::encode(&self.image).await?;
        let request = self.builder.build(self.mode, encoded, &self.prompt);
        let response = self.service.generate_content(&request).await?;
        extract::extract_result(self.mode, &response)
    }
}

pub struct Studio {
    service: Arc<dyn InferenceService>,
    builder: RequestBuilder,
    state: InteractionState,
    sequence: u64,
}

impl Studio {
    pub fn new(service: Arc<dyn InferenceService>) -> Self {
        Self::with_request_builder(service, RequestBuilder::default())
    }

    pub fn with_request_builder(
        service: Arc<dyn InferenceService>,
        builder: RequestBuilder,
    ) -> Self {
        Self {
            service,
            builder,
            state: InteractionState::default(),
            sequence: 0,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        if self.state.is_loading {
            Phase::InFlight
        } else if self.state.last_result.is_some() {
            Phase::Succeeded
        } else if self.state.last_error.is_some() {
            Phase::Failed
        } else {
            Phase::Idle
        }
    }

    /// Replace the image and return to idle. Any in-flight call becomes stale.
    pub fn upload_image(&mut self, image: ImagePayload) {
        info!(
            "Image uploaded ({} bytes, {})",
            image.len(),
            image.mime_type()
        );
        self.sequence += 1;
        self.state.image = Some(image);
        self.state.prompt.clear();
        self.state.last_result = None;
        self.state.last_error = None;
        self.state.is_loading = false;
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.state.prompt = prompt.into();
    }

    pub fn set_mode(&mut self, mode: OperationMode) {
        self.state.mode = mode;
    }

    /// Use one of the current mode's prompt suggestions. Returns false if
    /// `index` is out of range.
    pub fn apply_suggestion(&mut self, index: usize) -> bool {
        match prompts::suggestions(self.state.mode).get(index) {
            Some(suggestion) => {
                self.state.prompt = (*suggestion).to_string();
                true
            }
            None => false,
        }
    }

    fn validate(&self) -> Result<ImagePayload> {
        let image = self.state.image.clone().ok_or(Error::MissingImage)?;
        if self.state.mode.requires_prompt() && self.state.prompt.is_empty() {
            return Err(Error::MissingPrompt(self.state.mode));
        }
        Ok(image)
    }

    /// Validate the current state and enter the in-flight phase.
    ///
    /// Validation failures are recorded as `last_error` and returned; no
    /// request is made and any earlier in-flight call becomes stale.
    pub fn begin(&mut self) -> Result<Submission> {
        let image = match self.validate() {
            Ok(image) => image,
            Err(err) => {
                warn!("Submission rejected: {}", err);
                self.sequence += 1;
                self.state.is_loading = false;
                self.state.last_result = None;
                self.state.last_error = Some(err.to_string());
                return Err(err);
            }
        };

        self.sequence += 1;
        self.state.last_result = None;
        self.state.last_error = None;
        self.state.is_loading = true;

        info!(
            "Submitting {} request #{} ({} bytes)",
            self.state.mode,
            self.sequence,
            image.len()
        );

        Ok(Submission {
            sequence: self.sequence,
            mode: self.state.mode,
            image,
            prompt: self.state.prompt.clone(),
            builder: self.builder.clone(),
            service: Arc::clone(&self.service),
        })
    }

    /// Apply a finished submission. Returns false when it was stale and
    /// therefore ignored.
    pub fn complete(&mut self, completion: Completion) -> bool {
        if completion.sequence != self.sequence || !self.state.is_loading {
            warn!(
                "Discarding stale completion #{} (current #{})",
                completion.sequence, self.sequence
            );
            return false;
        }

        self.state.is_loading = false;
        match completion.outcome {
            Ok(result) => {
                info!("Submission #{} succeeded", completion.sequence);
                self.state.last_error = None;
                self.state.last_result = Some(result);
            }
            Err(err) => {
                warn!("Submission #{} failed: {}", completion.sequence, err);
                self.state.last_result = None;
                self.state.last_error = Some(err.to_string());
            }
        }
        true
    }

    /// Run a whole submission against the current state. The outcome is
    /// published through [`Studio::state`].
    pub async fn submit(&mut self) {
        if let Ok(submission) = self.begin() {
            let completion = submission.run().await;
            self.complete(completion);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockInferenceClient;
    use crate::request::ContentPart;

    const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn png() -> ImagePayload {
        ImagePayload::new(PNG.to_vec(), "image/png")
    }

    fn studio_with(mock: MockInferenceClient) -> (Studio, Arc<MockInferenceClient>) {
        let mock = Arc::new(mock);
        (Studio::new(mock.clone()), mock)
    }

    #[tokio::test]
    async fn test_submit_without_image_never_calls_service() {
        for mode in OperationMode::ALL {
            let (mut studio, mock) = studio_with(MockInferenceClient::new());
            studio.set_mode(mode);
            studio.set_prompt("something");

            studio.submit().await;

            assert_eq!(mock.get_call_count(), 0);
            assert_eq!(
                studio.state().last_error.as_deref(),
                Some("Please upload an image first.")
            );
            assert!(!studio.state().is_loading);
            assert_eq!(studio.phase(), Phase::Failed);
        }
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected_for_edit_and_analyze() {
        for (mode, message) in [
            (OperationMode::Edit, "Please enter a prompt to edit the image."),
            (
                OperationMode::Analyze,
                "Please enter a prompt to analyze the image.",
            ),
        ] {
            let (mut studio, mock) = studio_with(MockInferenceClient::new());
            studio.upload_image(png());
            studio.set_mode(mode);
            studio.set_prompt("");

            let err = studio.begin().err().unwrap();
            assert!(matches!(err, Error::MissingPrompt(m) if m == mode));
            assert!(!studio.state().is_loading);
            assert_eq!(studio.state().last_error.as_deref(), Some(message));
            assert_eq!(mock.get_call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_whitespace_prompt_is_sent_as_entered() {
        let (mut studio, mock) = studio_with(MockInferenceClient::new());
        studio.upload_image(png());
        studio.set_mode(OperationMode::Analyze);
        studio.set_prompt("   ");

        studio.submit().await;

        assert_eq!(mock.get_call_count(), 1);
        assert_eq!(
            mock.requests()[0].parts[1],
            ContentPart::Text("   ".to_string())
        );
        assert_eq!(studio.state().last_error, None);
        assert_eq!(studio.phase(), Phase::Succeeded);
    }

    #[tokio::test]
    async fn test_enhance_sends_fixed_instruction_without_prompt() {
        let (mut studio, mock) =
            studio_with(MockInferenceClient::new().with_image_response("image/png", "AAAA"));
        studio.upload_image(png());
        studio.set_mode(OperationMode::Enhance);
        studio.set_prompt("turn it into a cartoon");

        studio.submit().await;

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].parts[1],
            ContentPart::Text(prompts::ENHANCE_INSTRUCTION.to_string())
        );
        assert_eq!(
            studio.state().last_result,
            Some(GeminiResult::Image {
                data_url: "data:image/png;base64,AAAA".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_analyze_success_publishes_text() {
        let (mut studio, _mock) =
            studio_with(MockInferenceClient::new().with_text_response("A sunny beach."));
        studio.upload_image(png());
        studio.set_mode(OperationMode::Analyze);
        studio.set_prompt("Describe this image in detail");

        studio.submit().await;

        let state = studio.state();
        assert!(!state.is_loading);
        assert_eq!(state.last_error, None);
        assert_eq!(
            state.last_result.as_ref().and_then(|r| r.as_text()),
            Some("A sunny beach.")
        );
        assert_eq!(studio.phase(), Phase::Succeeded);
    }

    #[tokio::test]
    async fn test_transport_failure_clears_loading_and_result() {
        let (mut studio, _mock) = studio_with(
            MockInferenceClient::new()
                .with_image_response("image/png", "AAAA")
                .with_failure(Error::Transport("connection reset".to_string())),
        );
        studio.upload_image(png());
        studio.set_prompt("Add a small robot");

        studio.submit().await;
        assert!(studio.state().last_result.is_some());

        studio.submit().await;
        let state = studio.state();
        assert!(!state.is_loading);
        assert_eq!(state.last_result, None);
        assert_eq!(
            state.last_error.as_deref(),
            Some("Request to Gemini failed: connection reset")
        );
    }

    #[tokio::test]
    async fn test_missing_image_part_in_edit_response_is_reported() {
        let (mut studio, _mock) =
            studio_with(MockInferenceClient::new().with_text_response("I cannot edit that."));
        studio.upload_image(png());
        studio.set_prompt("Remove the person in the background");

        studio.submit().await;

        let error = studio.state().last_error.clone().unwrap();
        assert!(error.starts_with("No image was generated"));
        assert_eq!(studio.phase(), Phase::Failed);
    }

    #[tokio::test]
    async fn test_loading_is_set_only_while_in_flight() {
        let (mut studio, _mock) = studio_with(MockInferenceClient::new());
        studio.upload_image(png());
        studio.set_mode(OperationMode::Analyze);
        studio.set_prompt("What is this?");

        let submission = studio.begin().unwrap();
        assert!(studio.state().is_loading);
        assert_eq!(studio.phase(), Phase::InFlight);

        let completion = submission.run().await;
        assert!(studio.complete(completion));
        assert!(!studio.state().is_loading);
    }

    #[tokio::test]
    async fn test_upload_resets_state_even_after_result() {
        let (mut studio, _mock) = studio_with(MockInferenceClient::new());
        studio.upload_image(png());
        studio.set_mode(OperationMode::Analyze);
        studio.set_prompt("Describe");
        studio.submit().await;
        assert!(studio.state().last_result.is_some());

        studio.upload_image(png());

        let state = studio.state();
        assert_eq!(state.prompt, "");
        assert_eq!(state.last_result, None);
        assert_eq!(state.last_error, None);
        assert_eq!(state.mode, OperationMode::Analyze);
        assert_eq!(studio.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_stale_completion_after_upload_is_discarded() {
        let (mut studio, _mock) = studio_with(MockInferenceClient::new());
        studio.upload_image(png());
        studio.set_mode(OperationMode::Analyze);
        studio.set_prompt("Describe");

        let submission = studio.begin().unwrap();
        studio.upload_image(png());

        let completion = submission.run().await;
        assert!(!studio.complete(completion));
        assert_eq!(studio.state().last_result, None);
        assert!(!studio.state().is_loading);
        assert_eq!(studio.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_superseded_submission_does_not_overwrite_newer_one() {
        let (mut studio, _mock) = studio_with(
            MockInferenceClient::new()
                .with_text_response("old")
                .with_text_response("new"),
        );
        studio.upload_image(png());
        studio.set_mode(OperationMode::Analyze);
        studio.set_prompt("Describe");

        let first = studio.begin().unwrap();
        let second = studio.begin().unwrap();
        assert!(second.sequence() > first.sequence());

        let first_done = first.run().await;
        let second_done = second.run().await;

        assert!(studio.complete(second_done));
        assert!(!studio.complete(first_done));
        assert_eq!(
            studio.state().last_result.as_ref().and_then(|r| r.as_text()),
            Some("new")
        );
    }

    #[tokio::test]
    async fn test_validation_failure_supersedes_in_flight_call() {
        let (mut studio, _mock) = studio_with(MockInferenceClient::new());
        studio.upload_image(png());
        studio.set_mode(OperationMode::Analyze);
        studio.set_prompt("Describe");

        let submission = studio.begin().unwrap();
        studio.set_prompt("");
        assert!(studio.begin().is_err());
        assert!(!studio.state().is_loading);

        assert!(!studio.complete(submission.run().await));
        assert_eq!(
            studio.state().last_error.as_deref(),
            Some("Please enter a prompt to analyze the image.")
        );
        assert_eq!(studio.state().last_result, None);
    }

    #[test]
    fn test_apply_suggestion_uses_current_mode() {
        let mut studio = Studio::new(Arc::new(MockInferenceClient::new()));
        studio.set_mode(OperationMode::Analyze);
        assert!(studio.apply_suggestion(0));
        assert_eq!(studio.state().prompt, "Describe this image in detail");

        studio.set_mode(OperationMode::Enhance);
        assert!(!studio.apply_suggestion(0));
    }
}
