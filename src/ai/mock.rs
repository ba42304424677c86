use super::gemini::{Candidate, Content, Part};
use super::{InferenceResponse, InferenceService};
use crate::request::InferenceRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

enum MockReply {
    Response(InferenceResponse),
    Failure(Error),
}

/// Scripted inference service. Replies are consumed in order; once the queue
/// is empty every call gets a short text answer.
pub struct MockInferenceClient {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<InferenceRequest>>>,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, response: InferenceResponse) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Response(response));
        self
    }

    pub fn with_text_response(self, text: &str) -> Self {
        self.with_response(Self::response_with_parts(vec![Part::text(text)]))
    }

    pub fn with_image_response(self, mime_type: &str, base64_data: &str) -> Self {
        self.with_response(Self::response_with_parts(vec![Part::inline(
            mime_type,
            base64_data,
        )]))
    }

    pub fn with_failure(self, error: Error) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Failure(error));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn response_with_parts(parts: Vec<Part>) -> InferenceResponse {
        InferenceResponse {
            candidates: Some(vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: Some(parts),
                }),
                finish_reason: Some("STOP".to_string()),
            }]),
            text: None,
        }
    }
}

impl Default for MockInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceService for MockInferenceClient {
    async fn generate_content(&self, request: &InferenceRequest) -> Result<InferenceResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Failure(error)) => Err(error),
            None => Ok(Self::response_with_parts(vec![Part::text(
                "A mock description of the image",
            )])),
        }
    }
}
