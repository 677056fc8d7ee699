use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, instrument};

use super::{ensure_content, parse_generation_response, QuizGenerator};
use crate::error::{QuizError, GENERATION_FALLBACK_MESSAGE};
use crate::question::{GenerationRequest, Question, QuizConfig};

/// Calls a generation service over HTTP: `POST <endpoint>` with a JSON
/// `GenerationRequest` body.
#[derive(Debug, Clone)]
pub struct HttpQuizGenerator {
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpQuizGenerator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        info!(target: "quiz_forge::generator", endpoint = %endpoint, "Creating HTTP quiz generator");
        Self {
            endpoint,
            api_key: None,
            client: Client::new(),
        }
    }

    /// Send `Authorization: Bearer <api_key>` with every request.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait]
impl QuizGenerator for HttpQuizGenerator {
    #[instrument(
        target = "quiz_forge::generator",
        skip(self, content),
        fields(content_len = content.len(), endpoint = %self.endpoint)
    )]
    async fn generate(&self, content: &str, config: &QuizConfig) -> Result<Vec<Question>, QuizError> {
        ensure_content(content)?;

        let request = GenerationRequest::new(content, config);
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            error!(target: "quiz_forge::generator", error = %e, "Generation request failed");
            QuizError::GenerationRequest {
                status: None,
                message: GENERATION_FALLBACK_MESSAGE.to_string(),
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            error!(target: "quiz_forge::generator", error = %e, status, "Failed to read response body");
            QuizError::GenerationRequest {
                status: Some(status),
                message: GENERATION_FALLBACK_MESSAGE.to_string(),
            }
        })?;
        debug!(target: "quiz_forge::generator", status, body_len = body.len(), "Received generation response");

        parse_generation_response(status, &body)
    }
}
