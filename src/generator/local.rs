use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{ensure_content, parse_generation_response, QuizGenerator};
use crate::core::LowLevelClient;
use crate::error::QuizError;
use crate::gateway::QuizGateway;
use crate::question::{GenerationRequest, Question, QuizConfig};

/// Runs the generation service in-process. Requests and replies still go through the
/// JSON wire contract, so behaviour matches talking to the service over HTTP.
#[derive(Debug, Clone)]
pub struct LocalQuizGenerator<C: LowLevelClient> {
    gateway: QuizGateway<C>,
}

impl<C: LowLevelClient> LocalQuizGenerator<C> {
    pub fn new(gateway: QuizGateway<C>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<C: LowLevelClient> QuizGenerator for LocalQuizGenerator<C> {
    #[instrument(target = "quiz_forge::generator", skip(self, content), fields(content_len = content.len()))]
    async fn generate(&self, content: &str, config: &QuizConfig) -> Result<Vec<Question>, QuizError> {
        ensure_content(content)?;

        let body = serde_json::to_string(&GenerationRequest::new(content, config))
            .map_err(|e| QuizError::Unknown(e.to_string()))?;
        let reply = self.gateway.respond(&body).await;
        debug!(target: "quiz_forge::generator", status = reply.status, "Gateway replied");

        parse_generation_response(reply.status, &reply.body.to_string())
    }
}
