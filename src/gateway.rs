//! The generation service: turns source content plus a quiz configuration into
//! questions by prompting a model.
//!
//! `QuizGateway` wraps any `LowLevelClient`. `generate` is the typed API;
//! `respond` speaks the service's JSON contract (request body in, status and JSON
//! body out) so it can sit behind any HTTP surface or be driven in-process by
//! `LocalQuizGenerator`.

use std::sync::Arc;

use schemars::schema_for;
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::core::{ChatPrompt, LowLevelClient};
use crate::error::GatewayError;
use crate::interceptors::Interceptor;
use crate::json_utils::extract_first;
use crate::question::{GeneratedQuiz, GenerationRequest, QuestionType};

/// Status and JSON body, as the HTTP service would answer.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply {
    pub status: u16,
    pub body: Value,
}

impl GatewayReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn failure(e: &GatewayError) -> Self {
        Self {
            status: e.status(),
            body: json!({ "error": e.public_message() }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct QuizGateway<C: LowLevelClient> {
    client: C,
    interceptor: Option<Arc<dyn Interceptor>>,
}

impl<C: LowLevelClient> QuizGateway<C> {
    pub fn new(client: C) -> Self {
        info!(target: "quiz_forge::gateway", "Creating new QuizGateway");
        Self { client, interceptor: None }
    }

    /// Record every prompt/response exchange through `interceptor`.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// Handle a raw JSON request body.
    #[instrument(target = "quiz_forge::gateway", skip(self, body), fields(body_len = body.len()))]
    pub async fn respond(&self, body: &str) -> GatewayReply {
        let request: GenerationRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(e) => {
                warn!(target: "quiz_forge::gateway", error = %e, "Rejecting malformed request body");
                return GatewayReply::failure(&GatewayError::BadRequest(e.to_string()));
            }
        };

        match self.generate(&request).await {
            Ok(quiz) => match serde_json::to_value(&quiz) {
                Ok(body) => GatewayReply { status: 200, body },
                Err(e) => {
                    error!(target: "quiz_forge::gateway", error = %e, "Failed to serialize quiz");
                    GatewayReply { status: 500, body: json!({ "error": e.to_string() }) }
                }
            },
            Err(e) => GatewayReply::failure(&e),
        }
    }

    /// Generate a quiz for `request`.
    ///
    /// The question list is returned as the model produced it; its length is not
    /// forced to match the requested count.
    #[instrument(
        target = "quiz_forge::gateway",
        skip(self, request),
        fields(
            content_len = request.content.len(),
            question_type = %request.question_type,
            difficulty = %request.difficulty,
            count = request.question_count
        )
    )]
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedQuiz, GatewayError> {
        if request.content.trim().is_empty() {
            return Err(GatewayError::BadRequest("content must not be empty".to_string()));
        }
        request
            .config()
            .map_err(|e| GatewayError::BadRequest(e.to_string()))?;

        info!(target: "quiz_forge::gateway", "Generating quiz");
        let prompt = build_prompt(request);
        let raw = self.client.ask_raw(prompt.clone()).await.map_err(|e| {
            error!(target: "quiz_forge::gateway", error = %e, "Model call failed");
            GatewayError::from(e)
        })?;
        debug!(target: "quiz_forge::gateway", response_len = raw.len(), "Model responded");

        if let Some(interceptor) = &self.interceptor {
            if let Err(e) = interceptor.save(&prompt, &raw).await {
                warn!(target: "quiz_forge::gateway", error = %e, "Failed to save transcript");
            }
        }

        let quiz: GeneratedQuiz = extract_first(&raw).ok_or_else(|| {
            error!(target: "quiz_forge::gateway", response_len = raw.len(), "No quiz object in model output");
            GatewayError::UnparseableOutput
        })?;

        info!(target: "quiz_forge::gateway", questions = quiz.questions.len(), "Quiz generated");
        Ok(quiz)
    }
}

/// The system instruction and user message for `request`.
pub fn build_prompt(request: &GenerationRequest) -> ChatPrompt {
    let count = request.question_count;
    let question_type = request.question_type;
    let options_line = if question_type == QuestionType::Mcq {
        r#"
      "options": ["A) option1", "B) option2", "C) option3", "D) option4"],"#
    } else {
        ""
    };

    let system = format!(
        r#"You are an expert educational quiz generator. Generate {count} {question_type} questions based on the provided content.

Difficulty level: {difficulty}
Question type: {question_type}

Rules:
- For MCQs: Provide 4 options (A, B, C, D) with exactly one correct answer
- For True/False: Simple statements with boolean answers
- For One Word: Questions requiring single-word answers
- For Brief: Questions requiring 1-2 sentence answers
- For Long Answer: Questions requiring detailed explanations

Return ONLY a JSON object with this exact structure:
{{
  "questions": [
    {{
      "question": "The question text",
      "type": "{question_type}",{options_line}
      "correctAnswer": "The correct answer or option letter",
      "explanation": "Brief explanation of the answer"
    }}
  ]
}}
{schema}"#,
        difficulty = request.difficulty,
        schema = schema_guidance(),
    );

    let user = format!("Generate questions from this content:\n\n{}", request.content);
    ChatPrompt::new(system, user)
}

fn schema_guidance() -> String {
    let schema = schema_for!(GeneratedQuiz);
    let schema_json = serde_json::to_string_pretty(&schema)
        .unwrap_or_else(|_| "Schema serialization failed".to_string());
    format!("\n## Response Format\nThe JSON object must match this schema:\n```json\n{}\n```", schema_json)
}
