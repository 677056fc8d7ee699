//! Quiz generation client.
//!
//! A `QuizGenerator` turns `(content, config)` into a complete, non-empty question list
//! or a typed failure. Every implementation goes through `parse_generation_response`,
//! so the HTTP endpoint and the in-process gateway share one response contract.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{QuizError, GENERATION_FALLBACK_MESSAGE};
use crate::question::{Question, QuizConfig};

pub mod http;
pub mod local;

pub use http::HttpQuizGenerator;
pub use local::LocalQuizGenerator;

#[async_trait]
pub trait QuizGenerator: Send + Sync {
    /// Issue one generation request. Not idempotent: every call is a new request.
    async fn generate(&self, content: &str, config: &QuizConfig) -> Result<Vec<Question>, QuizError>;
}

/// Fail fast on blank content, before any request is made.
pub fn ensure_content(content: &str) -> Result<(), QuizError> {
    if content.trim().is_empty() {
        return Err(QuizError::EmptyContent);
    }
    Ok(())
}

/// Interpret a generation service reply.
///
/// - non-2xx: `GenerationRequest` carrying the body's `error` string, or the fallback
/// - 2xx: the `questions` field, or the whole body when it is an array
/// - anything else, an empty list or a structurally broken question:
///   `InvalidResponseFormat`
pub fn parse_generation_response(status: u16, body: &str) -> Result<Vec<Question>, QuizError> {
    let success = (200..300).contains(&status);
    let value: Option<Value> = serde_json::from_str(body).ok();

    if !success {
        let message = value
            .as_ref()
            .and_then(|v| v.get("error"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| GENERATION_FALLBACK_MESSAGE.to_string());
        warn!(target: "quiz_forge::generator", status, message = %message, "Generation service returned an error");
        return Err(QuizError::GenerationRequest { status: Some(status), message });
    }

    let value = value.ok_or_else(|| {
        QuizError::InvalidResponseFormat("response body is not JSON".to_string())
    })?;

    let questions_value = match value {
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Null) | None => {
                return Err(QuizError::InvalidResponseFormat(
                    "response has no `questions` field".to_string(),
                ))
            }
            Some(questions) => questions,
        },
        array @ Value::Array(_) => array,
        _ => {
            return Err(QuizError::InvalidResponseFormat(
                "response is neither an object nor an array".to_string(),
            ))
        }
    };

    let questions: Vec<Question> = serde_json::from_value(questions_value)
        .map_err(|e| QuizError::InvalidResponseFormat(e.to_string()))?;

    if questions.is_empty() {
        return Err(QuizError::InvalidResponseFormat("response contains no questions".to_string()));
    }
    for (index, question) in questions.iter().enumerate() {
        if let Some(defect) = question.defect() {
            return Err(QuizError::InvalidResponseFormat(format!(
                "question {}: {}",
                index + 1,
                defect
            )));
        }
    }

    debug!(target: "quiz_forge::generator", count = questions.len(), "Parsed generation response");
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_content_is_rejected() {
        assert!(matches!(ensure_content("  \n\t"), Err(QuizError::EmptyContent)));
        assert!(ensure_content(" a ").is_ok());
    }
}
