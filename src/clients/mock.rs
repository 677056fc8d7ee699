use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use crate::core::{ChatPrompt, LowLevelClient};
use crate::error::{AIError, ProviderError};

/// A scripted reply for `MockClient`.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Raw model text
    Text(String),
    /// Provider failure
    Error(ProviderError),
}

impl MockResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// Shared control over a `MockClient`: queue replies and inspect the prompts it saw.
#[derive(Debug, Default)]
pub struct MockHandle {
    responses: Mutex<VecDeque<MockResponse>>,
    prompts: Mutex<Vec<ChatPrompt>>,
}

impl MockHandle {
    pub fn push(&self, response: MockResponse) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.push(MockResponse::text(text));
    }

    /// Every prompt received so far, oldest first.
    pub fn prompts(&self) -> Vec<ChatPrompt> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    fn next(&self, prompt: ChatPrompt) -> Option<MockResponse> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt);
        }
        self.responses.lock().ok().and_then(|mut queue| queue.pop_front())
    }
}

/// Mock client that replays queued responses. When the queue is empty it answers with
/// a small fixed quiz so the binary stays usable without an API key.
#[derive(Debug, Clone)]
pub struct MockClient {
    handle: Arc<MockHandle>,
}

impl MockClient {
    pub fn new() -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        (Self { handle: handle.clone() }, handle)
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (client, handle) = Self::new();
        for response in responses {
            handle.push(response);
        }
        (client, handle)
    }
}

#[async_trait]
impl LowLevelClient for MockClient {
    async fn ask_raw(&self, prompt: ChatPrompt) -> Result<String, AIError> {
        debug!(prompt_len = prompt.len(), "Mock client received prompt");
        match self.handle.next(prompt) {
            Some(MockResponse::Text(text)) => Ok(text),
            Some(MockResponse::Error(e)) => Err(AIError::Mock(e)),
            None => Ok(SAMPLE_QUIZ.to_string()),
        }
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

const SAMPLE_QUIZ: &str = r#"{
  "questions": [
    {
      "question": "What is the capital of France?",
      "type": "MCQ",
      "options": ["A) Berlin", "B) Paris", "C) Madrid", "D) Rome"],
      "correctAnswer": "B) Paris",
      "explanation": "Paris has been the capital of France since the 10th century."
    },
    {
      "question": "In which year did World War II end?",
      "type": "MCQ",
      "options": ["A) 1945", "B) 1939", "C) 1918", "D) 1950"],
      "correctAnswer": "A) 1945",
      "explanation": "The war ended in 1945 with the surrender of Germany and then Japan."
    },
    {
      "question": "Which gas do plants release during photosynthesis?",
      "type": "MCQ",
      "options": ["A) Nitrogen", "B) Carbon dioxide", "C) Oxygen", "D) Helium"],
      "correctAnswer": "C) Oxygen",
      "explanation": "Photosynthesis splits water and releases oxygen as a by-product."
    }
  ]
}"#;
