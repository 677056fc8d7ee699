use crate::config::KeyFromEnv;
use crate::core::{ChatPrompt, LowLevelClient};
use crate::error::{AIError, ConfigError, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

impl ClaudeConfig {
    pub const DEFAULT_MODEL: &'static str = "claude-3-5-haiku-latest";

    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: Self::DEFAULT_MODEL.to_string(),
            max_tokens: 8192,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(ClaudeClient::require_key()?))
    }
}

/// Client for the Anthropic messages API.
#[derive(Debug, Clone)]
pub struct ClaudeClient {
    config: ClaudeConfig,
    client: Client,
}

impl KeyFromEnv for ClaudeClient {
    const KEY_NAME: &'static str = "ANTHROPIC_API_KEY";
}

impl ClaudeClient {
    pub fn new(config: ClaudeConfig) -> Self {
        info!(model = %config.model, "Creating new Claude client");
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl LowLevelClient for ClaudeClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model))]
    async fn ask_raw(&self, prompt: ChatPrompt) -> Result<String, AIError> {
        debug!(model = %self.config.model, "Preparing Claude API request");

        let request = ClaudeRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: prompt.system,
            messages: vec![ClaudeMessage { role: "user", content: prompt.user }],
        };

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                AIError::Claude(ProviderError::Http(e.to_string()))
            })?;

        let status = response.status();
        debug!(status = %status, "Received response from Claude API");

        if status == 429 {
            warn!("Claude API rate limit exceeded");
            return Err(AIError::Claude(ProviderError::RateLimit));
        }

        if status == 401 {
            error!("Claude API authentication failed");
            return Err(AIError::Claude(ProviderError::Authentication));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Claude API error");
            return Err(AIError::Claude(ProviderError::Api(error_text)));
        }

        let claude_response: ClaudeResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse Claude response JSON");
            AIError::Claude(ProviderError::Http(e.to_string()))
        })?;

        // Text blocks are concatenated; other block kinds carry no text.
        let text: String = claude_response
            .content
            .into_iter()
            .map(|block| block.text)
            .collect();

        if text.is_empty() {
            error!("No content in Claude response");
            return Err(AIError::Claude(ProviderError::Api("No content in response".to_string())));
        }

        info!(response_len = text.len(), "Successfully received Claude response");
        Ok(text)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
