use crate::config::KeyFromEnv;
use crate::core::{ChatPrompt, LowLevelClient};
use crate::error::{AIError, ConfigError, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Key for the hosted AI gateway.
pub struct GatewayKey;

impl KeyFromEnv for GatewayKey {
    const KEY_NAME: &'static str = "QUIZ_GATEWAY_API_KEY";
}

/// Key for the DeepSeek API.
pub struct DeepSeekKey;

impl KeyFromEnv for DeepSeekKey {
    const KEY_NAME: &'static str = "DEEPSEEK_API_KEY";
}

/// Configuration for an OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl ChatConfig {
    pub const GATEWAY_ENDPOINT: &'static str = "https://ai.gateway.lovable.dev/v1/chat/completions";
    pub const GATEWAY_MODEL: &'static str = "google/gemini-2.5-flash";
    pub const DEEPSEEK_ENDPOINT: &'static str = "https://api.deepseek.com/v1/chat/completions";
    pub const DEEPSEEK_MODEL: &'static str = "deepseek-chat";

    /// The hosted AI gateway the quiz service was built against.
    pub fn gateway(api_key: String) -> Self {
        Self {
            endpoint: Self::GATEWAY_ENDPOINT.to_string(),
            api_key,
            model: Self::GATEWAY_MODEL.to_string(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn deepseek(api_key: String) -> Self {
        Self {
            endpoint: Self::DEEPSEEK_ENDPOINT.to_string(),
            api_key,
            model: Self::DEEPSEEK_MODEL.to_string(),
            max_tokens: Some(4096),
            temperature: Some(0.3),
        }
    }

    pub fn gateway_from_env() -> Result<Self, ConfigError> {
        Ok(Self::gateway(GatewayKey::require_key()?))
    }

    pub fn deepseek_from_env() -> Result<Self, ConfigError> {
        Ok(Self::deepseek(DeepSeekKey::require_key()?))
    }
}

/// Client for OpenAI-compatible `chat/completions` APIs.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    config: ChatConfig,
    client: Client,
}

impl ChatCompletionsClient {
    pub fn new(config: ChatConfig) -> Self {
        info!(model = %config.model, endpoint = %config.endpoint, "Creating new chat completions client");
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl LowLevelClient for ChatCompletionsClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model))]
    async fn ask_raw(&self, prompt: ChatPrompt) -> Result<String, AIError> {
        debug!(model = %self.config.model, prompt_len = prompt.len(), "Preparing chat completions request");

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage { role: "system", content: prompt.system },
                ChatMessage { role: "user", content: prompt.user },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                AIError::Chat(ProviderError::Http(e.to_string()))
            })?;

        let status = response.status();
        debug!(status = %status, "Received chat completions response");

        if status == 429 {
            warn!("Chat completions rate limit exceeded");
            return Err(AIError::Chat(ProviderError::RateLimit));
        }

        if status == 402 {
            warn!("Chat completions quota exhausted");
            return Err(AIError::Chat(ProviderError::PaymentRequired));
        }

        if status == 401 {
            error!("Chat completions authentication failed");
            return Err(AIError::Chat(ProviderError::Authentication));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Chat completions API error");
            return Err(AIError::Chat(ProviderError::Api(error_text)));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse chat completions response JSON");
            AIError::Chat(ProviderError::Http(e.to_string()))
        })?;

        let result = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                error!("No choices in chat completions response");
                AIError::Chat(ProviderError::Api("No choices in response".to_string()))
            });

        if let Ok(text) = &result {
            info!(response_len = text.len(), "Successfully received chat completions response");
        }

        result
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
