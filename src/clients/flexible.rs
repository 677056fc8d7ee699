use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use tracing::info;

use super::chat::{ChatCompletionsClient, ChatConfig, DeepSeekKey, GatewayKey};
use super::claude::{ClaudeClient, ClaudeConfig};
use super::mock::MockClient;
use crate::config::KeyFromEnv;
use crate::core::{ChatPrompt, LowLevelClient};
use crate::error::{AIError, ConfigError};

/// Which model backend the in-process gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    Gateway,
    Claude,
    DeepSeek,
    Mock,
}

impl ClientType {
    /// Pick a backend from the API keys present, in order of preference.
    pub fn detect() -> Self {
        if GatewayKey::key_available() {
            Self::Gateway
        } else if ClaudeClient::key_available() {
            Self::Claude
        } else if DeepSeekKey::key_available() {
            Self::DeepSeek
        } else {
            Self::Mock
        }
    }
}

impl FromStr for ClientType {
    type Err = ConfigError;

    /// Parse client type from string (case insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gateway" => Ok(Self::Gateway),
            "claude" => Ok(Self::Claude),
            "deepseek" => Ok(Self::DeepSeek),
            "mock" => Ok(Self::Mock),
            _ => Err(ConfigError::Invalid(format!(
                "unknown client type '{}'. Supported: gateway, claude, deepseek, mock",
                s
            ))),
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientType::Gateway => write!(f, "Gateway"),
            ClientType::Claude => write!(f, "Claude"),
            ClientType::DeepSeek => write!(f, "DeepSeek"),
            ClientType::Mock => write!(f, "Mock"),
        }
    }
}

/// Client wrapper chosen at runtime.
#[derive(Debug, Clone)]
pub struct FlexibleClient {
    inner: Box<dyn LowLevelClient>,
}

impl FlexibleClient {
    pub fn new(client: Box<dyn LowLevelClient>) -> Self {
        Self { inner: client }
    }

    /// Build the client for `client_type`, reading its API key from the environment.
    pub fn from_type(client_type: ClientType) -> Result<Self, ConfigError> {
        info!(client = %client_type, "Creating flexible client");
        let inner: Box<dyn LowLevelClient> = match client_type {
            ClientType::Gateway => Box::new(ChatCompletionsClient::new(ChatConfig::gateway_from_env()?)),
            ClientType::Claude => Box::new(ClaudeClient::new(ClaudeConfig::from_env()?)),
            ClientType::DeepSeek => Box::new(ChatCompletionsClient::new(ChatConfig::deepseek_from_env()?)),
            ClientType::Mock => Box::new(MockClient::new().0),
        };
        Ok(Self::new(inner))
    }
}

#[async_trait]
impl LowLevelClient for FlexibleClient {
    async fn ask_raw(&self, prompt: ChatPrompt) -> Result<String, AIError> {
        self.inner.ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
