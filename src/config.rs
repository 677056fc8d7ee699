use std::env;
use std::path::PathBuf;

use tracing::debug;

use crate::error::ConfigError;

/// Trait for types that can retrieve their API key from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Find the API key by loading `.env` first, then reading the environment
    fn find_key() -> Option<String> {
        // First try to load .env file (silently fail if not found)
        let _ = dotenvy::dotenv();

        env::var(Self::KEY_NAME).ok().filter(|key| !key.trim().is_empty())
    }

    /// Like `find_key`, but a missing key is an error
    fn require_key() -> Result<String, ConfigError> {
        Self::find_key().ok_or(ConfigError::MissingKey(Self::KEY_NAME))
    }

    /// Whether the key is available without reading it into a client
    fn key_available() -> bool {
        Self::find_key().is_some()
    }
}

/// Runtime settings read from the environment.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// HTTP generation service; when unset the in-process gateway is used
    pub endpoint: Option<String>,
    /// Bearer token for `endpoint`
    pub endpoint_key: Option<String>,
    /// Model client for the in-process gateway (`gateway`, `claude`, `deepseek`, `mock`)
    pub client: Option<String>,
    /// Directory for prompt/response transcripts
    pub transcript_dir: Option<PathBuf>,
    /// Program used to pull text out of PDFs
    pub pdftotext: Option<String>,
}

impl Settings {
    pub const ENDPOINT: &'static str = "QUIZ_ENDPOINT";
    pub const ENDPOINT_KEY: &'static str = "QUIZ_ENDPOINT_KEY";
    pub const CLIENT: &'static str = "QUIZ_CLIENT";
    pub const TRANSCRIPT_DIR: &'static str = "QUIZ_TRANSCRIPT_DIR";
    pub const PDFTOTEXT: &'static str = "PDFTOTEXT";

    /// Load `.env` (if present) and read all settings.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let settings = Self {
            endpoint: get(Self::ENDPOINT),
            endpoint_key: get(Self::ENDPOINT_KEY),
            client: get(Self::CLIENT),
            transcript_dir: get(Self::TRANSCRIPT_DIR).map(PathBuf::from),
            pdftotext: get(Self::PDFTOTEXT),
        };
        debug!(
            target: "quiz_forge::config",
            endpoint = settings.endpoint.is_some(),
            client = ?settings.client,
            transcripts = settings.transcript_dir.is_some(),
            "Loaded settings"
        );
        settings
    }
}
