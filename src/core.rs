//! Low-level model client abstraction shared by every provider.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::AIError;

/// A chat prompt: a system instruction plus the user's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

impl ChatPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self { system: system.into(), user: user.into() }
    }

    pub fn len(&self) -> usize {
        self.system.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}

/// Low-level model client.
///
/// Implementors execute one chat prompt and return the raw model text. Extracting
/// structured data from that text is left to the caller (see `QuizGateway`).
#[async_trait]
pub trait LowLevelClient: Send + Sync + Debug {
    async fn ask_raw(&self, prompt: ChatPrompt) -> Result<String, AIError>;

    /// Clone this client into a boxed trait object
    fn clone_box(&self) -> Box<dyn LowLevelClient>;
}

impl Clone for Box<dyn LowLevelClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[async_trait]
impl LowLevelClient for Box<dyn LowLevelClient> {
    async fn ask_raw(&self, prompt: ChatPrompt) -> Result<String, AIError> {
        self.as_ref().ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        self.as_ref().clone_box()
    }
}
