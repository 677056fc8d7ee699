use async_trait::async_trait;
use std::fmt::Debug;

use crate::core::ChatPrompt;

/// Observer of prompt/response exchanges with the model.
#[async_trait]
pub trait Interceptor: Send + Sync + Debug {
    async fn save(&self, prompt: &ChatPrompt, response: &str) -> std::io::Result<()>;
}

pub mod file;
pub use file::FileInterceptor;
