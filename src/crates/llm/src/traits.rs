//! The remote-call boundary.
//!
//! Everything above this trait treats the model as an opaque function from a
//! conversation to reply text. Implementations own transport, auth and model
//! selection.

use crate::error::Result;
use crate::messages::Message;
use async_trait::async_trait;

/// Core trait for chat-based language models.
///
/// Implementations must be `Send + Sync`; share them as `Arc<dyn ChatModel>`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the conversation and return the text of the model's reply.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`](crate::LlmError). Callers decide whether to
    /// retry using [`LlmError::is_retryable`](crate::LlmError::is_retryable).
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Short identifier used in logs.
    fn name(&self) -> &str {
        "chat-model"
    }
}
