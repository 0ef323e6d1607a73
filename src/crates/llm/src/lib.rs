//! LLM provider boundary for riddle-bench.
//!
//! This crate defines the [`ChatModel`] trait, the message types it consumes,
//! and a concrete Anthropic implementation in [`remote::ClaudeClient`].
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use llm::remote::ClaudeClient;
//! use llm::{ChatModel, Message, RemoteLlmConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RemoteLlmConfig::from_env(
//!         "ANTHROPIC_API_KEY",
//!         "https://api.anthropic.com",
//!         "claude-3-5-sonnet-latest",
//!     )?;
//!     let client = ClaudeClient::new(config)?;
//!
//!     let reply = client.complete(&[Message::user("What is Rust?")]).await?;
//!     println!("Response: {}", reply);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod messages;
pub mod remote;
pub mod traits;

// Re-export commonly used types
pub use config::RemoteLlmConfig;
pub use error::{LlmError, Result};
pub use messages::{Conversation, Message, Role};
pub use traits::ChatModel;
