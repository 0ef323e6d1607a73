//! Remote LLM provider implementations.
//!
//! - **Claude** - Anthropic's Messages API

pub mod claude;

pub use claude::ClaudeClient;
