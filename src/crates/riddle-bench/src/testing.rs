//! Test doubles for the chat model boundary.
//!
//! [`FakeModel`] answers from a closure and records every conversation it
//! receives, so tests can assert on prompt shape and call counts without a
//! network.

use async_trait::async_trait;
use llm::{ChatModel, Conversation, LlmError, Message};
use std::collections::VecDeque;
use std::sync::Mutex;

type Responder = Box<dyn Fn(&[Message], usize) -> llm::Result<String> + Send + Sync>;

/// A [`ChatModel`] driven by a closure of `(conversation, call_index)`.
pub struct FakeModel {
    respond: Responder,
    calls: Mutex<Vec<Conversation>>,
}

impl FakeModel {
    /// Answer every call with `respond(conversation, call_index)`.
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&[Message], usize) -> llm::Result<String> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with the same text.
    pub fn constant(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self::new(move |_, _| Ok(reply.clone()))
    }

    /// Hand out `replies` in call order; calls beyond the script fail.
    pub fn scripted(replies: Vec<llm::Result<String>>) -> Self {
        let queue = Mutex::new(VecDeque::from(replies));
        Self::new(move |_, index| {
            queue
                .lock()
                .map_err(|_| LlmError::ProviderError("script lock poisoned".into()))?
                .pop_front()
                .unwrap_or_else(|| {
                    Err(LlmError::ProviderError(format!(
                        "no scripted reply for call {}",
                        index
                    )))
                })
        })
    }

    /// Every conversation received so far, in arrival order.
    pub fn calls(&self) -> Vec<Conversation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn complete(&self, messages: &[Message]) -> llm::Result<String> {
        let index = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| LlmError::ProviderError("call log poisoned".into()))?;
            calls.push(messages.to_vec());
            calls.len() - 1
        };
        (self.respond)(messages, index)
    }

    fn name(&self) -> &str {
        "fake"
    }
}
