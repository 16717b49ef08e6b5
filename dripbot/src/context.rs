//! Per-conversation skill context.
//!
//! A [`SkillContext`] carries everything one handler invocation needs: the
//! sender's address, the parsed parameters, the reply channel, and the
//! shared cache and faucet clients. Transient memory lives on the context
//! and is reset by the dispatcher after every invocation, on every exit
//! path; there is no process-global state to clear.

use crate::cache::CacheStore;
use crate::error::SkillResult;
use crate::faucet::{FaucetApi, Receipt};
use crate::skills::ParsedParams;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Trait for delivering replies back to the sender.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Send a text message.
    async fn send(&self, text: &str) -> SkillResult<()>;

    /// Send a transaction receipt.
    async fn send_receipt(&self, receipt: &Receipt) -> SkillResult<()>;
}

/// A reply captured by [`BufferedResponder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text reply.
    Text(String),
    /// Receipt delivery.
    Receipt(Receipt),
}

/// Responder that records replies in memory.
///
/// Used by tests to assert on exact message sequences.
#[derive(Debug, Default)]
pub struct BufferedResponder {
    replies: Mutex<Vec<Reply>>,
}

impl BufferedResponder {
    /// Create a new buffered responder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all recorded replies, leaving the buffer empty.
    pub async fn take(&self) -> Vec<Reply> {
        std::mem::take(&mut *self.replies.lock().await)
    }

    /// Snapshot the recorded replies.
    pub async fn replies(&self) -> Vec<Reply> {
        self.replies.lock().await.clone()
    }
}

#[async_trait]
impl Responder for BufferedResponder {
    async fn send(&self, text: &str) -> SkillResult<()> {
        self.replies.lock().await.push(Reply::Text(text.to_string()));
        Ok(())
    }

    async fn send_receipt(&self, receipt: &Receipt) -> SkillResult<()> {
        self.replies.lock().await.push(Reply::Receipt(receipt.clone()));
        Ok(())
    }
}

/// Context for a single skill invocation.
pub struct SkillContext {
    sender_address: String,
    params: ParsedParams,
    responder: Arc<dyn Responder>,
    cache: Arc<dyn CacheStore>,
    faucet: Arc<dyn FaucetApi>,
    memory: HashMap<String, serde_json::Value>,
}

impl std::fmt::Debug for SkillContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillContext")
            .field("sender_address", &self.sender_address)
            .field("params", &self.params)
            .field("memory_len", &self.memory.len())
            .finish_non_exhaustive()
    }
}

impl SkillContext {
    /// Create a context for a conversation with the given sender.
    pub fn new(
        sender_address: impl Into<String>,
        responder: Arc<dyn Responder>,
        cache: Arc<dyn CacheStore>,
        faucet: Arc<dyn FaucetApi>,
    ) -> Self {
        Self {
            sender_address: sender_address.into(),
            params: ParsedParams::new(),
            responder,
            cache,
            faucet,
            memory: HashMap::new(),
        }
    }

    /// The sender's wallet address.
    #[must_use]
    pub fn sender_address(&self) -> &str {
        &self.sender_address
    }

    /// Parameters parsed from the current command.
    #[must_use]
    pub const fn params(&self) -> &ParsedParams {
        &self.params
    }

    /// Install the parameters for the invocation being dispatched.
    pub fn set_params(&mut self, params: ParsedParams) {
        self.params = params;
    }

    /// Shared cache client.
    #[must_use]
    pub fn cache(&self) -> &dyn CacheStore {
        self.cache.as_ref()
    }

    /// Shared faucet client.
    #[must_use]
    pub fn faucet(&self) -> &dyn FaucetApi {
        self.faucet.as_ref()
    }

    /// Send a text reply to the sender.
    pub async fn send(&self, text: &str) -> SkillResult<()> {
        self.responder.send(text).await
    }

    /// Send a transaction receipt to the sender.
    pub async fn send_receipt(&self, receipt: &Receipt) -> SkillResult<()> {
        self.responder.send_receipt(receipt).await
    }

    /// Store a transient value for the current command exchange.
    pub fn remember(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.memory.insert(key.into(), value);
    }

    /// Recall a transient value.
    #[must_use]
    pub fn recall(&self, key: &str) -> Option<&serde_json::Value> {
        self.memory.get(key)
    }

    /// Clear transient memory and the parsed parameters.
    ///
    /// The dispatcher calls this after every handler invocation, regardless
    /// of which terminal state the handler reached.
    pub fn clear_memory(&mut self) {
        self.memory.clear();
        self.params = ParsedParams::new();
    }
}
