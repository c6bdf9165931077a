//! Channel to a tab's content script

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use seekmark_tabs::TabId;

use crate::error::MessagingError;
use crate::message::Message;
use crate::Result;

/// Upper bound for one request/response round trip
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Delivers a message to the content script of one tab and awaits its answer.
///
/// Fails with [`MessagingError::NoReceiver`] when nothing listens in that tab.
/// Nothing is retried here.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send(&self, tab_id: TabId, message: &Message) -> Result<Value>;
}

#[async_trait]
impl<T: MessageChannel + ?Sized> MessageChannel for Arc<T> {
    async fn send(&self, tab_id: TabId, message: &Message) -> Result<Value> {
        (**self).send(tab_id, message).await
    }
}

/// Bounds every round trip of the wrapped channel
pub struct TimeoutChannel<C> {
    inner: C,
    timeout: Duration,
}

impl<C: MessageChannel> TimeoutChannel<C> {
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<C: MessageChannel> MessageChannel for TimeoutChannel<C> {
    async fn send(&self, tab_id: TabId, message: &Message) -> Result<Value> {
        match tokio::time::timeout(self.timeout, self.inner.send(tab_id, message)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    tab_id = %tab_id,
                    message = message.kind(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Content script did not respond in time"
                );
                Err(MessagingError::Timeout {
                    tab_id,
                    timeout: self.timeout,
                })
            }
        }
    }
}
