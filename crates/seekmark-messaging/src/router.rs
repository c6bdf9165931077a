//! In-process message router
//!
//! Each tab's content script connects a [`ContentPort`]. Requests are
//! serialized to JSON on the way in, so only plain data crosses over, and
//! every request carries its own reply slot.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use seekmark_tabs::TabId;

use crate::channel::MessageChannel;
use crate::error::MessagingError;
use crate::message::Message;
use crate::Result;

const PORT_CAPACITY: usize = 16;

/// A request waiting for the content script's answer
#[derive(Debug)]
pub struct IncomingMessage {
    payload: Value,
    reply: oneshot::Sender<Value>,
}

impl IncomingMessage {
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn message(&self) -> Result<Message> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }

    /// Returns false when the sender stopped waiting
    pub fn respond(self, response: Value) -> bool {
        self.reply.send(response).is_ok()
    }
}

/// Content-script side handler
#[async_trait]
pub trait MessageListener: Send + Sync {
    async fn on_message(&self, message: Message) -> Value;
}

/// Receiving end registered for one tab
pub struct ContentPort {
    tab_id: TabId,
    receiver: mpsc::Receiver<IncomingMessage>,
}

impl ContentPort {
    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    pub async fn recv(&mut self) -> Option<IncomingMessage> {
        self.receiver.recv().await
    }

    /// Answer requests with `listener` until the port is disconnected
    pub async fn serve(mut self, listener: Arc<dyn MessageListener>) {
        tracing::debug!(tab_id = %self.tab_id, "Content script listening");

        while let Some(incoming) = self.recv().await {
            let response = match incoming.message() {
                Ok(message) => listener.on_message(message).await,
                Err(e) => {
                    tracing::warn!(tab_id = %self.tab_id, error = %e, "Ignoring unknown message");
                    Value::Null
                }
            };

            if !incoming.respond(response) {
                tracing::debug!(tab_id = %self.tab_id, "Sender stopped waiting for response");
            }
        }

        tracing::debug!(tab_id = %self.tab_id, "Content script port closed");
    }
}

/// Routes messages to whichever content script is connected for a tab
///
/// Cloning shares the same set of ports.
#[derive(Clone, Default)]
pub struct MessageRouter {
    ports: Arc<RwLock<HashMap<TabId, mpsc::Sender<IncomingMessage>>>>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the content script of `tab_id`, replacing any previous one
    pub fn connect(&self, tab_id: TabId) -> ContentPort {
        let (sender, receiver) = mpsc::channel(PORT_CAPACITY);
        self.ports.write().insert(tab_id, sender);

        tracing::debug!(tab_id = %tab_id, "Content script connected");

        ContentPort { tab_id, receiver }
    }

    /// Drop the content script of `tab_id`, as when its page unloads
    pub fn disconnect(&self, tab_id: TabId) -> bool {
        let removed = self.ports.write().remove(&tab_id).is_some();
        if removed {
            tracing::debug!(tab_id = %tab_id, "Content script disconnected");
        }
        removed
    }

    pub fn is_connected(&self, tab_id: TabId) -> bool {
        self.ports
            .read()
            .get(&tab_id)
            .map(|sender| !sender.is_closed())
            .unwrap_or(false)
    }

    fn forget_stale(&self, tab_id: TabId, stale: &mpsc::Sender<IncomingMessage>) {
        let mut ports = self.ports.write();
        if ports
            .get(&tab_id)
            .map(|sender| sender.same_channel(stale))
            .unwrap_or(false)
        {
            ports.remove(&tab_id);
        }
    }
}

#[async_trait]
impl MessageChannel for MessageRouter {
    async fn send(&self, tab_id: TabId, message: &Message) -> Result<Value> {
        let sender = self
            .ports
            .read()
            .get(&tab_id)
            .cloned()
            .ok_or(MessagingError::NoReceiver { tab_id })?;

        let payload = serde_json::to_value(message)?;
        let (reply, response) = oneshot::channel();

        tracing::debug!(tab_id = %tab_id, message = message.kind(), "Sending message");

        if sender.send(IncomingMessage { payload, reply }).await.is_err() {
            self.forget_stale(tab_id, &sender);
            return Err(MessagingError::NoReceiver { tab_id });
        }

        response
            .await
            .map_err(|_| MessagingError::NoReceiver { tab_id })
    }
}
