//! Content script for episode tabs
//!
//! Answers channel messages by running page commands in its own tab. The
//! content script cannot see the player itself, only the page realm can.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use seekmark_messaging::{Message, MessageListener, ScriptResult};
use seekmark_tabs::TabId;

use crate::command::{CurrentTimeCommand, SeekCommand};
use crate::injector::ScriptInjector;

pub struct EpisodeContentScript {
    tab_id: TabId,
    injector: Arc<dyn ScriptInjector>,
}

impl EpisodeContentScript {
    pub fn new(tab_id: TabId, injector: Arc<dyn ScriptInjector>) -> Self {
        Self { tab_id, injector }
    }

    async fn episode_time(&self) -> Value {
        match self
            .injector
            .execute(self.tab_id, &CurrentTimeCommand::invocation())
            .await
        {
            Ok(time) => time,
            Err(e) => {
                tracing::warn!(tab_id = %self.tab_id, error = %e, "Failed to read episode time");
                Value::Null
            }
        }
    }

    async fn set_episode_time(&self, time_ms: u64) -> Value {
        match self
            .injector
            .execute(self.tab_id, &SeekCommand::invocation(time_ms))
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tab_id = %self.tab_id, error = %e, "Failed to inject seek");
                json!(ScriptResult::failed(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl MessageListener for EpisodeContentScript {
    async fn on_message(&self, message: Message) -> Value {
        match message {
            Message::GetEpisodeTime => self.episode_time().await,
            Message::SetEpisodeTime { time_ms } => self.set_episode_time(time_ms).await,
        }
    }
}
