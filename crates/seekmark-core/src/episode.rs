//! Episode coordinator
//!
//! Finds the episode tab of the focused window and talks to its content
//! script. Each call is a single attempt: locate the tab, send one message,
//! interpret the answer. Retrying is left to callers.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use seekmark_messaging::{
    episode_time_from_response, EpisodeTime, Message, MessageChannel, ScriptResult,
};
use seekmark_tabs::{Tab, TabId, TabLocator, TabRegistry};

use crate::error::EpisodeError;

pub type EpisodeResult<T> = std::result::Result<T, EpisodeError>;

/// An episode tab together with its player position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeTabAndTime {
    pub tab: Tab,
    pub time: EpisodeTime,
}

pub struct EpisodeCoordinator {
    locator: TabLocator,
    channel: Arc<dyn MessageChannel>,
}

impl EpisodeCoordinator {
    pub fn new(registry: Arc<dyn TabRegistry>, channel: Arc<dyn MessageChannel>) -> Self {
        Self {
            locator: TabLocator::new(registry),
            channel,
        }
    }

    /// The first active tab showing an episode, if any
    pub async fn find_one_episode_tab(&self) -> EpisodeResult<Option<Tab>> {
        Ok(self.locator.locate_episode_tab().await?)
    }

    /// The active tab whose URL is exactly `url`, if any
    pub async fn find_one_episode_tab_by_url(&self, url: &str) -> EpisodeResult<Option<Tab>> {
        Ok(self.locator.locate_tab_by_url(url).await?)
    }

    async fn require_episode_tab(&self) -> EpisodeResult<(Tab, TabId)> {
        let tab = self
            .find_one_episode_tab()
            .await?
            .ok_or(EpisodeError::NoEpisodeTab)?;
        let tab_id = tab.id.ok_or(EpisodeError::NoEpisodeTab)?;
        Ok((tab, tab_id))
    }

    /// Position of the episode tab's player.
    ///
    /// A position of 0 is treated like a missing one: the player reports 0
    /// before playback has started.
    pub async fn get_current_time(&self) -> EpisodeResult<EpisodeTabAndTime> {
        let (tab, tab_id) = self.require_episode_tab().await?;

        let response = self.channel.send(tab_id, &Message::GetEpisodeTime).await?;
        let time = episode_time_from_response(&response)
            .filter(|time| *time > 0)
            .ok_or_else(|| {
                tracing::warn!(tab_id = %tab_id, response = %response, "Episode time unavailable");
                EpisodeError::TimeUnavailable { tab_id }
            })?;

        tracing::debug!(tab_id = %tab_id, time_ms = time, "Read episode time");

        Ok(EpisodeTabAndTime { tab, time })
    }

    /// Ask the episode tab to seek.
    ///
    /// A seek the page refused comes back as an unsuccessful [`ScriptResult`],
    /// not as an error.
    pub async fn set_time(&self, time_ms: EpisodeTime) -> EpisodeResult<ScriptResult> {
        let (_, tab_id) = self.require_episode_tab().await?;

        let response = self
            .channel
            .send(tab_id, &Message::set_episode_time(time_ms))
            .await?;
        let result: ScriptResult = serde_json::from_value(response.clone())
            .map_err(|_| EpisodeError::UnexpectedResponse(response.to_string()))?;

        if result.success {
            tracing::info!(tab_id = %tab_id, time_ms, "Episode time set");
        } else {
            tracing::warn!(tab_id = %tab_id, time_ms, reason = ?result.reason, "Failed to set episode time");
        }

        Ok(result)
    }
}
