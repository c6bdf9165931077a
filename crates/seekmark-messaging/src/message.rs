//! Message and response shapes

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Playback position in milliseconds
pub type EpisodeTime = u64;

/// `None` means the time could not be determined, which is not the same as `Some(0)`
pub type PossibleEpisodeTime = Option<EpisodeTime>;

/// Request understood by the content script of an episode tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    /// Ask for the player's current position
    GetEpisodeTime,
    /// Ask the player to seek
    SetEpisodeTime {
        #[serde(rename = "timeMs")]
        time_ms: EpisodeTime,
    },
}

impl Message {
    pub fn set_episode_time(time_ms: EpisodeTime) -> Self {
        Message::SetEpisodeTime { time_ms }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Message::GetEpisodeTime => "getEpisodeTime",
            Message::SetEpisodeTime { .. } => "setEpisodeTime",
        }
    }
}

/// Read a time out of a `GetEpisodeTime` response.
///
/// Fractional milliseconds are rounded. Anything but a finite, non-negative
/// number counts as "no time".
pub fn episode_time_from_response(response: &Value) -> PossibleEpisodeTime {
    response.as_u64().or_else(|| {
        response
            .as_f64()
            .filter(|ms| ms.is_finite() && *ms >= 0.0)
            .map(|ms| ms.round() as EpisodeTime)
    })
}

/// Outcome of a page-context procedure
///
/// `reason` is only filled in on failure and is meant for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ScriptResult {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
        }
    }
}
