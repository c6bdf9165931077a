//! Core error types

use std::time::Duration;

use seekmark_messaging::MessagingError;
use seekmark_tabs::TabId;
use thiserror::Error;

/// Failures of the episode coordinator
#[derive(Error, Debug)]
pub enum EpisodeError {
    #[error("No episode tab is open in the focused window")]
    NoEpisodeTab,

    #[error("No content script is listening in tab {0}")]
    NoReceiver(TabId),

    #[error("Tab {tab_id} did not respond within {timeout:?}")]
    Timeout { tab_id: TabId, timeout: Duration },

    #[error("Tab {tab_id} could not report the episode time")]
    TimeUnavailable { tab_id: TabId },

    #[error("Unexpected response from content script: {0}")]
    UnexpectedResponse(String),

    #[error("Tab error: {0}")]
    Tabs(#[from] seekmark_tabs::TabError),
}

impl EpisodeError {
    /// Errors that may clear up once the tab finishes loading
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EpisodeError::NoEpisodeTab | EpisodeError::NoReceiver(_) | EpisodeError::Timeout { .. }
        )
    }
}

impl From<MessagingError> for EpisodeError {
    fn from(err: MessagingError) -> Self {
        match err {
            MessagingError::NoReceiver { tab_id } => EpisodeError::NoReceiver(tab_id),
            MessagingError::Timeout { tab_id, timeout } => EpisodeError::Timeout { tab_id, timeout },
            MessagingError::Serialization(e) => EpisodeError::UnexpectedResponse(e.to_string()),
        }
    }
}

/// Failures of the series name lookup
#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Series metadata not found")]
    MetadataMissing,

    #[error("Series metadata is not valid JSON: {0}")]
    MetadataJson(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] seekmark_storage::StorageError),

    #[error("Episode error: {0}")]
    Episode(#[from] EpisodeError),

    #[error("Series lookup error: {0}")]
    Series(#[from] SeriesError),

    #[error("Tab error: {0}")]
    Tabs(#[from] seekmark_tabs::TabError),

    #[error("Bookmark not found: {0}")]
    BookmarkNotFound(String),

    #[error("Episode tab has no URL")]
    MissingTabUrl,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messaging_errors_map_to_episode_errors() {
        let err: EpisodeError = MessagingError::NoReceiver { tab_id: TabId(7) }.into();
        assert!(matches!(err, EpisodeError::NoReceiver(TabId(7))));
        assert!(err.is_transient());

        let err: EpisodeError = MessagingError::Timeout {
            tab_id: TabId(7),
            timeout: Duration::from_secs(5),
        }
        .into();
        assert!(matches!(err, EpisodeError::Timeout { .. }));
        assert!(err.is_transient());

        assert!(!EpisodeError::TimeUnavailable { tab_id: TabId(7) }.is_transient());
    }
}
