//! Messaging error types

use std::time::Duration;

use seekmark_tabs::TabId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("No receiver in tab {tab_id}")]
    NoReceiver { tab_id: TabId },

    #[error("Tab {tab_id} did not respond within {timeout:?}")]
    Timeout { tab_id: TabId, timeout: Duration },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
