//! Bridge error types

use seekmark_tabs::TabId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Unknown page command: {name}@{version}")]
    UnknownCommand { name: String, version: u32 },

    #[error("Invalid arguments for {command}: {message}")]
    InvalidArguments { command: String, message: String },

    #[error("No page context for tab {0}")]
    NoPageContext(TabId),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure reported by the page's player API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PlayerError(pub String);
