//! Capabilities of the hosting page
//!
//! The page's player object graph is untyped and owned by the page itself.
//! Everything the bridge needs from it goes through these two traits, so an
//! adapter for a real page is the only place that touches it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use seekmark_messaging::{EpisodeTime, PossibleEpisodeTime};

use crate::error::PlayerError;

/// Identifier of one player session on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        SessionId(id.to_string())
    }
}

/// Player resolved from a session id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerHandle {
    session_id: SessionId,
}

impl PlayerHandle {
    pub fn new(session_id: SessionId) -> Self {
        Self { session_id }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

/// The page's DOM, as far as the bridge cares
pub trait PageDocument: Send + Sync {
    /// True when at least one element matches the CSS selector
    fn has_element(&self, selector: &str) -> bool;
}

/// The page's player API
pub trait PlayerAccessor: Send + Sync {
    fn list_sessions(&self) -> Vec<SessionId>;

    fn get_player(&self, session_id: &SessionId) -> Option<PlayerHandle>;

    fn seek(&self, player: &PlayerHandle, time_ms: EpisodeTime) -> Result<(), PlayerError>;

    fn current_time(&self, player: &PlayerHandle) -> PossibleEpisodeTime;
}

/// Everything a page-context procedure can reach
#[derive(Clone)]
pub struct PageContext {
    pub document: Arc<dyn PageDocument>,
    pub player: Arc<dyn PlayerAccessor>,
}

impl PageContext {
    pub fn new(document: Arc<dyn PageDocument>, player: Arc<dyn PlayerAccessor>) -> Self {
        Self { document, player }
    }

    /// First player session that resolves to a player
    pub fn first_player(&self) -> Option<PlayerHandle> {
        let session_id = self.player.list_sessions().into_iter().next()?;
        self.player.get_player(&session_id)
    }
}
