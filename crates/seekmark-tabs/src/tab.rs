//! Tab data structure
//!
//! Mirrors what a browser host reports for a tab: a small integer id, the
//! window it lives in, the committed URL and whether it is the active tab.

use serde::{Deserialize, Serialize};

use crate::error::TabError;
use crate::state::TabStatus;
use crate::Result;

/// Host-assigned tab identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u32);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host-assigned window identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u32);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// Absent for tabs the host cannot address yet
    pub id: Option<TabId>,
    /// Window this tab belongs to
    pub window_id: WindowId,
    /// Last committed URL
    pub url: Option<String>,
    /// URL of a navigation that has not committed yet
    pub pending_url: Option<String>,
    /// Whether this is the selected tab of its window
    pub active: bool,
    /// Current load status
    pub status: TabStatus,
}

impl Tab {
    /// A blank, loaded tab
    pub fn new(id: TabId, window_id: WindowId) -> Self {
        Self {
            id: Some(id),
            window_id,
            url: None,
            pending_url: None,
            active: false,
            status: TabStatus::Complete,
        }
    }

    /// Attempt to transition to a new load status
    pub fn transition_to(&mut self, new_status: TabStatus) -> Result<()> {
        if !self.status.can_transition_to(new_status) {
            return Err(TabError::InvalidTransition {
                from: self.status.to_string(),
                to: new_status.to_string(),
            });
        }

        tracing::debug!(
            tab_id = ?self.id,
            from = %self.status,
            to = %new_status,
            "Tab status transition"
        );

        self.status = new_status;
        Ok(())
    }

    /// Start a navigation; the URL stays pending until committed
    pub fn navigate(&mut self, url: String) -> Result<()> {
        if url.trim().is_empty() {
            return Err(TabError::InvalidUrl("URL cannot be empty".to_string()));
        }

        self.transition_to(TabStatus::Loading)?;
        self.pending_url = Some(url);
        Ok(())
    }

    /// Commit the pending navigation
    pub fn commit_navigation(&mut self) -> Result<()> {
        self.transition_to(TabStatus::Complete)?;
        if let Some(url) = self.pending_url.take() {
            self.url = Some(url);
        }
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.status == TabStatus::Loading
    }
}

/// Filter accepted by [`crate::TabRegistry::query`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabQuery {
    pub active: Option<bool>,
    pub last_focused_window: Option<bool>,
}

impl TabQuery {
    /// Selected tabs of the last focused window
    pub fn active_in_focused_window() -> Self {
        Self {
            active: Some(true),
            last_focused_window: Some(true),
        }
    }
}

/// Navigation request for a new tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTab {
    pub url: String,
    pub active: bool,
}
