//! Tab load state machine
//!
//! ```text
//! Complete
//!   ↓ navigate
//! Loading
//!   ↓ commit
//! Complete
//! ```
//!
//! A tab in `Loading` has not committed its URL yet, so nothing in its page
//! can answer messages. Navigating again while loading replaces the pending
//! URL; committing a tab that has nothing pending is rejected.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    /// Navigation requested, URL still pending
    Loading,
    /// URL committed and content loaded
    Complete,
}

impl TabStatus {
    /// Check if transition to another status is valid
    pub fn can_transition_to(&self, target: TabStatus) -> bool {
        match (self, target) {
            (TabStatus::Loading, _) => true,
            (TabStatus::Complete, TabStatus::Loading) => true,
            (TabStatus::Complete, TabStatus::Complete) => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabStatus::Loading => "loading",
            TabStatus::Complete => "complete",
        }
    }
}

impl std::fmt::Display for TabStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
