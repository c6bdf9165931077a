//! Seekmark Tab Management
//!
//! Tab model, the host-owned tab registry, and the locator that finds the
//! tab currently showing an episode.

mod error;
mod locator;
mod registry;
mod state;
mod tab;

pub use error::TabError;
pub use locator::{
    find_episode_tab, find_tab_by_url, is_episode_url, TabLocator, EPISODE_PATH_SEGMENT,
};
pub use registry::{InMemoryTabRegistry, TabRegistry};
pub use state::TabStatus;
pub use tab::{CreateTab, Tab, TabId, TabQuery, WindowId};

pub type Result<T> = std::result::Result<T, TabError>;
