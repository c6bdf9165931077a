//! Episode tab locator
//!
//! Tabs are matched against the episode page pattern (`/watch/<digits>`) or
//! against an exact URL. Both only look at committed URLs, so a tab whose
//! navigation is still pending is invisible here: its content could not
//! answer a message anyway.

use std::sync::Arc;

use url::Url;

use crate::registry::TabRegistry;
use crate::tab::{Tab, TabQuery};
use crate::Result;

/// Path segment that precedes the numeric episode id
pub const EPISODE_PATH_SEGMENT: &str = "watch";

/// True when `url` has a `watch` segment immediately followed by an all-digit segment.
pub fn is_episode_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(segments) = parsed.path_segments() else {
        return false;
    };

    let segments: Vec<&str> = segments.collect();
    segments.windows(2).any(|pair| {
        pair[0] == EPISODE_PATH_SEGMENT
            && !pair[1].is_empty()
            && pair[1].bytes().all(|b| b.is_ascii_digit())
    })
}

/// First addressable tab showing an episode.
pub fn find_episode_tab(tabs: &[Tab]) -> Option<&Tab> {
    tabs.iter().find(|tab| {
        tab.id.is_some() && tab.url.as_deref().map(is_episode_url).unwrap_or(false)
    })
}

/// First tab whose committed URL equals `url` exactly.
pub fn find_tab_by_url<'a>(tabs: &'a [Tab], url: &str) -> Option<&'a Tab> {
    tabs.iter().find(|tab| tab.url.as_deref() == Some(url))
}

/// Read-only view over the host's tab registry
#[derive(Clone)]
pub struct TabLocator {
    registry: Arc<dyn TabRegistry>,
}

impl TabLocator {
    pub fn new(registry: Arc<dyn TabRegistry>) -> Self {
        Self { registry }
    }

    /// Selected tabs of the last focused window
    pub async fn query_active_tabs(&self) -> Result<Vec<Tab>> {
        self.registry
            .query(&TabQuery::active_in_focused_window())
            .await
    }

    pub async fn locate_episode_tab(&self) -> Result<Option<Tab>> {
        let tabs = self.query_active_tabs().await?;
        Ok(find_episode_tab(&tabs).cloned())
    }

    pub async fn locate_tab_by_url(&self, url: &str) -> Result<Option<Tab>> {
        let tabs = self.query_active_tabs().await?;
        Ok(find_tab_by_url(&tabs, url).cloned())
    }
}
