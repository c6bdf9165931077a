//! Tab registry
//!
//! The registry belongs to the browser host. The core only queries it and,
//! when resuming a bookmark, asks it to open a tab.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::TabError;
use crate::tab::{CreateTab, Tab, TabId, TabQuery, WindowId};
use crate::Result;

#[async_trait]
pub trait TabRegistry: Send + Sync {
    /// Tabs matching `query`, in tab order
    async fn query(&self, query: &TabQuery) -> Result<Vec<Tab>>;

    /// Open a tab navigating to `request.url` in the focused window
    async fn create(&self, request: CreateTab) -> Result<Tab>;
}

#[derive(Default)]
struct RegistryState {
    tabs: BTreeMap<TabId, Tab>,
    windows: Vec<WindowId>,
    focused_window: Option<WindowId>,
    next_tab_id: u32,
    next_window_id: u32,
}

impl RegistryState {
    fn tab_mut(&mut self, tab_id: TabId) -> Result<&mut Tab> {
        self.tabs.get_mut(&tab_id).ok_or(TabError::NotFound(tab_id))
    }

    fn ensure_window(&self, window_id: WindowId) -> Result<()> {
        if self.windows.contains(&window_id) {
            Ok(())
        } else {
            Err(TabError::WindowNotFound(window_id))
        }
    }

    fn allocate_tab_id(&mut self) -> TabId {
        self.next_tab_id += 1;
        TabId(self.next_tab_id)
    }

    fn add_window(&mut self) -> WindowId {
        self.next_window_id += 1;
        let id = WindowId(self.next_window_id);
        self.windows.push(id);
        self.focused_window = Some(id);
        id
    }

    fn deactivate_window_tabs(&mut self, window_id: WindowId) {
        for tab in self.tabs.values_mut().filter(|t| t.window_id == window_id) {
            tab.active = false;
        }
    }
}

/// Host-side registry kept in memory
///
/// Cloning shares the same underlying registry.
#[derive(Clone, Default)]
pub struct InMemoryTabRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl InMemoryTabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a window and focus it
    pub fn open_window(&self) -> WindowId {
        let id = self.state.write().add_window();
        tracing::debug!(window_id = %id, "Opened window");
        id
    }

    pub fn focus_window(&self, window_id: WindowId) -> Result<()> {
        let mut state = self.state.write();
        state.ensure_window(window_id)?;
        state.focused_window = Some(window_id);
        Ok(())
    }

    /// Open a tab whose URL is already committed
    pub fn open_tab(&self, window_id: WindowId, url: &str, active: bool) -> Result<Tab> {
        let tab_id = self.insert_tab(window_id, url, active)?;
        self.commit_navigation(tab_id)
    }

    /// Open a tab whose navigation has not committed yet
    pub fn open_pending_tab(&self, window_id: WindowId, url: &str, active: bool) -> Result<Tab> {
        let tab_id = self.insert_tab(window_id, url, active)?;
        self.get_tab(tab_id)
    }

    fn insert_tab(&self, window_id: WindowId, url: &str, active: bool) -> Result<TabId> {
        let mut state = self.state.write();
        state.ensure_window(window_id)?;

        let id = state.allocate_tab_id();
        let mut tab = Tab::new(id, window_id);
        tab.navigate(url.to_string())?;

        if active {
            state.deactivate_window_tabs(window_id);
            tab.active = true;
        }

        state.tabs.insert(id, tab);

        tracing::info!(tab_id = %id, window_id = %window_id, url = %url, "Opened tab");

        Ok(id)
    }

    pub fn get_tab(&self, tab_id: TabId) -> Result<Tab> {
        self.state
            .read()
            .tabs
            .get(&tab_id)
            .cloned()
            .ok_or(TabError::NotFound(tab_id))
    }

    /// Start navigating an existing tab
    pub fn navigate_tab(&self, tab_id: TabId, url: &str) -> Result<Tab> {
        let mut state = self.state.write();
        let tab = state.tab_mut(tab_id)?;
        tab.navigate(url.to_string())?;
        Ok(tab.clone())
    }

    pub fn commit_navigation(&self, tab_id: TabId) -> Result<Tab> {
        let mut state = self.state.write();
        let tab = state.tab_mut(tab_id)?;
        tab.commit_navigation()?;

        tracing::debug!(tab_id = %tab_id, url = ?tab.url, "Committed navigation");

        Ok(tab.clone())
    }

    /// Select a tab within its window
    pub fn activate_tab(&self, tab_id: TabId) -> Result<Tab> {
        let mut state = self.state.write();
        let window_id = state.tab_mut(tab_id)?.window_id;
        state.deactivate_window_tabs(window_id);

        let tab = state.tab_mut(tab_id)?;
        tab.active = true;
        Ok(tab.clone())
    }

    pub fn close_tab(&self, tab_id: TabId) -> Result<()> {
        let removed = self.state.write().tabs.remove(&tab_id);
        if removed.is_none() {
            return Err(TabError::NotFound(tab_id));
        }

        tracing::info!(tab_id = %tab_id, "Closed tab");

        Ok(())
    }

    fn matches(state: &RegistryState, tab: &Tab, query: &TabQuery) -> bool {
        if let Some(active) = query.active {
            if tab.active != active {
                return false;
            }
        }

        if let Some(last_focused) = query.last_focused_window {
            let in_focused = state.focused_window == Some(tab.window_id);
            if in_focused != last_focused {
                return false;
            }
        }

        true
    }
}

#[async_trait]
impl TabRegistry for InMemoryTabRegistry {
    async fn query(&self, query: &TabQuery) -> Result<Vec<Tab>> {
        let state = self.state.read();
        Ok(state
            .tabs
            .values()
            .filter(|tab| Self::matches(&state, tab, query))
            .cloned()
            .collect())
    }

    async fn create(&self, request: CreateTab) -> Result<Tab> {
        let window_id = {
            let mut state = self.state.write();
            match state.focused_window {
                Some(id) => id,
                None => state.add_window(),
            }
        };

        self.open_pending_tab(window_id, &request.url, request.active)
    }
}
