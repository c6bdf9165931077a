//! Browser host simulated in process
//!
//! Stands in for the browser: it owns the tabs, runs one content script per
//! loaded episode tab and keeps each tab's page realm. Tabs requested through
//! [`TabRegistry::create`] finish loading after `load_delay`, like a real
//! navigation would.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use seekmark_core::{
    CommandRegistry, CreateTab, EpisodeContentScript, EpisodeTime, InMemoryTabRegistry,
    MemoryPage, MessageRouter, PageRealmInjector, Tab, TabError, TabId, TabQuery, TabRegistry,
    WindowId,
};

#[derive(Clone)]
pub struct SimulatedHost {
    tabs: InMemoryTabRegistry,
    router: MessageRouter,
    injector: PageRealmInjector,
    window: WindowId,
    load_delay: Duration,
}

impl SimulatedHost {
    pub fn new(load_delay: Duration) -> Self {
        let tabs = InMemoryTabRegistry::new();
        let window = tabs.open_window();

        Self {
            tabs,
            router: MessageRouter::new(),
            injector: PageRealmInjector::new(Arc::new(CommandRegistry::with_builtin_commands())),
            window,
            load_delay,
        }
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    /// Open a tab at `url` that is already playing at `time_ms`
    pub fn open_playing_tab(&self, url: &str, time_ms: EpisodeTime) -> Result<TabId, TabError> {
        let tab = self.tabs.open_pending_tab(self.window, url, true)?;
        let tab_id = tab.id.ok_or_else(|| TabError::InvalidUrl(url.to_string()))?;
        self.finish_loading(tab_id, MemoryPage::playing("session-1", time_ms))?;
        Ok(tab_id)
    }

    pub fn close_tab(&self, tab_id: TabId) -> Result<(), TabError> {
        self.router.disconnect(tab_id);
        self.injector.detach(tab_id);
        self.tabs.close_tab(tab_id)
    }

    fn finish_loading(&self, tab_id: TabId, page: MemoryPage) -> Result<(), TabError> {
        self.tabs.commit_navigation(tab_id)?;
        self.injector.attach(tab_id, page.context());

        let port = self.router.connect(tab_id);
        let script = EpisodeContentScript::new(tab_id, Arc::new(self.injector.clone()));
        tokio::spawn(port.serve(Arc::new(script)));

        tracing::debug!(tab_id = %tab_id, "Tab finished loading");

        Ok(())
    }
}

#[async_trait]
impl TabRegistry for SimulatedHost {
    async fn query(&self, query: &TabQuery) -> Result<Vec<Tab>, TabError> {
        self.tabs.query(query).await
    }

    async fn create(&self, request: CreateTab) -> Result<Tab, TabError> {
        let tab = self.tabs.create(request).await?;

        if let Some(tab_id) = tab.id {
            let host = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(host.load_delay).await;
                if let Err(e) = host.finish_loading(tab_id, MemoryPage::playing("session-1", 0)) {
                    tracing::warn!(tab_id = %tab_id, error = %e, "Tab failed to load");
                }
            });
        }

        Ok(tab)
    }
}
