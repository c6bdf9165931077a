//! Script injection into a tab's page realm

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use seekmark_tabs::TabId;

use crate::command::{CommandInvocation, CommandRegistry};
use crate::error::BridgeError;
use crate::page::PageContext;
use crate::Result;

/// Runs a page command inside the page realm of `tab_id`
#[async_trait]
pub trait ScriptInjector: Send + Sync {
    async fn execute(&self, tab_id: TabId, invocation: &CommandInvocation) -> Result<Value>;
}

/// Injector for pages whose realm lives in this process
#[derive(Clone)]
pub struct PageRealmInjector {
    registry: Arc<CommandRegistry>,
    pages: Arc<RwLock<HashMap<TabId, PageContext>>>,
}

impl PageRealmInjector {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            registry,
            pages: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Make `page` the realm of `tab_id`
    pub fn attach(&self, tab_id: TabId, page: PageContext) {
        self.pages.write().insert(tab_id, page);
    }

    pub fn detach(&self, tab_id: TabId) -> bool {
        self.pages.write().remove(&tab_id).is_some()
    }
}

#[async_trait]
impl ScriptInjector for PageRealmInjector {
    async fn execute(&self, tab_id: TabId, invocation: &CommandInvocation) -> Result<Value> {
        let page = self
            .pages
            .read()
            .get(&tab_id)
            .cloned()
            .ok_or(BridgeError::NoPageContext(tab_id))?;

        tracing::debug!(
            tab_id = %tab_id,
            command = %invocation.name,
            version = invocation.version,
            "Injecting page command"
        );

        self.registry.dispatch(&page, invocation)
    }
}
