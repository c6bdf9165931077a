//! Application state
use seekmark_core::{
    BookmarkRepo, BookmarkService, Config, Database, EpisodeCoordinator, MessageChannel,
    ReqwestFetcher, ResumePolicy, Result, SeriesInfoService, TabRegistry, TimeoutChannel,
};
use std::sync::Arc;
use std::time::Duration;

use crate::host::SimulatedHost;

const TAB_LOAD_DELAY: Duration = Duration::from_millis(300);

pub struct AppState {
    host: SimulatedHost,
    bookmarks: BookmarkService,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::open(&config.database_path)?;

        let host = SimulatedHost::new(TAB_LOAD_DELAY);
        let registry: Arc<dyn TabRegistry> = Arc::new(host.clone());
        let channel: Arc<dyn MessageChannel> = Arc::new(TimeoutChannel::new(
            host.router().clone(),
            config.message_timeout(),
        ));

        let fetcher = ReqwestFetcher::new(config.series_timeout())?;
        let series = SeriesInfoService::new(Arc::new(fetcher), config.series_api_url()?);

        let bookmarks = BookmarkService::new(
            Arc::new(EpisodeCoordinator::new(registry.clone(), channel)),
            registry,
            Arc::new(series),
            BookmarkRepo::new(db),
            ResumePolicy::from_config(config),
        );

        tracing::info!(database = %config.database_path.display(), "Seekmark initialized");

        Ok(Self { host, bookmarks })
    }

    pub fn host(&self) -> &SimulatedHost {
        &self.host
    }

    pub fn bookmarks(&self) -> &BookmarkService {
        &self.bookmarks
    }
}
