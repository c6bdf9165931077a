//! Bookmark orchestration
//!
//! Creating a bookmark reads the playing episode's position and stores it;
//! opening one brings the episode back into a tab and seeks to the stored
//! position.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use seekmark_messaging::ScriptResult;
use seekmark_storage::{BookmarkRecord, BookmarkRepo, NewBookmark};
use seekmark_tabs::{CreateTab, TabRegistry};

use crate::config::Config;
use crate::episode::{EpisodeCoordinator, EpisodeTabAndTime};
use crate::error::CoreError;
use crate::series::SeriesInfoService;
use crate::Result;

/// Field filter for [`BookmarkService::find`]. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkFilter {
    pub id: Option<String>,
    pub episode_url: Option<String>,
    pub series_name: Option<String>,
    pub name: Option<String>,
}

impl BookmarkFilter {
    pub fn by_episode_url(url: impl Into<String>) -> Self {
        Self {
            episode_url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn by_series_name(series_name: impl Into<String>) -> Self {
        Self {
            series_name: Some(series_name.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, bookmark: &BookmarkRecord) -> bool {
        fn field_matches(wanted: &Option<String>, actual: &str) -> bool {
            wanted.as_deref().map(|w| w == actual).unwrap_or(true)
        }

        field_matches(&self.id, &bookmark.id)
            && field_matches(&self.episode_url, &bookmark.episode_url)
            && field_matches(&self.name, &bookmark.name)
            && self
                .series_name
                .as_deref()
                .map(|w| bookmark.series_name.as_deref() == Some(w))
                .unwrap_or(true)
    }
}

/// How long [`BookmarkService::open`] keeps trying to seek a tab that is
/// still loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePolicy {
    /// Total attempts, at least one is always made
    pub attempts: u32,
    pub interval: Duration,
}

impl ResumePolicy {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// Try once, never wait
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.resume_attempts, config.resume_retry_interval())
    }
}

pub struct BookmarkService {
    episodes: Arc<EpisodeCoordinator>,
    tabs: Arc<dyn TabRegistry>,
    series: Arc<SeriesInfoService>,
    repo: BookmarkRepo,
    policy: ResumePolicy,
}

impl BookmarkService {
    pub fn new(
        episodes: Arc<EpisodeCoordinator>,
        tabs: Arc<dyn TabRegistry>,
        series: Arc<SeriesInfoService>,
        repo: BookmarkRepo,
        policy: ResumePolicy,
    ) -> Self {
        Self {
            episodes,
            tabs,
            series,
            repo,
            policy,
        }
    }

    /// Bookmark the episode playing in the focused window
    pub async fn create(&self, name: &str) -> Result<BookmarkRecord> {
        let EpisodeTabAndTime { tab, time } = self.episodes.get_current_time().await?;
        let episode_url = tab.url.ok_or(CoreError::MissingTabUrl)?;

        let series_name = self.series.find_series_name(&episode_url).await;

        let record = self.repo.create(NewBookmark {
            episode_url,
            time_ms: time,
            series_name,
            name: name.to_string(),
        })?;

        Ok(record)
    }

    pub fn find(&self, filter: &BookmarkFilter) -> Result<Vec<BookmarkRecord>> {
        let bookmarks = match &filter.episode_url {
            Some(url) => self.repo.list_by_episode_url(url)?,
            None => self.repo.list()?,
        };

        Ok(bookmarks.into_iter().filter(|b| filter.matches(b)).collect())
    }

    pub fn get(&self, id: &str) -> Result<BookmarkRecord> {
        self.repo
            .get(id)?
            .ok_or_else(|| CoreError::BookmarkNotFound(id.to_string()))
    }

    pub fn destroy(&self, id: &str) -> Result<()> {
        if !self.repo.delete(id)? {
            return Err(CoreError::BookmarkNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Show the bookmarked episode and seek it to the bookmarked time.
    ///
    /// An active tab already at the bookmark's URL is reused; otherwise a new
    /// tab is requested. Seeking is retried under the resume policy while the
    /// tab is loading or the page refuses the seek. The last outcome is
    /// returned.
    pub async fn open(&self, id: &str) -> Result<ScriptResult> {
        let bookmark = self.get(id)?;

        let existing = self
            .episodes
            .find_one_episode_tab_by_url(&bookmark.episode_url)
            .await?;

        match existing {
            Some(tab) => {
                tracing::debug!(tab_id = ?tab.id, bookmark_id = %bookmark.id, "Reusing open episode tab");
            }
            None => {
                let tab = self
                    .tabs
                    .create(CreateTab {
                        url: bookmark.episode_url.clone(),
                        active: true,
                    })
                    .await?;
                tracing::info!(tab_id = ?tab.id, bookmark_id = %bookmark.id, "Opened tab for bookmark");
            }
        }

        self.resume(&bookmark).await
    }

    async fn resume(&self, bookmark: &BookmarkRecord) -> Result<ScriptResult> {
        let attempts = self.policy.attempts.max(1);
        let mut attempt = 1;

        loop {
            let outcome = self.episodes.set_time(bookmark.time_ms).await;

            let retryable = match &outcome {
                Ok(result) => !result.success,
                Err(e) => e.is_transient(),
            };

            if !retryable || attempt >= attempts {
                if retryable {
                    tracing::warn!(
                        bookmark_id = %bookmark.id,
                        attempts,
                        "Giving up on resuming bookmark"
                    );
                }
                return Ok(outcome?);
            }

            tracing::debug!(
                bookmark_id = %bookmark.id,
                attempt,
                outcome = ?outcome,
                "Resume attempt did not succeed, retrying"
            );

            attempt += 1;
            tokio::time::sleep(self.policy.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use seekmark_bridge::{
        CommandRegistry, EpisodeContentScript, MemoryPage, PageRealmInjector, SessionId,
    };
    use seekmark_messaging::{MessageChannel, MessageRouter};
    use seekmark_storage::Database;
    use seekmark_tabs::{InMemoryTabRegistry, Tab, TabId, TabQuery, WindowId};
    use url::Url;

    use crate::error::{EpisodeError, SeriesError};
    use crate::series::HtmlFetcher;

    const EPISODE_URL: &str = "http://netflix.com/watch/81091396";

    struct StaticFetcher(Option<String>);

    #[async_trait]
    impl HtmlFetcher for StaticFetcher {
        async fn fetch(&self, _url: &Url) -> std::result::Result<String, SeriesError> {
            self.0.clone().ok_or(SeriesError::Status(404))
        }
    }

    fn series(name: Option<&str>) -> Arc<SeriesInfoService> {
        let body = name.map(|n| {
            format!(r#"<script type="application/ld+json">{{"name": "{n}"}}</script>"#)
        });
        Arc::new(SeriesInfoService::new(
            Arc::new(StaticFetcher(body)),
            Url::parse("http://localhost:5000").unwrap(),
        ))
    }

    /// Browser host: tabs, content scripts and page realms in one process
    #[derive(Clone)]
    struct Host {
        tabs: InMemoryTabRegistry,
        router: MessageRouter,
        injector: PageRealmInjector,
        pages: Arc<Mutex<Vec<(TabId, MemoryPage)>>>,
    }

    impl Host {
        fn new() -> Self {
            let tabs = InMemoryTabRegistry::new();
            tabs.open_window();
            Self {
                tabs,
                router: MessageRouter::new(),
                injector: PageRealmInjector::new(Arc::new(CommandRegistry::with_builtin_commands())),
                pages: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Commit the tab's navigation and start its content script
        fn finish_loading(&self, tab_id: TabId, page: MemoryPage) {
            self.tabs.commit_navigation(tab_id).unwrap();
            self.injector.attach(tab_id, page.context());
            let port = self.router.connect(tab_id);
            let script = EpisodeContentScript::new(tab_id, Arc::new(self.injector.clone()));
            tokio::spawn(port.serve(Arc::new(script)));
            self.pages.lock().push((tab_id, page));
        }

        fn open_episode(&self, url: &str, page: MemoryPage) -> TabId {
            let window = WindowId(1);
            let tab = self.tabs.open_pending_tab(window, url, true).unwrap();
            let tab_id = tab.id.unwrap();
            self.finish_loading(tab_id, page);
            tab_id
        }

        fn page_of(&self, tab_id: TabId) -> Option<MemoryPage> {
            self.pages
                .lock()
                .iter()
                .find(|(id, _)| *id == tab_id)
                .map(|(_, page)| page.clone())
        }
    }

    /// Registry whose new tabs finish loading after `delay`
    struct SlowLoadingRegistry {
        host: Host,
        delay: Duration,
    }

    #[async_trait]
    impl TabRegistry for SlowLoadingRegistry {
        async fn query(&self, query: &TabQuery) -> seekmark_tabs::Result<Vec<Tab>> {
            self.host.tabs.query(query).await
        }

        async fn create(&self, request: CreateTab) -> seekmark_tabs::Result<Tab> {
            let tab = self.host.tabs.create(request).await?;
            if let Some(tab_id) = tab.id {
                let host = self.host.clone();
                let delay = self.delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    host.finish_loading(tab_id, MemoryPage::playing("session-1", 0));
                });
            }
            Ok(tab)
        }
    }

    fn service(host: &Host, policy: ResumePolicy, series_name: Option<&str>) -> BookmarkService {
        let registry: Arc<dyn TabRegistry> = Arc::new(SlowLoadingRegistry {
            host: host.clone(),
            delay: Duration::from_millis(30),
        });
        let channel: Arc<dyn MessageChannel> = Arc::new(host.router.clone());

        BookmarkService::new(
            Arc::new(EpisodeCoordinator::new(registry.clone(), channel)),
            registry,
            series(series_name),
            BookmarkRepo::new(Database::open_in_memory().unwrap()),
            policy,
        )
    }

    fn patient() -> ResumePolicy {
        ResumePolicy::new(50, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_create_stores_episode_position() {
        let host = Host::new();
        host.open_episode(EPISODE_URL, MemoryPage::playing("session-1", 754_000));
        let service = service(&host, patient(), Some("Demon Slayer: Kimetsu no Yaiba"));

        let bookmark = service.create("Good part").await.unwrap();
        assert_eq!(bookmark.episode_url, EPISODE_URL);
        assert_eq!(bookmark.time_ms, 754_000);
        assert_eq!(
            bookmark.series_name.as_deref(),
            Some("Demon Slayer: Kimetsu no Yaiba")
        );
        assert_eq!(service.get(&bookmark.id).unwrap(), bookmark);
    }

    #[tokio::test]
    async fn test_create_without_series_name() {
        let host = Host::new();
        host.open_episode(EPISODE_URL, MemoryPage::playing("session-1", 10));
        let service = service(&host, patient(), None);

        let bookmark = service.create("Intro").await.unwrap();
        assert_eq!(bookmark.series_name, None);
    }

    #[tokio::test]
    async fn test_create_without_episode_tab() {
        let host = Host::new();
        host.tabs
            .open_tab(WindowId(1), "https://not-an-episode-tab.com", true)
            .unwrap();
        let service = service(&host, patient(), None);

        assert!(matches!(
            service.create("Nothing").await,
            Err(CoreError::Episode(EpisodeError::NoEpisodeTab))
        ));
        assert!(service.find(&BookmarkFilter::default()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_get_and_destroy() {
        let host = Host::new();
        host.open_episode(EPISODE_URL, MemoryPage::playing("session-1", 1000));
        let service = service(&host, patient(), Some("Dark"));

        let first = service.create("First").await.unwrap();
        let second = service.create("Second").await.unwrap();

        assert_eq!(service.find(&BookmarkFilter::default()).unwrap().len(), 2);
        assert_eq!(
            service.find(&BookmarkFilter::by_episode_url(EPISODE_URL)).unwrap().len(),
            2
        );
        assert_eq!(service.find(&BookmarkFilter::by_series_name("Dark")).unwrap().len(), 2);
        assert!(service
            .find(&BookmarkFilter::by_series_name("Other"))
            .unwrap()
            .is_empty());

        let by_name = BookmarkFilter {
            name: Some("Second".to_string()),
            ..BookmarkFilter::default()
        };
        assert_eq!(service.find(&by_name).unwrap(), vec![second.clone()]);

        service.destroy(&first.id).unwrap();
        assert!(matches!(
            service.get(&first.id),
            Err(CoreError::BookmarkNotFound(_))
        ));
        assert!(matches!(
            service.destroy(&first.id),
            Err(CoreError::BookmarkNotFound(_))
        ));
        assert_eq!(service.find(&BookmarkFilter::default()).unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn test_open_reuses_tab_at_bookmark_url() {
        let host = Host::new();
        let tab_id = host.open_episode(EPISODE_URL, MemoryPage::playing("session-1", 42_000));
        let service = service(&host, patient(), None);
        let bookmark = service.create("Here").await.unwrap();

        let result = service.open(&bookmark.id).await.unwrap();
        assert_eq!(result, ScriptResult::succeeded());

        let all_tabs = host.tabs.query(&TabQuery::default()).await.unwrap();
        assert_eq!(all_tabs.len(), 1);
        assert_eq!(
            host.page_of(tab_id).unwrap().seeks(),
            vec![(SessionId::from("session-1"), 42_000)]
        );
    }

    #[tokio::test]
    async fn test_open_waits_for_new_tab_to_load() {
        let host = Host::new();
        let first_tab = host.open_episode(EPISODE_URL, MemoryPage::playing("session-1", 90_000));
        let service = service(&host, patient(), None);
        let bookmark = service.create("Later").await.unwrap();

        host.tabs.close_tab(first_tab).unwrap();

        let result = service.open(&bookmark.id).await.unwrap();
        assert_eq!(result, ScriptResult::succeeded());

        let tabs = host.tabs.query(&TabQuery::active_in_focused_window()).await.unwrap();
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].url.as_deref(), Some(EPISODE_URL));

        let page = host.page_of(tabs[0].id.unwrap()).unwrap();
        assert_eq!(page.seeks(), vec![(SessionId::from("session-1"), 90_000)]);
    }

    #[tokio::test]
    async fn test_open_gives_up_after_policy_attempts() {
        let host = Host::new();
        let tab_id = host.open_episode(EPISODE_URL, MemoryPage::playing("session-1", 5));
        let service = service(&host, ResumePolicy::new(3, Duration::from_millis(1)), None);
        let bookmark = service.create("Ad break").await.unwrap();

        host.page_of(tab_id).unwrap().set_ad_showing(true);

        let result = service.open(&bookmark.id).await.unwrap();
        assert_eq!(result, ScriptResult::failed("ad is showing"));
        assert!(host.page_of(tab_id).unwrap().seeks().is_empty());
    }

    #[tokio::test]
    async fn test_open_reports_last_error() {
        let host = Host::new();
        let tab_id = host.open_episode(EPISODE_URL, MemoryPage::playing("session-1", 5));
        let service = service(&host, ResumePolicy::once(), None);
        let bookmark = service.create("Gone").await.unwrap();

        host.router.disconnect(tab_id);

        assert!(matches!(
            service.open(&bookmark.id).await,
            Err(CoreError::Episode(EpisodeError::NoReceiver(id))) if id == tab_id
        ));
    }

    #[tokio::test]
    async fn test_open_unknown_bookmark() {
        let host = Host::new();
        let service = service(&host, patient(), None);
        assert!(matches!(
            service.open("missing").await,
            Err(CoreError::BookmarkNotFound(_))
        ));
    }
}
