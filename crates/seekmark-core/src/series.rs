//! Series name lookup
//!
//! Episode pages carry their series metadata as a JSON-LD block. The page
//! is requested through our own API host rather than the streaming site, so
//! the episode path is grafted onto the configured API URL.

use async_trait::async_trait;
use reqwest::redirect::Policy;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::SeriesError;

const LD_JSON_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

pub type PossibleSeriesName = Option<String>;

/// Fetches a page body
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, SeriesError>;
}

/// [`HtmlFetcher`] over HTTP
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self, SeriesError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::limited(5))
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Seekmark)")
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HtmlFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, SeriesError> {
        let resp = self.client.get(url.clone()).send().await?;

        if !resp.status().is_success() {
            return Err(SeriesError::Status(resp.status().as_u16()));
        }

        Ok(resp.text().await?)
    }
}

/// URL on the API host serving the page at `episode_url`.
///
/// The API URL's own path is kept as a prefix and a trailing slash on it is
/// ignored.
pub fn series_request_url(api_url: &Url, episode_url: &str) -> Result<Url, SeriesError> {
    let episode = Url::parse(episode_url)?;

    let mut request = api_url.clone();
    let prefix = api_url.path().trim_end_matches('/');
    request.set_path(&format!("{}{}", prefix, episode.path()));
    request.set_query(None);
    request.set_fragment(None);

    Ok(request)
}

#[derive(Debug, Deserialize)]
struct SeriesMetadata {
    name: Option<String>,
}

/// Series name from the first JSON-LD block of `html`
pub fn parse_series_name(html: &str) -> Result<String, SeriesError> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse(LD_JSON_SELECTOR).map_err(|_| SeriesError::MetadataMissing)?;

    let block = doc.select(&sel).next().ok_or(SeriesError::MetadataMissing)?;
    let json = block.text().collect::<String>();

    let metadata: SeriesMetadata = serde_json::from_str(json.trim())?;
    metadata
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or(SeriesError::MetadataMissing)
}

pub struct SeriesInfoService {
    fetcher: Arc<dyn HtmlFetcher>,
    api_url: Url,
}

impl SeriesInfoService {
    pub fn new(fetcher: Arc<dyn HtmlFetcher>, api_url: Url) -> Self {
        Self { fetcher, api_url }
    }

    pub async fn get_series_name(&self, episode_url: &str) -> Result<String, SeriesError> {
        let url = series_request_url(&self.api_url, episode_url)?;

        tracing::debug!(url = %url, "Requesting series metadata");

        let html = self.fetcher.fetch(&url).await?;
        parse_series_name(&html)
    }

    /// Like [`Self::get_series_name`], but a failed lookup is logged and yields `None`
    pub async fn find_series_name(&self, episode_url: &str) -> PossibleSeriesName {
        match self.get_series_name(episode_url).await {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::warn!(episode_url = %episode_url, error = %e, "Series name lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    const EPISODE_NAME: &str = "Demon Slayer: Kimetsu no Yaiba";
    const EPISODE_URL: &str = "http://netflix.com/watch/81091396";

    struct StaticFetcher {
        body: Option<String>,
        requested: Mutex<Vec<Url>>,
    }

    impl StaticFetcher {
        fn serving(body: &str) -> Arc<Self> {
            Arc::new(Self {
                body: Some(body.to_string()),
                requested: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                body: None,
                requested: Mutex::new(Vec::new()),
            })
        }

        fn last_requested(&self) -> String {
            self.requested.lock().last().unwrap().to_string()
        }
    }

    #[async_trait]
    impl HtmlFetcher for StaticFetcher {
        async fn fetch(&self, url: &Url) -> Result<String, SeriesError> {
            self.requested.lock().push(url.clone());
            self.body.clone().ok_or(SeriesError::Status(502))
        }
    }

    fn page() -> String {
        format!(
            r#"<html><head>
            <script type="application/ld+json">
            {{"name": "{EPISODE_NAME}"}}
            </script>
            </head><body></body></html>"#
        )
    }

    fn service(fetcher: Arc<StaticFetcher>, api_url: &str) -> SeriesInfoService {
        SeriesInfoService::new(fetcher, Url::parse(api_url).unwrap())
    }

    #[tokio::test]
    async fn test_returns_series_name() {
        let fetcher = StaticFetcher::serving(&page());
        let service = service(fetcher, "http://localhost:5000");
        assert_eq!(service.get_series_name(EPISODE_URL).await.unwrap(), EPISODE_NAME);
    }

    #[tokio::test]
    async fn test_requests_api_host() {
        let fetcher = StaticFetcher::serving(&page());
        service(fetcher.clone(), "http://localhost:5000")
            .get_series_name(EPISODE_URL)
            .await
            .unwrap();
        assert_eq!(fetcher.last_requested(), "http://localhost:5000/watch/81091396");
    }

    #[test]
    fn test_request_url_ignores_trailing_slash() {
        let api = Url::parse("http://localhost:5000/").unwrap();
        assert_eq!(
            series_request_url(&api, EPISODE_URL).unwrap().as_str(),
            "http://localhost:5000/watch/81091396"
        );
    }

    #[test]
    fn test_request_url_keeps_api_path() {
        let api = Url::parse("http://localhost:5000/api").unwrap();
        assert_eq!(
            series_request_url(&api, EPISODE_URL).unwrap().as_str(),
            "http://localhost:5000/api/watch/81091396"
        );

        let api = Url::parse("http://localhost:5000/api/").unwrap();
        assert_eq!(
            series_request_url(&api, "https://www.netflix.com/watch/1?trackId=2").unwrap().as_str(),
            "http://localhost:5000/api/watch/1"
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_series_name("<html><body>nothing</body></html>"),
            Err(SeriesError::MetadataMissing)
        ));
        assert!(matches!(
            parse_series_name(r#"<script type="application/ld+json">{not json</script>"#),
            Err(SeriesError::MetadataJson(_))
        ));
        assert!(matches!(
            parse_series_name(r#"<script type="application/ld+json">{"@type": "TVSeries"}</script>"#),
            Err(SeriesError::MetadataMissing)
        ));
    }

    #[tokio::test]
    async fn test_find_series_name_swallows_failures() {
        let svc = service(StaticFetcher::failing(), "http://localhost:5000");
        assert_eq!(svc.find_series_name(EPISODE_URL).await, None);

        let svc = service(StaticFetcher::serving(&page()), "http://localhost:5000");
        assert_eq!(svc.find_series_name("not a url").await, None);
        assert_eq!(
            svc.find_series_name(EPISODE_URL).await.as_deref(),
            Some(EPISODE_NAME)
        );
    }
}
