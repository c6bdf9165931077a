//! Seekmark Core
//!
//! Coordinates the episode tab, its content script and bookmark storage so a
//! playback position can be saved and resumed later.

mod bookmarks;
mod config;
mod episode;
mod error;
mod series;

pub use bookmarks::{BookmarkFilter, BookmarkService, ResumePolicy};
pub use config::Config;
pub use episode::{EpisodeCoordinator, EpisodeResult, EpisodeTabAndTime};
pub use error::{CoreError, EpisodeError, SeriesError};
pub use series::{
    parse_series_name, series_request_url, HtmlFetcher, PossibleSeriesName, ReqwestFetcher,
    SeriesInfoService,
};

// Re-export the collaborating crates
pub use seekmark_bridge::{
    CommandRegistry, EpisodeContentScript, MemoryPage, PageContext, PageRealmInjector,
    ScriptInjector,
};
pub use seekmark_messaging::{
    EpisodeTime, Message, MessageChannel, MessageRouter, MessagingError, PossibleEpisodeTime,
    ScriptResult, TimeoutChannel,
};
pub use seekmark_storage::{BookmarkRecord, BookmarkRepo, Database, StorageError};
pub use seekmark_tabs::{
    CreateTab, InMemoryTabRegistry, Tab, TabError, TabId, TabQuery, TabRegistry, WindowId,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
