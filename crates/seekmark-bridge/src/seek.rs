//! Seeking and reading the player position from inside the page
//!
//! Seeking while an ad plays is overridden by the player, and seeking before
//! the video element exists is dropped. Both are checked first and reported
//! back, so the caller can try something else instead of trusting a seek
//! that never happened.

use seekmark_messaging::{EpisodeTime, PossibleEpisodeTime, ScriptResult};

use crate::page::PageContext;

/// Marker element shown while an ad plays
pub const AD_MARKER_SELECTOR: &str = r#"[data-uia="ads-info-container"]"#;

pub const VIDEO_SELECTOR: &str = "video";

pub const AD_SHOWING_REASON: &str = "ad is showing";
pub const VIDEO_MISSING_REASON: &str = "video is missing";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeekOutcome {
    /// The player accepted the seek
    Seeked,
    AdShowing,
    VideoMissing,
    /// The player API was reached but the seek did not go through
    SeekFailed(String),
}

impl SeekOutcome {
    pub fn reason(&self) -> Option<String> {
        match self {
            SeekOutcome::Seeked => None,
            SeekOutcome::AdShowing => Some(AD_SHOWING_REASON.to_string()),
            SeekOutcome::VideoMissing => Some(VIDEO_MISSING_REASON.to_string()),
            SeekOutcome::SeekFailed(detail) => Some(format!("seek failed: {}", detail)),
        }
    }
}

impl From<SeekOutcome> for ScriptResult {
    fn from(outcome: SeekOutcome) -> Self {
        match outcome.reason() {
            None => ScriptResult::succeeded(),
            Some(reason) => ScriptResult::failed(reason),
        }
    }
}

fn ad_is_showing(page: &PageContext) -> bool {
    page.document.has_element(AD_MARKER_SELECTOR)
}

fn video_is_present(page: &PageContext) -> bool {
    page.document.has_element(VIDEO_SELECTOR)
}

/// Seek the page's first player session to `time_ms`
pub fn seek_to(page: &PageContext, time_ms: EpisodeTime) -> SeekOutcome {
    let outcome = if ad_is_showing(page) {
        SeekOutcome::AdShowing
    } else if !video_is_present(page) {
        SeekOutcome::VideoMissing
    } else {
        seek_first_session(page, time_ms)
    };

    match &outcome {
        SeekOutcome::Seeked => tracing::debug!(time_ms, "Seeked player"),
        other => tracing::warn!(time_ms, reason = ?other.reason(), "Failed to seek"),
    }

    outcome
}

fn seek_first_session(page: &PageContext, time_ms: EpisodeTime) -> SeekOutcome {
    let Some(session_id) = page.player.list_sessions().into_iter().next() else {
        return SeekOutcome::SeekFailed("no player session".to_string());
    };

    let Some(player) = page.player.get_player(&session_id) else {
        return SeekOutcome::SeekFailed(format!("player for session {} is unavailable", session_id));
    };

    match page.player.seek(&player, time_ms) {
        Ok(()) => SeekOutcome::Seeked,
        Err(e) => SeekOutcome::SeekFailed(e.to_string()),
    }
}

/// Current position of the first player session.
///
/// `None` while an ad plays (the player reports the ad's position) or when
/// there is no video or player yet.
pub fn read_current_time(page: &PageContext) -> PossibleEpisodeTime {
    if ad_is_showing(page) || !video_is_present(page) {
        return None;
    }

    let player = page.first_player()?;
    page.player.current_time(&player)
}
