//! Page kept in memory
//!
//! Stands in for a live page where no DOM is available: element presence
//! and player sessions are set directly, and seeks are recorded.

use parking_lot::RwLock;
use std::sync::Arc;

use seekmark_messaging::{EpisodeTime, PossibleEpisodeTime};

use crate::error::PlayerError;
use crate::page::{PageContext, PageDocument, PlayerAccessor, PlayerHandle, SessionId};
use crate::seek::{AD_MARKER_SELECTOR, VIDEO_SELECTOR};

#[derive(Default)]
struct PageState {
    ad_showing: bool,
    video_present: bool,
    sessions: Vec<(SessionId, EpisodeTime)>,
    seek_error: Option<String>,
    seeks: Vec<(SessionId, EpisodeTime)>,
}

/// Cloning shares the same page.
#[derive(Clone, Default)]
pub struct MemoryPage {
    state: Arc<RwLock<PageState>>,
}

impl MemoryPage {
    /// A page that has not loaded its player yet
    pub fn new() -> Self {
        Self::default()
    }

    /// A page with a video element and one session at `time_ms`
    pub fn playing(session_id: &str, time_ms: EpisodeTime) -> Self {
        let page = Self::new();
        page.set_video_present(true);
        page.add_session(session_id, time_ms);
        page
    }

    pub fn context(&self) -> PageContext {
        PageContext::new(Arc::new(self.clone()), Arc::new(self.clone()))
    }

    pub fn set_ad_showing(&self, showing: bool) {
        self.state.write().ad_showing = showing;
    }

    pub fn set_video_present(&self, present: bool) {
        self.state.write().video_present = present;
    }

    pub fn add_session(&self, session_id: &str, time_ms: EpisodeTime) {
        self.state
            .write()
            .sessions
            .push((SessionId::from(session_id), time_ms));
    }

    /// Make every following seek fail with `message`
    pub fn fail_seeks_with(&self, message: &str) {
        self.state.write().seek_error = Some(message.to_string());
    }

    /// Seeks accepted so far, oldest first
    pub fn seeks(&self) -> Vec<(SessionId, EpisodeTime)> {
        self.state.read().seeks.clone()
    }
}

impl PageDocument for MemoryPage {
    fn has_element(&self, selector: &str) -> bool {
        let state = self.state.read();
        match selector {
            AD_MARKER_SELECTOR => state.ad_showing,
            VIDEO_SELECTOR => state.video_present,
            _ => false,
        }
    }
}

impl PlayerAccessor for MemoryPage {
    fn list_sessions(&self) -> Vec<SessionId> {
        self.state
            .read()
            .sessions
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn get_player(&self, session_id: &SessionId) -> Option<PlayerHandle> {
        self.state
            .read()
            .sessions
            .iter()
            .any(|(id, _)| id == session_id)
            .then(|| PlayerHandle::new(session_id.clone()))
    }

    fn seek(&self, player: &PlayerHandle, time_ms: EpisodeTime) -> Result<(), PlayerError> {
        let mut state = self.state.write();
        if let Some(message) = state.seek_error.clone() {
            return Err(PlayerError(message));
        }

        let session = state
            .sessions
            .iter_mut()
            .find(|(id, _)| id == player.session_id())
            .ok_or_else(|| PlayerError(format!("session {} ended", player.session_id())))?;
        session.1 = time_ms;

        state.seeks.push((player.session_id().clone(), time_ms));
        Ok(())
    }

    fn current_time(&self, player: &PlayerHandle) -> PossibleEpisodeTime {
        self.state
            .read()
            .sessions
            .iter()
            .find(|(id, _)| id == player.session_id())
            .map(|(_, time)| *time)
    }
}
