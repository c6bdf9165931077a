//! Seekmark Page-Context Bridge
//!
//! Procedures that run inside the page's own realm, where the video player
//! object lives. The player is only reached through [`PlayerAccessor`], and
//! each procedure is a named, versioned command looked up in a
//! [`CommandRegistry`] instead of an arbitrary injected closure.

mod command;
mod content_script;
mod error;
mod injector;
mod memory;
mod page;
mod seek;

pub use command::{
    CommandId, CommandInvocation, CommandRegistry, CurrentTimeCommand, PageCommand, SeekCommand,
};
pub use content_script::EpisodeContentScript;
pub use error::{BridgeError, PlayerError};
pub use injector::{PageRealmInjector, ScriptInjector};
pub use memory::MemoryPage;
pub use page::{PageContext, PageDocument, PlayerAccessor, PlayerHandle, SessionId};
pub use seek::{
    read_current_time, seek_to, SeekOutcome, AD_MARKER_SELECTOR, AD_SHOWING_REASON,
    VIDEO_MISSING_REASON, VIDEO_SELECTOR,
};

pub type Result<T> = std::result::Result<T, BridgeError>;
