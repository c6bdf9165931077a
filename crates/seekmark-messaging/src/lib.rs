//! Seekmark Messaging
//!
//! Requests sent from the extension side to the content script of one tab,
//! and the responses that come back. Payloads cross the boundary as plain
//! JSON data.

mod channel;
mod error;
mod message;
mod router;

pub use channel::{MessageChannel, TimeoutChannel, DEFAULT_MESSAGE_TIMEOUT};
pub use error::MessagingError;
pub use message::{
    episode_time_from_response, EpisodeTime, Message, PossibleEpisodeTime, ScriptResult,
};
pub use router::{ContentPort, IncomingMessage, MessageListener, MessageRouter};

pub type Result<T> = std::result::Result<T, MessagingError>;
