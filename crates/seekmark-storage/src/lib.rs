//! Seekmark Storage Layer
//!
//! SQLite persistence for bookmarks.

mod bookmarks;
mod database;
mod error;
mod migrations;

pub use bookmarks::{BookmarkRecord, BookmarkRepo, NewBookmark};
pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
