//! Bookmark records
//!
//! Ids are assigned on insert. Timestamps are stored as fixed-width RFC 3339
//! text so that ordering by `created_at` is chronological.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::Database;
use crate::error::StorageError;
use crate::Result;

/// Fields supplied when creating a bookmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookmark {
    pub episode_url: String,
    pub time_ms: u64,
    pub series_name: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRecord {
    pub id: String,
    pub episode_url: String,
    pub time_ms: u64,
    pub series_name: Option<String>,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "SELECT id, episode_url, time_ms, series_name, name, created_at FROM bookmarks";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<BookmarkRecord> {
    let raw_time: i64 = row.get(2)?;
    let time_ms = u64::try_from(raw_time).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Integer, Box::new(e))
    })?;

    let created_str: String = row.get(5)?;
    let created_at = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(BookmarkRecord {
        id: row.get(0)?,
        episode_url: row.get(1)?,
        time_ms,
        series_name: row.get(3)?,
        name: row.get(4)?,
        created_at,
    })
}

/// Bookmark persistence
#[derive(Clone)]
pub struct BookmarkRepo {
    db: Database,
}

impl BookmarkRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(&self, fields: NewBookmark) -> Result<BookmarkRecord> {
        let stored_time = i64::try_from(fields.time_ms).map_err(|e| StorageError::InvalidValue {
            column: "time_ms",
            message: e.to_string(),
        })?;

        let record = BookmarkRecord {
            id: Uuid::new_v4().to_string(),
            episode_url: fields.episode_url,
            time_ms: fields.time_ms,
            series_name: fields.series_name,
            name: fields.name,
            created_at: Utc::now(),
        };

        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO bookmarks (id, episode_url, time_ms, series_name, name, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    record.id,
                    record.episode_url,
                    stored_time,
                    record.series_name,
                    record.name,
                    record.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                ],
            )?;
            Ok(())
        })?;

        tracing::info!(
            bookmark_id = %record.id,
            episode_url = %record.episode_url,
            time_ms = record.time_ms,
            "Created bookmark"
        );

        Ok(record)
    }

    /// All bookmarks, oldest first
    pub fn list(&self) -> Result<Vec<BookmarkRecord>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY created_at, id"))?;
            let records = stmt
                .query_map([], record_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
    }

    pub fn list_by_episode_url(&self, episode_url: &str) -> Result<Vec<BookmarkRecord>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE episode_url = ?1 ORDER BY created_at, id"
            ))?;
            let records = stmt
                .query_map([episode_url], record_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
    }

    pub fn get(&self, id: &str) -> Result<Option<BookmarkRecord>> {
        self.db.with_connection(|conn| {
            let record = conn
                .query_row(
                    &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                    [id],
                    record_from_row,
                )
                .optional()?;
            Ok(record)
        })
    }

    /// Returns false when no bookmark had that id
    pub fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.db.with_connection(|conn| {
            Ok(conn.execute("DELETE FROM bookmarks WHERE id = ?1", [id])?)
        })?;

        if removed > 0 {
            tracing::info!(bookmark_id = %id, "Deleted bookmark");
        }

        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> BookmarkRepo {
        BookmarkRepo::new(Database::open_in_memory().unwrap())
    }

    fn fields(url: &str, time_ms: u64) -> NewBookmark {
        NewBookmark {
            episode_url: url.to_string(),
            time_ms,
            series_name: Some("Demon Slayer: Kimetsu no Yaiba".to_string()),
            name: "Good part".to_string(),
        }
    }

    #[test]
    fn test_create_and_get() {
        let repo = repo();
        let created = repo
            .create(fields("http://netflix.com/watch/81091396", 5000))
            .unwrap();

        let fetched = repo.get(&created.id).unwrap().unwrap();
        assert_eq!(fetched.episode_url, "http://netflix.com/watch/81091396");
        assert_eq!(fetched.time_ms, 5000);
        assert_eq!(fetched.series_name.as_deref(), Some("Demon Slayer: Kimetsu no Yaiba"));
        assert_eq!(fetched.name, "Good part");
        assert!(repo.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_and_filter_by_url() {
        let repo = repo();
        repo.create(fields("http://netflix.com/watch/1", 1)).unwrap();
        repo.create(fields("http://netflix.com/watch/2", 2)).unwrap();
        repo.create(fields("http://netflix.com/watch/1", 3)).unwrap();

        assert_eq!(repo.list().unwrap().len(), 3);

        let for_first = repo.list_by_episode_url("http://netflix.com/watch/1").unwrap();
        assert_eq!(for_first.len(), 2);
        assert!(for_first.iter().all(|b| b.episode_url == "http://netflix.com/watch/1"));
    }

    #[test]
    fn test_delete() {
        let repo = repo();
        let created = repo.create(fields("http://netflix.com/watch/1", 1)).unwrap();

        assert!(repo.delete(&created.id).unwrap());
        assert!(!repo.delete(&created.id).unwrap());
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_time_beyond_sqlite_integer_rejected() {
        let repo = repo();
        let result = repo.create(fields("http://netflix.com/watch/1", u64::MAX));
        assert!(matches!(
            result,
            Err(StorageError::InvalidValue { column: "time_ms", .. })
        ));
    }
}
