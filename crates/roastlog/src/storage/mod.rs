//! Storage layer for roastlog.
//!
//! [`Repository`] is the seam every page-level component takes. [`Storage`]
//! implements it on `SQLite` with JSON record bodies; [`MemoryStore`] is an
//! in-memory fake for tests. Rows that fail to decode are logged and treated
//! as absent.

pub mod memory;
pub mod migrations;
pub mod schema;

pub use memory::MemoryStore;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::{PendingSession, RoastLog, Template};

/// Typed persistence for templates, the pending session and roast logs.
pub trait Repository {
    /// Store a new template.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put_template(&self, template: &Template) -> Result<()>;

    /// Look up a template by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get_template(&self, id: &str) -> Result<Option<Template>>;

    /// All templates, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn list_templates(&self) -> Result<Vec<Template>>;

    /// Replace the pending session.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put_pending_session(&self, session: &PendingSession) -> Result<()>;

    /// The pending session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn pending_session(&self) -> Result<Option<PendingSession>>;

    /// Remove the pending session. Returns `true` if one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn clear_pending_session(&self) -> Result<bool>;

    /// Read and remove the pending session.
    ///
    /// # Errors
    ///
    /// Returns an error if the read or write fails.
    fn take_pending_session(&self) -> Result<Option<PendingSession>> {
        let session = self.pending_session()?;
        if session.is_some() {
            self.clear_pending_session()?;
        }
        Ok(session)
    }

    /// Store a roast log.
    ///
    /// Returns `false` without writing if a log with the same fingerprint
    /// already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put_log(&self, log: &RoastLog) -> Result<bool>;

    /// Look up a roast log by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get_log(&self, id: &str) -> Result<Option<RoastLog>>;

    /// Look up a roast log by content fingerprint.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get_log_by_fingerprint(&self, fingerprint: &str) -> Result<Option<RoastLog>>;

    /// All roast logs, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn list_logs(&self) -> Result<Vec<RoastLog>>;

    /// Delete a roast log. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete_log(&self, id: &str) -> Result<bool>;
}

/// Decode a JSON body, logging and dropping rows that do not parse.
pub(crate) fn decode_body<T: DeserializeOwned>(table: &str, id: &str, body: &str) -> Option<T> {
    match serde_json::from_str(body) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(table, id, error = %e, "Skipping malformed stored record");
            None
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// `SQLite`-backed repository.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn exists_by_fingerprint(&self, fingerprint: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM roast_logs WHERE fingerprint = ?1",
            [fingerprint],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn query_bodies<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn query_body<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Option<(String, String)>> {
        let row = self
            .conn
            .query_row(sql, params, |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;
        Ok(row)
    }

    fn count(&self, table: &str) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_templates = self.count("templates")?;
        let total_logs = self.count("roast_logs")?;
        let has_pending_session = self.count("pending_session")? > 0;

        let newest: Option<String> = self
            .conn
            .query_row(
                "SELECT created_at FROM roast_logs ORDER BY seq DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let newest_log = newest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_templates,
            total_logs,
            has_pending_session,
            newest_log,
            db_size_bytes,
        })
    }
}

impl Repository for Storage {
    fn put_template(&self, template: &Template) -> Result<()> {
        let body = serde_json::to_string(template)?;
        self.conn.execute(
            "INSERT INTO templates (id, name, body, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![template.id, template.name, body, timestamp(template.created_at)],
        )?;
        debug!(id = %template.id, "Inserted template");
        Ok(())
    }

    fn get_template(&self, id: &str) -> Result<Option<Template>> {
        let row = self.query_body("SELECT id, body FROM templates WHERE id = ?1", [id])?;
        Ok(row.and_then(|(id, body)| decode_body("templates", &id, &body)))
    }

    fn list_templates(&self) -> Result<Vec<Template>> {
        let rows = self.query_bodies("SELECT id, body FROM templates ORDER BY seq ASC", [])?;
        Ok(rows
            .into_iter()
            .filter_map(|(id, body)| decode_body("templates", &id, &body))
            .collect())
    }

    fn put_pending_session(&self, session: &PendingSession) -> Result<()> {
        let body = serde_json::to_string(session)?;
        self.conn.execute(
            r"
            INSERT INTO pending_session (slot, body, updated_at) VALUES (1, ?1, datetime('now'))
            ON CONFLICT(slot) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at
            ",
            [body],
        )?;
        debug!(template = %session.template_id, "Stored pending session");
        Ok(())
    }

    fn pending_session(&self) -> Result<Option<PendingSession>> {
        let row = self.query_body(
            "SELECT 'pending', body FROM pending_session WHERE slot = 1",
            [],
        )?;
        Ok(row.and_then(|(id, body)| decode_body("pending_session", &id, &body)))
    }

    fn clear_pending_session(&self) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM pending_session", [])?;
        Ok(affected > 0)
    }

    fn put_log(&self, log: &RoastLog) -> Result<bool> {
        if self.exists_by_fingerprint(&log.fingerprint)? {
            debug!(
                "Skipping duplicate roast log with fingerprint {}",
                &log.fingerprint[..log.fingerprint.len().min(16)]
            );
            return Ok(false);
        }

        let body = serde_json::to_string(log)?;
        self.conn.execute(
            r"
            INSERT INTO roast_logs (id, template_id, fingerprint, body, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                log.id,
                log.session.template_id,
                log.fingerprint,
                body,
                timestamp(log.created_at),
            ],
        )?;
        debug!(id = %log.id, "Inserted roast log");
        Ok(true)
    }

    fn get_log(&self, id: &str) -> Result<Option<RoastLog>> {
        let row = self.query_body("SELECT id, body FROM roast_logs WHERE id = ?1", [id])?;
        Ok(row.and_then(|(id, body)| decode_body("roast_logs", &id, &body)))
    }

    fn get_log_by_fingerprint(&self, fingerprint: &str) -> Result<Option<RoastLog>> {
        let row = self.query_body(
            "SELECT id, body FROM roast_logs WHERE fingerprint = ?1 ORDER BY seq ASC LIMIT 1",
            [fingerprint],
        )?;
        Ok(row.and_then(|(id, body)| decode_body("roast_logs", &id, &body)))
    }

    fn list_logs(&self) -> Result<Vec<RoastLog>> {
        let rows = self.query_bodies("SELECT id, body FROM roast_logs ORDER BY seq ASC", [])?;
        Ok(rows
            .into_iter()
            .filter_map(|(id, body)| decode_body("roast_logs", &id, &body))
            .collect())
    }

    fn delete_log(&self, id: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM roast_logs WHERE id = ?1", [id])?;
        if affected > 0 {
            info!(id, "Deleted roast log");
        }
        Ok(affected > 0)
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of bean templates.
    pub total_templates: i64,
    /// Number of saved roast logs.
    pub total_logs: i64,
    /// Whether a session is waiting to be roasted.
    pub has_pending_session: bool,
    /// When the newest log was saved.
    pub newest_log: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    #[test]
    fn test_open_in_memory() {
        let storage = create_test_storage();
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_template_round_trip() {
        let storage = create_test_storage();
        let template = fixtures::template("Guatemala Antigua");
        storage.put_template(&template).unwrap();

        let back = storage.get_template(&template.id).unwrap().unwrap();
        assert_eq!(back, template);
        assert!(storage.get_template("missing").unwrap().is_none());
    }

    #[test]
    fn test_templates_listed_in_creation_order() {
        let storage = create_test_storage();
        for name in ["A", "B", "C"] {
            storage.put_template(&fixtures::template(name)).unwrap();
        }
        let names: Vec<_> = storage
            .list_templates()
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_pending_session_single_slot() {
        let storage = create_test_storage();
        assert!(storage.pending_session().unwrap().is_none());

        let template = fixtures::template("A");
        let mut session = fixtures::session(&template);
        storage.put_pending_session(&session).unwrap();
        session.charge_grams = 300.0;
        storage.put_pending_session(&session).unwrap();

        assert_eq!(storage.pending_session().unwrap().unwrap().charge_grams, 300.0);
        assert!(storage.stats().unwrap().has_pending_session);
    }

    #[test]
    fn test_take_pending_session_consumes() {
        let storage = create_test_storage();
        let session = fixtures::session(&fixtures::template("A"));
        storage.put_pending_session(&session).unwrap();

        assert_eq!(storage.take_pending_session().unwrap(), Some(session));
        assert!(storage.take_pending_session().unwrap().is_none());
        assert!(!storage.clear_pending_session().unwrap());
    }

    #[test]
    fn test_log_round_trip_keeps_event_order() {
        let storage = create_test_storage();
        let log = fixtures::log(fixtures::session(&fixtures::template("A")));
        assert!(storage.put_log(&log).unwrap());

        let back = storage.get_log(&log.id).unwrap().unwrap();
        assert_eq!(back, log);
        assert_eq!(back.events, log.events);
    }

    #[test]
    fn test_log_deduplicated_by_fingerprint() {
        let storage = create_test_storage();
        let log = fixtures::log(fixtures::session(&fixtures::template("A")));
        let mut again = log.clone();
        again.id = "other".to_string();

        assert!(storage.put_log(&log).unwrap());
        assert!(!storage.put_log(&again).unwrap());
        assert_eq!(storage.list_logs().unwrap().len(), 1);
        assert_eq!(
            storage.get_log_by_fingerprint(&log.fingerprint).unwrap().unwrap().id,
            log.id
        );
    }

    #[test]
    fn test_delete_log() {
        let storage = create_test_storage();
        let log = fixtures::log(fixtures::session(&fixtures::template("A")));
        storage.put_log(&log).unwrap();

        assert!(storage.delete_log(&log.id).unwrap());
        assert!(storage.get_log(&log.id).unwrap().is_none());
        assert!(!storage.delete_log(&log.id).unwrap());
    }

    #[test]
    fn test_malformed_row_skipped() {
        let storage = create_test_storage();
        let log = fixtures::log(fixtures::session(&fixtures::template("A")));
        storage.put_log(&log).unwrap();
        storage
            .conn
            .execute(
                "INSERT INTO roast_logs (id, template_id, fingerprint, body, created_at)
                 VALUES ('bad', 't', 'f', '{not json', '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();

        assert_eq!(storage.list_logs().unwrap().len(), 1);
        assert!(storage.get_log("bad").unwrap().is_none());
    }

    #[test]
    fn test_stats() {
        let storage = create_test_storage();
        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_logs, 0);
        assert!(stats.newest_log.is_none());

        let template = fixtures::template("A");
        storage.put_template(&template).unwrap();
        storage.put_log(&fixtures::log(fixtures::session(&template))).unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_templates, 1);
        assert_eq!(stats.total_logs, 1);
        assert!(stats.newest_log.is_some());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let root = std::env::temp_dir().join(format!("roastlog_test_{}", std::process::id()));
        let nested = root.join("nested/roastlog.db");
        let _ = std::fs::remove_dir_all(&root);

        let storage = Storage::open(&nested).unwrap();
        storage.put_template(&fixtures::template("A")).unwrap();
        assert!(nested.exists());
        assert_eq!(storage.path(), nested);
        assert!(storage.stats().unwrap().db_size_bytes > 0);

        drop(storage);
        let reopened = Storage::open(&nested).unwrap();
        assert_eq!(reopened.list_templates().unwrap().len(), 1);

        drop(reopened);
        let _ = std::fs::remove_dir_all(&root);
    }
}
