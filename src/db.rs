//! Database module for the support relay
//!
//! Durable per-user conversation log backed by `SQLite`.

mod schema;

pub use schema::*;

use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Conversation for {owner_id} changed concurrently: expected {expected} stored messages, found {found}")]
    Conflict {
        owner_id: String,
        expected: i64,
        found: i64,
    },
    #[error("Database connection lock poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Conversation Operations ====================

    /// Load the conversation owned by `owner_id`, if one has been saved
    pub fn find_by_owner(&self, owner_id: &str) -> DbResult<Option<Conversation>> {
        let conn = self.lock()?;

        let header: Option<(String, String)> = conn
            .query_row(
                "SELECT created_at, updated_at FROM conversations WHERE owner_id = ?1",
                params![owner_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((created_at, updated_at)) = header else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT role, content, created_at
             FROM messages WHERE owner_id = ?1 ORDER BY sequence_id ASC",
        )?;
        let messages = stmt
            .query_map(params![owner_id], parse_message_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Conversation::from_storage(
            owner_id.to_string(),
            messages,
            parse_datetime(&created_at),
            parse_datetime(&updated_at),
        )))
    }

    /// Persist every message appended since the conversation was loaded.
    ///
    /// All new rows and the conversation header are written in a single
    /// transaction. Fails with [`DbError::Conflict`] if another writer has
    /// appended to the same conversation in the meantime.
    pub fn save(&self, conversation: &mut Conversation) -> DbResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let found: i64 = tx.query_row(
            "SELECT COUNT(*) FROM messages WHERE owner_id = ?1",
            params![conversation.owner_id],
            |row| row.get(0),
        )?;
        let expected = i64::try_from(conversation.persisted_len()).unwrap_or(i64::MAX);
        if found != expected {
            return Err(DbError::Conflict {
                owner_id: conversation.owner_id.clone(),
                expected,
                found,
            });
        }

        let now = Utc::now();
        tx.execute(
            "INSERT INTO conversations (owner_id, created_at, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(owner_id) DO UPDATE SET updated_at = excluded.updated_at",
            params![
                conversation.owner_id,
                conversation.created_at.to_rfc3339(),
                now.to_rfc3339()
            ],
        )?;

        let mut sequence_id = expected;
        for message in conversation.unsaved() {
            sequence_id += 1;
            tx.execute(
                "INSERT INTO messages (owner_id, sequence_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    conversation.owner_id,
                    sequence_id,
                    message.role.as_str(),
                    message.content,
                    message.timestamp.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        conversation.mark_persisted(now);
        Ok(())
    }
}

/// Parse a message row from the database
fn parse_message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        role: parse_role(&row.get::<_, String>(0)?)?,
        content: row.get(1)?,
        timestamp: parse_datetime(&row.get::<_, String>(2)?),
    })
}

fn parse_role(s: &str) -> rusqlite::Result<Role> {
    match s {
        "user" => Ok(Role::User),
        "assistant" => Ok(Role::Assistant),
        "system" => Ok(Role::System),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            0,
            Type::Text,
            format!("unknown message role: {other}").into(),
        )),
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
