//! This module owns the SQLite table that notes are persisted to.
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

/// The schema is applied every time a store is opened.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS notes (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    title      TEXT NOT NULL,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_notes_deleted_at ON notes (deleted_at);
";

const NOTE_COLUMNS: &str = "id, title, content, created_at, updated_at, deleted_at";

/// An error type for everything that can go wrong while talking to the database.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Database connection is unavailable")]
    Poisoned,
}

/// A single persisted note.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set once the note has been soft deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Note {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Note {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
            deleted_at: row.get(5)?,
        })
    }
}

/// Storage for notes backed by a single SQLite connection.
///
/// Every read filters out soft deleted rows explicitly. Each method issues a
/// single statement, so each runs in SQLite's implicit transaction.
#[derive(Debug)]
pub struct NoteStore {
    conn: Mutex<Connection>,
}

impl NoteStore {
    /// Opens (or creates) the database file at `path` and applies the schema.
    #[instrument]
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        info!("opened note database at {:?}", path);

        Self::init(conn)
    }

    /// Opens a private in-memory database. Nothing survives the store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;

        Ok(NoteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|err| {
            error!("error acquiring the database lock: {:?}", err);
            StoreError::Poisoned
        })
    }

    /// Inserts a new note and returns it as stored.
    #[instrument(skip(self, title, content))]
    pub fn create(&self, title: &str, content: &str) -> Result<Note, StoreError> {
        let conn = self.conn()?;
        let now = Utc::now();
        let note = conn.query_row(
            &format!(
                "INSERT INTO notes (title, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)
                 RETURNING {NOTE_COLUMNS}"
            ),
            params![title, content, now],
            Note::from_row,
        )?;

        debug!("created note {}", note.id);

        Ok(note)
    }

    /// Returns every note that has not been deleted, oldest first.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<Note>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes
             WHERE deleted_at IS NULL
             ORDER BY id"
        ))?;
        let notes = stmt
            .query_map([], Note::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    /// Returns the notes whose title or content contains `query`.
    ///
    /// Matching is a literal, case-sensitive substring test: `%` and `_`
    /// carry no special meaning.
    #[instrument(skip(self))]
    pub fn search(&self, query: &str) -> Result<Vec<Note>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes
             WHERE deleted_at IS NULL
               AND (instr(title, ?1) > 0 OR instr(content, ?1) > 0)
             ORDER BY id"
        ))?;
        let notes = stmt
            .query_map(params![query], Note::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!("search matched {} notes", notes.len());

        Ok(notes)
    }

    /// Looks up a note that has not been deleted.
    #[instrument(skip(self))]
    pub fn get(&self, id: i64) -> Result<Option<Note>, StoreError> {
        let conn = self.conn()?;
        let note = conn
            .query_row(
                &format!(
                    "SELECT {NOTE_COLUMNS} FROM notes
                     WHERE id = ?1 AND deleted_at IS NULL"
                ),
                params![id],
                Note::from_row,
            )
            .optional()?;

        Ok(note)
    }

    /// Overwrites the title and content of a live note and refreshes its
    /// update timestamp. Returns `None` if the note is missing or deleted.
    #[instrument(skip(self, title, content))]
    pub fn update(&self, id: i64, title: &str, content: &str) -> Result<Option<Note>, StoreError> {
        let conn = self.conn()?;
        let note = conn
            .query_row(
                &format!(
                    "UPDATE notes SET title = ?1, content = ?2, updated_at = ?3
                     WHERE id = ?4 AND deleted_at IS NULL
                     RETURNING {NOTE_COLUMNS}"
                ),
                params![title, content, Utc::now(), id],
                Note::from_row,
            )
            .optional()?;

        Ok(note)
    }

    /// Marks a live note as deleted. Returns `false` if there was nothing to delete.
    #[instrument(skip(self))]
    pub fn soft_delete(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE notes SET deleted_at = ?1
             WHERE id = ?2 AND deleted_at IS NULL",
            params![Utc::now(), id],
        )?;

        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn store() -> NoteStore {
        NoteStore::open_in_memory().unwrap()
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let store = store();
        let first = store.create("A", "B").unwrap();
        let second = store.create("C", "D").unwrap();

        assert!(first.id > 0);
        assert!(second.id > first.id);
        assert_eq!(first.created_at, first.updated_at);
        assert!(first.deleted_at.is_none());
    }

    #[test]
    fn created_note_reads_back_unchanged() {
        let store = store();
        let created = store.create("title", "content").unwrap();

        assert_eq!(store.get(created.id).unwrap(), Some(created.clone()));
        assert_eq!(store.list().unwrap(), vec![created]);
    }

    #[test]
    fn search_matches_title_or_content() {
        let store = store();
        let groceries = store.create("Groceries", "milk and eggs").unwrap();
        let todo = store.create("Todo", "buy milk").unwrap();
        store.create("Ideas", "a novel").unwrap();

        let ids: Vec<i64> = store.search("milk").unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![groceries.id, todo.id]);

        let ids: Vec<i64> = store.search("Todo").unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![todo.id]);

        assert!(store.search("nothing like this").unwrap().is_empty());
    }

    #[test]
    fn search_is_case_sensitive() {
        let store = store();
        store.create("Alpha", "Beta").unwrap();

        assert_eq!(store.search("Alpha").unwrap().len(), 1);
        assert!(store.search("alpha").unwrap().is_empty());
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let store = store();
        store.create("plain", "text").unwrap();
        let percent = store.create("100%", "done").unwrap();

        let found = store.search("%").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, percent.id);
        assert!(store.search("_").unwrap().is_empty());
    }

    #[test]
    fn update_changes_text_and_timestamp() {
        let store = store();
        let created = store.create("old", "old body").unwrap();

        sleep(Duration::from_millis(5));

        let updated = store.update(created.id, "new", "new body").unwrap().unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "new");
        assert_eq!(updated.content, "new body");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[test]
    fn update_of_missing_note_returns_none() {
        let store = store();

        assert_eq!(store.update(42, "a", "b").unwrap(), None);
    }

    #[test]
    fn soft_delete_hides_note_but_keeps_row() {
        let store = store();
        let note = store.create("A", "B").unwrap();

        assert!(store.soft_delete(note.id).unwrap());
        assert!(!store.soft_delete(note.id).unwrap());
        assert_eq!(store.get(note.id).unwrap(), None);
        assert!(store.list().unwrap().is_empty());
        assert!(store.search("A").unwrap().is_empty());
        assert_eq!(store.update(note.id, "x", "y").unwrap(), None);

        let conn = store.conn().unwrap();
        let deleted_at: Option<DateTime<Utc>> = conn
            .query_row(
                "SELECT deleted_at FROM notes WHERE id = ?1",
                params![note.id],
                |row| row.get(0),
            )
            .unwrap();
        assert!(deleted_at.is_some());
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let store = store();
        let first = store.create("A", "B").unwrap();
        store.soft_delete(first.id).unwrap();
        let second = store.create("C", "D").unwrap();

        assert!(second.id > first.id);
    }

    #[test]
    fn file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.db");

        let created = NoteStore::open(&path).unwrap().create("A", "B").unwrap();
        let reopened = NoteStore::open(&path).unwrap();

        assert_eq!(reopened.get(created.id).unwrap(), Some(created));
    }
}
