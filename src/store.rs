//! Document store for the Articles and Notes collections.
//!
//! The store is an embedded SQLite database. Each collection is a table
//! keyed by a store-assigned id; note bodies are kept as JSON text so a
//! caller can attach any fields they like. An article's `note_id` column is
//! a weak reference with no foreign key, so a note can go missing without
//! the article noticing.
//!
//! # Operations
//!
//! | Operation | Collection | Method |
//! |-----------|------------|--------|
//! | create | Articles | [`Store::create_article`] |
//! | find | Articles | [`Store::find_articles`] |
//! | find-one (note resolved) | Articles | [`Store::find_article`] |
//! | find-one-and-update | Articles | [`Store::attach_note`] |
//! | delete-many | Articles | [`Store::delete_articles`] |
//! | create | Notes | [`Store::create_note`] |
//!
//! The connection sits behind a [`Mutex`] that is held for one operation at
//! a time; nothing spans two calls.

use crate::error::StoreError;
use crate::models::{Article, ArticleWithNote, Note, ScrapedArticle};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::{Map, Value};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS articles (
    seq      INTEGER PRIMARY KEY AUTOINCREMENT,
    id       TEXT NOT NULL UNIQUE,
    headline TEXT NOT NULL,
    summary  TEXT NOT NULL,
    url      TEXT,
    note_id  TEXT
);
CREATE TABLE IF NOT EXISTS notes (
    seq  INTEGER PRIMARY KEY AUTOINCREMENT,
    id   TEXT NOT NULL UNIQUE,
    body TEXT NOT NULL
);
";

/// Handle to the document store.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open the store described by a connection string.
    ///
    /// # Arguments
    ///
    /// * `database_url` - A file path, optionally prefixed with `sqlite://`,
    ///   or `:memory:` for a private in-memory store
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] if the database cannot be opened or the
    /// collections cannot be created.
    #[instrument(level = "info")]
    pub fn open(database_url: &str) -> Result<Self, StoreError> {
        let path = database_url
            .strip_prefix("sqlite://")
            .unwrap_or(database_url);
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch(SCHEMA)?;
        info!(path, "Opened document store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Insert a scraped record into the Articles collection.
    ///
    /// # Returns
    ///
    /// The stored [`Article`] with its newly assigned id and no note.
    pub fn create_article(&self, record: &ScrapedArticle) -> Result<Article, StoreError> {
        let id = new_id();
        self.conn()?.execute(
            "INSERT INTO articles (id, headline, summary, url) VALUES (?1, ?2, ?3, ?4)",
            params![id, record.headline, record.summary, record.url],
        )?;
        Ok(Article {
            id,
            headline: record.headline.clone(),
            summary: record.summary.clone(),
            url: record.url.clone(),
            note: None,
        })
    }

    /// Every article currently stored, in insertion order.
    pub fn find_articles(&self) -> Result<Vec<Article>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, headline, summary, url, note_id FROM articles ORDER BY seq",
        )?;
        let articles = stmt
            .query_map([], article_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(articles)
    }

    /// Look up one article and resolve its note.
    ///
    /// # Returns
    ///
    /// `None` if no article has this id. Otherwise the article, with `note`
    /// set to the full [`Note`] when one is attached and still exists.
    pub fn find_article(&self, id: &str) -> Result<Option<ArticleWithNote>, StoreError> {
        let conn = self.conn()?;
        let Some(article) = conn
            .query_row(
                "SELECT id, headline, summary, url, note_id FROM articles WHERE id = ?1",
                params![id],
                article_from_row,
            )
            .optional()?
        else {
            return Ok(None);
        };

        let note = match &article.note {
            Some(note_id) => find_note(&conn, note_id)?,
            None => None,
        };

        Ok(Some(ArticleWithNote {
            id: article.id,
            headline: article.headline,
            summary: article.summary,
            url: article.url,
            note,
        }))
    }

    /// Insert a note into the Notes collection.
    ///
    /// Any `_id` field in `body` is dropped; the store assigns identity.
    pub fn create_note(&self, mut body: Map<String, Value>) -> Result<Note, StoreError> {
        body.remove("_id");
        let id = new_id();
        let encoded = serde_json::to_string(&body)?;
        self.conn()?.execute(
            "INSERT INTO notes (id, body) VALUES (?1, ?2)",
            params![id, encoded],
        )?;
        debug!(note_id = %id, fields = body.len(), "Created note");
        Ok(Note { id, body })
    }

    /// Point an article at a note, replacing any earlier reference.
    ///
    /// The previous note, if any, is left in place.
    ///
    /// # Returns
    ///
    /// The updated [`Article`], or `None` if no article has `article_id`.
    pub fn attach_note(
        &self,
        article_id: &str,
        note_id: &str,
    ) -> Result<Option<Article>, StoreError> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE articles SET note_id = ?2 WHERE id = ?1",
            params![article_id, note_id],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        let article = conn
            .query_row(
                "SELECT id, headline, summary, url, note_id FROM articles WHERE id = ?1",
                params![article_id],
                article_from_row,
            )
            .optional()?;
        Ok(article)
    }

    /// Remove every article.
    ///
    /// # Returns
    ///
    /// How many articles were removed.
    pub fn delete_articles(&self) -> Result<usize, StoreError> {
        let removed = self.conn()?.execute("DELETE FROM articles", [])?;
        Ok(removed)
    }

    /// Number of notes stored, attached or not.
    pub fn count_notes(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        headline: row.get(1)?,
        summary: row.get(2)?,
        url: row.get(3)?,
        note: row.get(4)?,
    })
}

fn find_note(conn: &Connection, id: &str) -> Result<Option<Note>, StoreError> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM notes WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    match body {
        Some(body) => Ok(Some(Note {
            id: id.to_string(),
            body: serde_json::from_str(&body)?,
        })),
        None => Ok(None),
    }
}
