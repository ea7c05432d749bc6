//! Data models for scraped articles and the notes attached to them.
//!
//! This module defines the records that flow between the extractor, the
//! store and the HTTP layer:
//! - [`ScrapedArticle`]: A headline/summary/link triple pulled from a listing page
//! - [`Article`]: A persisted article as returned by list and annotate
//! - [`ArticleWithNote`]: A persisted article with its note resolved
//! - [`Note`]: A free-form note a caller attached to an article
//!
//! Identity fields serialize as `_id` so the JSON matches what the bundled
//! front end expects from a document store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw record extracted from one container element of the listing page.
///
/// Fields are best-effort: a missing nested element leaves `headline` or
/// `summary` empty and `url` as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScrapedArticle {
    /// Concatenated link text under the headline block.
    pub headline: String,
    /// Concatenated link text of the summary paragraph.
    pub summary: String,
    /// `href` of the headline link, exactly as it appeared in the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// An article stored in the Articles collection.
///
/// `note` is a weak reference: it holds the id of a [`Note`] and the note
/// may not exist any more.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Store-assigned identity.
    #[serde(rename = "_id")]
    pub id: String,
    pub headline: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Id of the attached note, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// An article with its note reference resolved to the full [`Note`].
///
/// Unlike [`Article`], `note` is always serialized, as `null` when no note
/// is attached or the referenced note is gone.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArticleWithNote {
    #[serde(rename = "_id")]
    pub id: String,
    pub headline: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub note: Option<Note>,
}

/// A note stored in the Notes collection.
///
/// The body is whatever object the caller posted; its fields are flattened
/// next to `_id` on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}
