//! Axum route handlers for scraping and browsing articles.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/scrape` | [`scrape`] |
//! | GET | `/articles` | [`list_articles`] |
//! | GET | `/articles/:id` | [`get_article`] |
//! | POST | `/articles/:id` | [`annotate_article`] |
//!
//! Anything else falls through to the static files in the public directory.

use crate::error::Error;
use crate::ingest::run_ingest;
use crate::models::{Article, ArticleWithNote};
use crate::store::Store;
use axum::async_trait;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Json, Router};
use serde_json::{Map, Value};
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, instrument, Level};
use url::Url;

/// Confirmation page returned by `/scrape`, whatever the outcome of the
/// individual inserts.
pub const SCRAPE_COMPLETE_HTML: &str = r#"<link href="https://fonts.googleapis.com/css?family=Permanent+Marker" rel="stylesheet">
<style>
  body {
    background-color: rgb(70, 11, 117);
    font-family: 'Permanent Marker', cursive;
    color: white;
  }
  a:link { color: #b71ebc; text-decoration: none; }
  a:visited { color: #bc1e30; }
  a:hover { color: #8a158e; }
  a:active { color: #bc1e30; }
</style>
<body>
<h2>Scrape Complete</h2>
<a href="/" id="goHome"><h3>Let's see our results</h3></a></body>"#;

pub struct AppState {
    pub store: Arc<Store>,
    pub source_url: Url,
}

/// Build the application router.
///
/// # Arguments
///
/// * `state` - Shared store handle and scrape source
/// * `public_dir` - Directory served for any path without a route
pub fn router(state: Arc<AppState>, public_dir: &FsPath) -> Router {
    Router::new()
        .route("/scrape", get(scrape))
        .route("/articles", get(list_articles))
        .route("/articles/:id", get(get_article).post(annotate_article))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

// GET /scrape
#[instrument(level = "info", skip_all)]
pub async fn scrape(State(state): State<Arc<AppState>>) -> Result<Html<&'static str>, Error> {
    let report = run_ingest(state.store.clone(), &state.source_url).await?;
    info!(created = report.created, failed = report.failed, "Scrape request served");
    Ok(Html(SCRAPE_COMPLETE_HTML))
}

// GET /articles
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Article>>, Error> {
    Ok(Json(state.store.find_articles()?))
}

// GET /articles/:id
pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Option<ArticleWithNote>>, Error> {
    Ok(Json(state.store.find_article(&id)?))
}

// POST /articles/:id
#[instrument(level = "info", skip_all, fields(article_id = %id))]
pub async fn annotate_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    NoteBody(body): NoteBody,
) -> Result<Json<Option<Article>>, Error> {
    let note = state.store.create_note(body)?;
    let article = state.store.attach_note(&id, &note.id)?;
    if article.is_none() {
        info!(note_id = %note.id, "No article matched; note left unattached");
    }
    Ok(Json(article))
}

/// Note fields posted by a client, as JSON or as an HTML form.
///
/// Form fields arrive as strings, and a key given more than once becomes an
/// array of its values in order. Bracketed keys such as `tags[]` are kept
/// literally. A body with any other content type is ignored and yields an
/// empty note.
pub struct NoteBody(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for NoteBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(fields) = Json::<Map<String, Value>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(NoteBody(fields))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(NoteBody(group_fields(pairs)))
        } else {
            Ok(NoteBody(Map::new()))
        }
    }
}

fn group_fields(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut fields = Map::new();
    for (key, value) in pairs {
        let value = Value::String(value);
        match fields.get_mut(&key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                fields.insert(key, value);
            }
        }
    }
    fields
}
