//! # Headline Scraper
//!
//! A small web service that scrapes story cards from a news listing page
//! into a document store and lets readers browse them and attach notes.
//!
//! ## Features
//!
//! - Scrapes headline, summary and link from every story card on the page
//! - Replaces the stored articles wholesale on each scrape
//! - Lists articles and fetches one with its note resolved
//! - Attaches free-form notes to articles from JSON or form posts
//! - Serves a static front end from the public directory
//!
//! ## Usage
//!
//! ```sh
//! headline_scraper --port 3000 --database-url headlines.db
//! ```
//!
//! ## Architecture
//!
//! Requests are handled independently on a `tokio` runtime:
//! 1. **Scraping**: `GET /scrape` fetches the listing page and runs the ingest cycle
//! 2. **Browsing**: `GET /articles` and `GET /articles/:id` read from the store
//! 3. **Annotating**: `POST /articles/:id` stores a note and links it to the article

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod error;
mod ingest;
mod models;
mod routes;
mod scrapers;
mod store;
#[cfg(test)]
mod test_support;
mod utils;

use cli::Cli;
use routes::AppState;
use store::Store;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // Missing .env is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let store = Arc::new(Store::open(&args.database_url)?);
    let articles = store.find_articles()?.len();
    let notes = store.count_notes()?;
    info!(articles, notes, "Store ready");

    if args.once {
        let report = ingest::run_ingest(store.clone(), &args.source_url).await?;
        info!(?report, "Single scrape finished");
        return Ok(());
    }

    let state = Arc::new(AppState {
        store,
        source_url: args.source_url.clone(),
    });
    let app = routes::router(state, &args.public_dir);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, source = %args.source_url, "App running on port {}!", args.port);

    axum::serve(listener, app).await?;
    Ok(())
}
