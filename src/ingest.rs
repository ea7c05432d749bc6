//! The scrape-and-replace ingest cycle.
//!
//! One cycle runs these steps in order:
//!
//! 1. **Fetch** the listing page. A failure here ends the cycle before
//!    anything is touched.
//! 2. **Clear** every stored article. A failure is logged and the cycle
//!    carries on.
//! 3. **Extract** story cards from the page.
//! 4. **Persist** each record on its own. A failed insert is logged and
//!    skipped; it does not undo step 2 or stop later records.
//!
//! Steps 2 through 4 run on the blocking thread pool, since every store
//! call is a synchronous SQLite statement.
//!
//! Nothing serializes two cycles against each other, so concurrent scrapes
//! can interleave their clears and inserts.

use crate::error::Error;
use crate::models::ScrapedArticle;
use crate::scrapers::medium::{extract_articles, fetch_page};
use crate::store::Store;
use crate::utils::truncate_for_log;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Outcome counts for one ingest cycle.
///
/// Only logged; the HTTP caller gets a fixed confirmation either way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Articles removed by the clear step, or `None` if the clear failed.
    pub deleted: Option<usize>,
    /// Story cards found on the page.
    pub extracted: usize,
    /// Records inserted.
    pub created: usize,
    /// Records whose insert failed.
    pub failed: usize,
}

/// Run a full ingest cycle against `source_url`.
///
/// # Errors
///
/// Returns [`Error::Fetch`] if the page cannot be downloaded. The store is
/// untouched in that case. Returns [`Error::Task`] if the blocking insert
/// task panics.
#[instrument(level = "info", skip_all, fields(source = %source_url))]
pub async fn run_ingest(store: Arc<Store>, source_url: &Url) -> Result<IngestReport, Error> {
    let html = fetch_page(source_url).await?;
    let report = tokio::task::spawn_blocking(move || ingest_html(&store, &html)).await?;
    Ok(report)
}

/// Replace the stored articles with the records extracted from `html`.
///
/// This is steps 2 through 4 of the cycle.
pub fn ingest_html(store: &Store, html: &str) -> IngestReport {
    let mut report = IngestReport::default();

    match store.delete_articles() {
        Ok(removed) => {
            info!(removed, "Documents cleared out");
            report.deleted = Some(removed);
        }
        Err(e) => error!(error = %e, "Failed to clear articles; continuing"),
    }

    let records = extract_articles(html);
    report.extracted = records.len();
    if records.is_empty() {
        warn!("No story cards found on listing page");
    }

    for (index, record) in records.iter().enumerate() {
        if persist(store, index, record) {
            report.created += 1;
        } else {
            report.failed += 1;
        }
    }

    info!(
        deleted = ?report.deleted,
        extracted = report.extracted,
        created = report.created,
        failed = report.failed,
        "Ingest cycle complete"
    );
    report
}

fn persist(store: &Store, index: usize, record: &ScrapedArticle) -> bool {
    match store.create_article(record) {
        Ok(article) => {
            info!(
                index,
                id = %article.id,
                headline = %truncate_for_log(&article.headline, 80),
                url = ?article.url,
                "Stored article"
            );
            true
        }
        Err(e) => {
            error!(index, error = %e, "Failed to store article; skipping");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_port_url, serve_listing, LISTING_HTML, LISTING_LEN};

    #[test]
    fn test_ingest_replaces_prior_articles() {
        let store = Store::open(":memory:").unwrap();
        let stale = store
            .create_article(&ScrapedArticle {
                headline: "Yesterday".to_string(),
                ..Default::default()
            })
            .unwrap();

        let report = ingest_html(&store, LISTING_HTML);
        assert_eq!(report.deleted, Some(1));
        assert_eq!(report.extracted, LISTING_LEN);
        assert_eq!(report.created, LISTING_LEN);
        assert_eq!(report.failed, 0);

        let articles = store.find_articles().unwrap();
        assert!(articles.len() <= LISTING_LEN);
        assert!(articles.iter().all(|a| a.id != stale.id));
        assert!(articles.iter().all(|a| a.headline != "Yesterday"));
    }

    #[test]
    fn test_ingest_with_no_cards_empties_store() {
        let store = Store::open(":memory:").unwrap();
        ingest_html(&store, LISTING_HTML);

        let report = ingest_html(&store, "<html><body></body></html>");
        assert_eq!(report.deleted, Some(LISTING_LEN));
        assert_eq!(report.extracted, 0);
        assert!(store.find_articles().unwrap().is_empty());
    }

    #[test]
    fn test_ingest_drops_note_references_with_articles() {
        let store = Store::open(":memory:").unwrap();
        ingest_html(&store, LISTING_HTML);
        let first = store.find_articles().unwrap().remove(0);
        let note = store.create_note(Default::default()).unwrap();
        store.attach_note(&first.id, &note.id).unwrap();

        ingest_html(&store, LISTING_HTML);
        assert!(store.find_articles().unwrap().iter().all(|a| a.note.is_none()));
        assert_eq!(store.count_notes().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_run_ingest_fetches_and_stores() {
        let store = Arc::new(Store::open(":memory:").unwrap());
        let source = serve_listing().await;

        let report = run_ingest(store.clone(), &source).await.unwrap();
        assert_eq!(report.created, LISTING_LEN);

        let articles = store.find_articles().unwrap();
        assert_eq!(articles[0].headline, "Async Rust in Practice");
    }

    #[tokio::test]
    async fn test_run_ingest_fetch_failure_leaves_store_untouched() {
        let store = Arc::new(Store::open(":memory:").unwrap());
        ingest_html(&store, LISTING_HTML);

        let source = closed_port_url().await;
        let result = run_ingest(store.clone(), &source).await;

        assert!(matches!(result, Err(Error::Fetch(_))));
        assert_eq!(store.find_articles().unwrap().len(), LISTING_LEN);
    }
}
