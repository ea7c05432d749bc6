//! Medium topic page scraper.
//!
//! Each story on a topic listing such as
//! [medium.com/topic/technology](https://medium.com/topic/technology) is
//! wrapped in a `section.ex` card. Inside a card:
//!
//! ```text
//! section.ex
//! ├── div.dr
//! │   └── h3.ai > a[href]   headline text + story link
//! └── div.dw
//!     └── p > a             summary text
//! ```
//!
//! Every lookup is best-effort. A card with a missing piece still yields a
//! record, with that field left empty.
//!
//! Lookups walk down one simple selector at a time from the card, so an
//! element that only matches because of an ancestor outside the card is
//! never picked up.

use crate::models::ScrapedArticle;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, instrument};
use url::Url;

static CARD: Lazy<Selector> = Lazy::new(|| selector("section.ex"));
static HEADLINE_BLOCK: Lazy<Selector> = Lazy::new(|| selector("div.dr"));
static SUMMARY_BLOCK: Lazy<Selector> = Lazy::new(|| selector("div.dw"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("h3.ai"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// Download the listing page.
///
/// The body is returned whatever the status code; there is no timeout and
/// no retry.
///
/// # Errors
///
/// Returns the [`reqwest::Error`] if the request cannot be sent or the body
/// cannot be read.
#[instrument(level = "info", skip_all, fields(url = %url))]
pub async fn fetch_page(url: &Url) -> Result<String, reqwest::Error> {
    let response = reqwest::get(url.clone()).await?;
    let status = response.status();
    let html = response.text().await?;
    info!(%status, bytes = html.len(), "Fetched listing page");
    Ok(html)
}

/// Extract one record per story card in `html`.
///
/// # Returns
///
/// A record for every `section.ex` element, in document order. Missing
/// nested elements produce an empty `headline` or `summary` and a `None`
/// `url`.
pub fn extract_articles(html: &str) -> Vec<ScrapedArticle> {
    let document = Html::parse_document(html);
    let articles: Vec<ScrapedArticle> = document.select(&CARD).map(extract_card).collect();
    debug!(count = articles.len(), "Extracted story cards");
    articles
}

fn extract_card(card: ElementRef<'_>) -> ScrapedArticle {
    let headline_links = find_path(card, &[&*HEADLINE_BLOCK, &*ANCHOR]);
    let summary_links = find_path(card, &[&*SUMMARY_BLOCK, &*PARAGRAPH, &*ANCHOR]);
    let title_links = find_path(card, &[&*HEADLINE_BLOCK, &*TITLE, &*ANCHOR]);

    ScrapedArticle {
        headline: text_of(&headline_links),
        summary: text_of(&summary_links),
        url: title_links
            .first()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string),
    }
}

/// Descend from `root` through `path`, one selector per step.
///
/// Each step searches only below the elements found by the previous one.
/// Results are unique and in document order.
fn find_path<'a>(root: ElementRef<'a>, path: &[&Selector]) -> Vec<ElementRef<'a>> {
    let mut scope = vec![root];
    for step in path {
        let mut seen = HashSet::new();
        scope = scope
            .iter()
            .flat_map(|el| el.select(step))
            .filter(|found| seen.insert(found.id()))
            .collect();
    }
    scope
}

/// Text of every element, joined with nothing in between.
fn text_of(elements: &[ElementRef<'_>]) -> String {
    elements.iter().flat_map(|el| el.text()).collect()
}
