//! Listing page scrapers.
//!
//! A scraper fetches one listing page and turns its story cards into
//! [`ScrapedArticle`](crate::models::ScrapedArticle) records. Extraction is
//! kept separate from fetching so it can run over any HTML text.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Medium topic pages | [`medium`] | HTML scraping | Fixed selector path per story card |

pub mod medium;
