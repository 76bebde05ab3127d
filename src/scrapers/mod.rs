//! Listing-page scrapers.
//!
//! A scraper turns one paginated listing URL into the articles it links to.
//! Scraping happens in two phases per listing page:
//!
//! 1. **Indexing**: fetch the listing page and resolve every article link
//! 2. **Fetching**: fetch each article page, in listing order, and extract
//!    an [`ArticleRecord`]
//!
//! Only a failed listing fetch fails the call. A bad article page is logged
//! and skipped so the rest of the listing is still processed.

use crate::error::FetchError;
use crate::models::ArticleRecord;
use async_trait::async_trait;

pub mod news_site;

pub use news_site::NewsSiteExtractor;

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Fetch `listing_url` and every article it links to.
    async fn extract(&self, listing_url: &str) -> Result<Vec<ArticleRecord>, FetchError>;
}
