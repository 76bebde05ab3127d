//! Scraper for the news site's paginated category listings.
//!
//! # URL Pattern
//!
//! Listing pages look like `https://turkishnetworktimes.com/kategori/gundem/page/3/`.
//! Each `article.col-12` entry links to its full article through an
//! `a.post-link` anchor, resolved against the listing URL.
//!
//! # Article layout
//!
//! | Field | Source |
//! |-------|--------|
//! | header | `h1.single_title` |
//! | summary | first `p` on the page |
//! | text | every `.yazi_icerik`, trimmed, joined with one space |
//! | image_urls | `data-src` of images in the main content column |
//! | publish/update date | first `time[datetime]`, date part only |

use super::Extractor;
use crate::error::{ExtractionError, FetchError};
use crate::models::ArticleRecord;
use crate::utils::{leading_date, truncate_for_log};
use async_trait::async_trait;
use itertools::Itertools;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

const HEADER_SELECTOR: &str = "h1.single_title";
const SUMMARY_SELECTOR: &str = "p";

static LISTING_ENTRY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article.col-12").expect("valid listing selector"));
static POST_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.post-link[href]").expect("valid link selector"));
static HEADER: Lazy<Selector> =
    Lazy::new(|| Selector::parse(HEADER_SELECTOR).expect("valid header selector"));
static SUMMARY: Lazy<Selector> =
    Lazy::new(|| Selector::parse(SUMMARY_SELECTOR).expect("valid summary selector"));
static BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".yazi_icerik").expect("valid body selector"));
static IMAGES: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#homecontent > div:nth-child(2) > div.row > div.col-12.col-lg-8 > div img")
        .expect("valid image selector")
});
static TIMESTAMP: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time").expect("valid time selector"));

/// HTTP-backed [`Extractor`] for the news site.
#[derive(Debug, Clone)]
pub struct NewsSiteExtractor {
    client: Client,
}

impl NewsSiteExtractor {
    /// Build an extractor whose requests each time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(transport)
    }

    /// Fetch and parse a single article page.
    #[instrument(level = "debug", skip(self))]
    async fn fetch_article(&self, url: &str) -> Result<ArticleRecord, Box<dyn Error + Send + Sync>> {
        let body = self.fetch_text(url).await?;
        let record = parse_article(url, &body)?;
        debug!(bytes = record.text.len(), images = record.image_urls.len(), "Parsed article");
        Ok(record)
    }
}

#[async_trait]
impl Extractor for NewsSiteExtractor {
    #[instrument(level = "info", skip(self))]
    async fn extract(&self, listing_url: &str) -> Result<Vec<ArticleRecord>, FetchError> {
        let html = self.fetch_text(listing_url).await?;
        let links = match Url::parse(listing_url) {
            Ok(base) => parse_listing(&base, &html),
            Err(e) => {
                warn!(error = %e, "Listing URL is not absolute; no article links resolved");
                Vec::new()
            }
        };
        info!(count = links.len(), "Indexed article URLs");

        let mut records = Vec::with_capacity(links.len());
        for link in links {
            match self.fetch_article(&link).await {
                Ok(record) => records.push(record),
                Err(e) => warn!(url = %link, error = %e, "Skipping article"),
            }
        }
        Ok(records)
    }
}

/// Resolve the article link of every listing entry, in page order.
///
/// Entries without a link, or with a link that cannot be resolved, are skipped.
pub fn parse_listing(base: &Url, html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for entry in document.select(&LISTING_ENTRY) {
        let Some(href) = entry
            .select(&POST_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            debug!("Listing entry without a post link");
            continue;
        };
        match base.join(href) {
            Ok(resolved) => links.push(resolved.to_string()),
            Err(_) => {
                let e = ExtractionError::InvalidLink {
                    base: base.to_string(),
                    href: truncate_for_log(href, 200),
                };
                warn!(error = %e, "Skipping listing entry");
            }
        }
    }
    links
}

/// Extract an [`ArticleRecord`] from a full article page.
pub fn parse_article(url: &str, html: &str) -> Result<ArticleRecord, ExtractionError> {
    let document = Html::parse_document(html);
    let missing = |selector| ExtractionError::MissingElement {
        url: url.to_string(),
        selector,
    };

    let header = document
        .select(&HEADER)
        .next()
        .map(element_text)
        .ok_or_else(|| missing(HEADER_SELECTOR))?;
    let summary = document
        .select(&SUMMARY)
        .next()
        .map(element_text)
        .ok_or_else(|| missing(SUMMARY_SELECTOR))?;
    let text = document.select(&BODY).map(element_text).join(" ");
    let image_urls = document
        .select(&IMAGES)
        .filter_map(|img| img.value().attr("data-src"))
        .map(str::to_string)
        .collect();

    // The page exposes one timestamp; it backs both dates.
    let date = document
        .select(&TIMESTAMP)
        .next()
        .and_then(|time| time.value().attr("datetime"))
        .and_then(leading_date);

    Ok(ArticleRecord {
        url: url.to_string(),
        header,
        summary,
        text,
        image_urls,
        publish_date: date.clone(),
        update_date: date,
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
