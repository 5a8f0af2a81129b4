// scraper.rs
use crate::config::{SearchArea, DETAIL_QUERY_HASH, DETAIL_URL, SEARCH_URL};
use crate::scraper::client::Transport;
use crate::scraper::models::{DetailDocument, ListingEntry, SearchQuery};
use crate::scraper::ScraperError;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct ZillowScraper<T: Transport> {
    transport: T,
    search: SearchArea,
    max_pages: u32,
    page_delay: Duration,
}

#[derive(Debug, Default)]
pub struct PaginatedResult {
    pub listings: Vec<ListingEntry>,
    pub pages_fetched: u32,
}

impl<T: Transport> ZillowScraper<T> {
    pub fn new(transport: T, search: SearchArea, max_pages: u32, page_delay: Duration) -> Self {
        Self {
            transport,
            search,
            max_pages,
            page_delay,
        }
    }

    /// Walks search pages from 1 until a page is empty, the page cap is
    /// passed, or a request fails. Never retries; a failure just ends the
    /// walk with whatever was collected so far.
    pub fn fetch_all_pages(&self) -> PaginatedResult {
        let mut result = PaginatedResult::default();
        let mut page = 1;

        loop {
            match self.fetch_page(page) {
                Ok(listings) => {
                    if listings.is_empty() {
                        info!(page, "No listings on page, stopping");
                        break;
                    }

                    info!(page, count = listings.len(), "Got listings from page");
                    result.listings.extend(listings);
                    result.pages_fetched += 1;
                    page += 1;

                    if page > self.max_pages {
                        info!(max_pages = self.max_pages, "Page cap reached, stopping");
                        break;
                    }

                    std::thread::sleep(self.page_delay);
                }
                Err(e) => {
                    error!(page, "Error getting search results: {e}");
                    break;
                }
            }
        }

        result
    }

    pub fn fetch_page(&self, page: u32) -> Result<Vec<ListingEntry>, ScraperError> {
        let query = SearchQuery::for_page(&self.search, page);
        let body =
            serde_json::to_value(&query).map_err(|e| ScraperError::JsonParse(e.to_string()))?;

        let data = self.transport.put_json(SEARCH_URL, &body)?;
        Self::extract_listings(&data)
    }

    fn extract_listings(data: &Value) -> Result<Vec<ListingEntry>, ScraperError> {
        let arr = data["cat1"]["searchResults"]["mapResults"]
            .as_array()
            .ok_or(ScraperError::UnexpectedShape(
                "cat1.searchResults.mapResults missing".to_string(),
            ))?;

        let listings = arr
            .iter()
            .filter_map(|entry| {
                let listing = ListingEntry::from_value(entry);
                if listing.is_none() {
                    warn!("Search result without zpid, ignoring");
                }
                listing
            })
            .collect();

        Ok(listings)
    }

    /// One detail request. Failures are logged and turned into `None`.
    pub fn fetch_detail(&self, zpid: &str) -> Option<DetailDocument> {
        match self.try_fetch_detail(zpid) {
            Ok(doc) => Some(doc),
            Err(e) => {
                error!(zpid, "Error getting property details: {e}");
                None
            }
        }
    }

    pub fn try_fetch_detail(&self, zpid: &str) -> Result<DetailDocument, ScraperError> {
        let extensions = json!({
            "persistedQuery": { "version": 1, "sha256Hash": DETAIL_QUERY_HASH }
        });
        let variables = json!({
            "zpid": zpid,
            "platform": "DESKTOP_WEB",
            "formType": "OPAQUE",
        });
        let query = [
            ("extensions", extensions.to_string()),
            ("variables", variables.to_string()),
        ];

        debug!(zpid, "Requesting property details");
        let data = self.transport.get_json(DETAIL_URL, &query)?;

        let property = data
            .pointer("/data/property")
            .filter(|v| v.is_object())
            .cloned()
            .ok_or(ScraperError::UnexpectedShape(
                "data.property missing".to_string(),
            ))?;

        DetailDocument::from_value(property).map_err(|e| ScraperError::JsonParse(e.to_string()))
    }
}
