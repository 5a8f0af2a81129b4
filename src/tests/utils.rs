use crate::config::{SearchArea, StorePolicy};
use crate::scraper::{ScraperError, Transport, ZillowScraper};
use crate::store::DedupStore;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Scripted stand-in for the Zillow endpoints.
///
/// Pages are served in order; once the script runs out every page is empty.
/// Details are served per zpid; an unscripted zpid answers 404.
#[derive(Default)]
pub struct FakeTransport {
    pages: RefCell<VecDeque<Result<Value, String>>>,
    details: RefCell<HashMap<String, VecDeque<Result<Value, String>>>>,
    pub page_requests: RefCell<Vec<u64>>,
    pub page_bodies: RefCell<Vec<Value>>,
    pub detail_requests: RefCell<Vec<String>>,
    cancel_on: RefCell<Option<(String, Arc<AtomicBool>)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, zpids: &[&str]) -> Self {
        self.pages.borrow_mut().push_back(Ok(page_json(zpids)));
        self
    }

    pub fn raw_page(self, body: Value) -> Self {
        self.pages.borrow_mut().push_back(Ok(body));
        self
    }

    pub fn page_error(self, msg: &str) -> Self {
        self.pages.borrow_mut().push_back(Err(msg.to_string()));
        self
    }

    pub fn detail(self, zpid: &str, property: Value) -> Self {
        self.details
            .borrow_mut()
            .entry(zpid.to_string())
            .or_default()
            .push_back(Ok(json!({ "data": { "property": property } })));
        self
    }

    pub fn detail_error(self, zpid: &str, msg: &str) -> Self {
        self.details
            .borrow_mut()
            .entry(zpid.to_string())
            .or_default()
            .push_back(Err(msg.to_string()));
        self
    }

    /// Raises `flag` when the detail for `zpid` is requested.
    pub fn cancel_on(self, zpid: &str, flag: Arc<AtomicBool>) -> Self {
        *self.cancel_on.borrow_mut() = Some((zpid.to_string(), flag));
        self
    }

    pub fn detail_count(&self, zpid: &str) -> usize {
        self.detail_requests
            .borrow()
            .iter()
            .filter(|z| z.as_str() == zpid)
            .count()
    }
}

impl Transport for FakeTransport {
    fn put_json(&self, _url: &str, body: &Value) -> Result<Value, ScraperError> {
        let page = body["searchQueryState"]["pagination"]["currentPage"]
            .as_u64()
            .unwrap_or(0);
        self.page_requests.borrow_mut().push(page);
        self.page_bodies.borrow_mut().push(body.clone());

        match self.pages.borrow_mut().pop_front() {
            Some(Ok(v)) => Ok(v),
            Some(Err(msg)) => Err(ScraperError::Network(msg)),
            None => Ok(page_json(&[])),
        }
    }

    fn get_json(&self, _url: &str, query: &[(&str, String)]) -> Result<Value, ScraperError> {
        let variables = query
            .iter()
            .find(|(k, _)| *k == "variables")
            .map(|(_, v)| v.as_str())
            .unwrap_or("{}");
        let variables: Value = serde_json::from_str(variables).unwrap_or(Value::Null);
        let zpid = variables["zpid"].as_str().unwrap_or_default().to_string();
        self.detail_requests.borrow_mut().push(zpid.clone());

        if let Some((target, flag)) = self.cancel_on.borrow().as_ref() {
            if *target == zpid {
                flag.store(true, Ordering::SeqCst);
            }
        }

        let mut details = self.details.borrow_mut();
        let script = details.get_mut(&zpid);
        match script.and_then(|s| {
            // The last scripted answer repeats.
            if s.len() > 1 {
                s.pop_front()
            } else {
                s.front().cloned()
            }
        }) {
            Some(Ok(v)) => Ok(v),
            Some(Err(msg)) => Err(ScraperError::Network(msg)),
            None => Err(ScraperError::HttpStatus {
                status: 404,
                body: "not found".to_string(),
            }),
        }
    }
}

pub fn page_json(zpids: &[&str]) -> Value {
    let results: Vec<Value> = zpids
        .iter()
        .map(|z| json!({ "zpid": z, "price": "$1" }))
        .collect();
    json!({ "cat1": { "searchResults": { "mapResults": results } } })
}

/// A detail document with every field the normalizer reads.
pub fn sample_property() -> Value {
    json!({
        "zpid": 5,
        "address": {
            "streetAddress": "12 Main St",
            "city": "Brooklyn",
            "state": "NY",
            "zipcode": "11201"
        },
        "price": 500000,
        "bedrooms": 3,
        "bathrooms": 2.5,
        "livingArea": 1400,
        "homeStatus": "FOR_SALE",
        "description": "Sunny\nand bright",
        "pageViewCount": 120,
        "favoriteCount": 7,
        "propertyTaxRate": 0.87,
        "annualHomeownersInsurance": 1820,
        "resoFacts": {
            "homeType": "SingleFamily",
            "hoaFee": "$250 monthly",
            "appliances": ["Dishwasher", "Dryer"],
            "heating": "Forced air",
            "cooling": ["Central Air"],
            "atAGlanceFacts": [
                { "factLabel": "Year Built", "factValue": "1925" },
                { "factLabel": "Days on Zillow", "factValue": "4 Days" }
            ]
        },
        "priceHistory": [
            { "date": "2024-01-01", "price": 500000, "event": "Listed" }
        ],
        "schools": [
            { "rating": 8, "name": "PS 8" },
            { "name": "MS 51" }
        ],
        "openHouseSchedule": [
            { "startTime": "2024-10-26 11:30:00", "endTime": "2024-10-26 13:30:00" }
        ],
        "responsivePhotos": [
            { "mixedSources": { "jpeg": [
                { "url": "https://photos/a-192.jpg", "width": 192 },
                { "url": "https://photos/a-1536.jpg", "width": 1536 }
            ] } },
            { "mixedSources": { "webp": [ { "url": "https://photos/b.webp" } ] } },
            { "mixedSources": { "jpeg": [
                { "url": "https://photos/c-1536.jpg", "width": 1536 }
            ] } }
        ],
        "attributionInfo": {
            "mlsId": "RLS123",
            "mlsName": "REBNY",
            "agentName": "Ann Agent",
            "agentPhoneNumber": "555-0100",
            "brokerName": "Big Brokers",
            "brokerPhoneNumber": 5550199
        }
    })
}

/// A store rooted in a fresh temp dir; the dir lives as long as the guard.
pub fn temp_store() -> (TempDir, DedupStore) {
    let dir = TempDir::new().expect("temp dir");
    let store = reopen_store(&dir);
    (dir, store)
}

/// Another handle on the store `temp_store` created in `dir`.
pub fn reopen_store(dir: &TempDir) -> DedupStore {
    let mut policy = StorePolicy::new(dir.path());
    policy.write_xlsx = false;
    DedupStore::new(policy)
}

pub fn fast_scraper<T: Transport>(transport: T, max_pages: u32) -> ZillowScraper<T> {
    ZillowScraper::new(transport, SearchArea::default(), max_pages, Duration::ZERO)
}
