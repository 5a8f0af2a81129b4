// config.rs
use std::path::PathBuf;
use std::time::Duration;

pub const SEARCH_URL: &str = "https://www.zillow.com/async-create-search-page-state";
pub const DETAIL_URL: &str = "https://www.zillow.com/graphql/";
pub const DETAIL_QUERY_HASH: &str =
    "a2b500eeeec76ac685562c34e99dae1ee6a1a841a5a78ebc90bedae726c71659";

pub const DEFAULT_MAX_PAGES: u32 = 20;
pub const DEFAULT_MAX_DETAILS: usize = 15;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_DELAY_SECS: u64 = 2;
pub const DEFAULT_PAGE_DELAY_SECS: u64 = 3;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36";

/// Geographic box sent with every search page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

/// Where and how to search. Defaults cover New York City.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchArea {
    pub bounds: MapBounds,
    pub region_id: i64,
    pub region_type: i64,
    pub sort: String,
}

impl Default for SearchArea {
    fn default() -> Self {
        Self {
            bounds: MapBounds {
                west: -74.30523740039064,
                east: -73.35766659960939,
                south: 40.59682669577144,
                north: 40.745773606464226,
            },
            region_id: 270915,
            region_type: 17,
            sort: "globalrelevanceex".to_string(),
        }
    }
}

/// Headers and cookies handed to the HTTP client once, at construction.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub user_agent: String,
    pub headers: Vec<(String, String)>,
    /// Raw `Cookie` header value, e.g. `zguid=...; zgsession=...`.
    pub cookies: Option<String>,
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let headers = [
            ("accept", "*/*"),
            ("accept-language", "en-GB,en-US;q=0.9,en;q=0.8"),
            ("content-type", "application/json"),
            ("origin", "https://www.zillow.com"),
            ("sec-ch-ua-mobile", "?0"),
            ("sec-ch-ua-platform", "\"macOS\""),
            ("sec-fetch-dest", "empty"),
            ("sec-fetch-mode", "cors"),
            ("sec-fetch-site", "same-origin"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            user_agent: USER_AGENT.to_string(),
            headers,
            cookies: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl SessionConfig {
    pub fn with_cookies(mut self, cookies: Option<String>) -> Self {
        self.cookies = cookies.filter(|c| !c.trim().is_empty());
        self
    }
}

/// File locations and write policy for the durable store.
#[derive(Debug, Clone)]
pub struct StorePolicy {
    pub data_dir: PathBuf,
    pub file_stem: String,
    pub write_backups: bool,
    pub write_xlsx: bool,
}

impl StorePolicy {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            file_stem: "zillow_data".to_string(),
            write_backups: true,
            write_xlsx: true,
        }
    }

    pub fn primary_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.csv", self.file_stem))
    }

    pub fn xlsx_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.xlsx", self.file_stem))
    }
}

/// Everything a run needs, built once in `main`.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub search: SearchArea,
    pub session: SessionConfig,
    pub store: StorePolicy,
    pub logs_dir: PathBuf,
    pub max_pages: u32,
    pub max_details: usize,
    pub page_delay: Duration,
    pub delay: Duration,
    pub max_retries: u32,
    pub ledger_path: Option<PathBuf>,
}

impl ScraperConfig {
    pub fn new(data_dir: impl Into<PathBuf>, logs_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            search: SearchArea::default(),
            session: SessionConfig::default(),
            ledger_path: Some(data_dir.join("scrape_runs.sqlite3")),
            store: StorePolicy::new(data_dir),
            logs_dir: logs_dir.into(),
            max_pages: DEFAULT_MAX_PAGES,
            max_details: DEFAULT_MAX_DETAILS,
            page_delay: Duration::from_secs(DEFAULT_PAGE_DELAY_SECS),
            delay: Duration::from_secs(DEFAULT_DELAY_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}
