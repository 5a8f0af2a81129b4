// coordinator.rs
use crate::db::connection::{init_db, Database};
use crate::db::runs::{finish_run, recent_runs, start_run};
use crate::domain::property::{normalize, PropertyRecord};
use crate::retry::RetryPolicy;
use crate::scraper::{ScraperError, Transport, ZillowScraper};
use crate::store::DedupStore;
use chrono::Local;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const CANCEL_POLL: Duration = Duration::from_millis(100);

/// Lifecycle of one listing within a run.
///
/// `Pending -> Skipped` for known ids, otherwise
/// `Pending -> Fetching -> Normalizing -> Persisted` or
/// `Pending -> Fetching -> Abandoned` once retries run out. A normalized
/// record only settles as `Persisted` once a save lands; one still unsaved
/// at the end of the run settles as `Abandoned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Pending,
    Skipped,
    Fetching,
    Normalizing,
    Persisted,
    Abandoned,
}

impl EntityState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EntityState::Skipped | EntityState::Persisted | EntityState::Abandoned
        )
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityState::Pending => "PENDING",
            EntityState::Skipped => "SKIPPED",
            EntityState::Fetching => "FETCHING",
            EntityState::Normalizing => "NORMALIZING",
            EntityState::Persisted => "PERSISTED",
            EntityState::Abandoned => "ABANDONED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub pages_fetched: u32,
    pub listings_found: usize,
    pub skipped: usize,
    pub persisted: usize,
    pub abandoned: usize,
    pub cancelled: bool,
    /// Set when the search phase failed and nothing was processed.
    pub aborted: Option<String>,
    /// Terminal state per zpid, in processing order.
    pub outcomes: Vec<(String, EntityState)>,
}

impl RunSummary {
    fn settle(&mut self, zpid: &str, state: EntityState) {
        debug_assert!(state.is_terminal());
        debug!(zpid, %state, "Listing settled");
        match state {
            EntityState::Skipped => self.skipped += 1,
            EntityState::Persisted => self.persisted += 1,
            EntityState::Abandoned => self.abandoned += 1,
            _ => {}
        }
        self.outcomes.push((zpid.to_string(), state));
    }

    pub fn state_of(&self, zpid: &str) -> Option<EntityState> {
        self.outcomes
            .iter()
            .rev()
            .find(|(id, _)| id == zpid)
            .map(|(_, state)| *state)
    }
}

/// Drives one scrape: search pages, skip known ids, fetch and flatten each
/// new listing, persist it straight away.
pub struct Coordinator<T: Transport> {
    scraper: ZillowScraper<T>,
    store: DedupStore,
    max_details: usize,
    ledger: Option<Database>,
    cancel: Arc<AtomicBool>,
    /// Records acquired but not yet on disk.
    buffer: Vec<PropertyRecord>,
}

impl<T: Transport> Coordinator<T> {
    pub fn new(scraper: ZillowScraper<T>, store: DedupStore, max_details: usize) -> Self {
        Self {
            scraper,
            store,
            max_details,
            ledger: None,
            cancel: Arc::new(AtomicBool::new(false)),
            buffer: Vec::new(),
        }
    }

    pub fn with_ledger(mut self, db: Database) -> Self {
        self.ledger = Some(db);
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn run(&mut self, delay: Duration, max_retries: u32) -> RunSummary {
        info!("Starting Zillow data collection");

        let run_id = self.start_ledger();
        let mut summary = RunSummary::default();

        if let Err(e) = self.collect(delay, max_retries, &mut summary) {
            error!("Failed to get search results after all retries: {e}");
            summary.aborted = Some(e.to_string());
        }

        // Anything still buffered goes to disk before we return.
        if !self.buffer.is_empty() {
            info!(buffered = self.buffer.len(), "Saving buffered properties");
            if !self.flush(&mut summary) {
                for record in self.buffer.drain(..) {
                    error!(zpid = %record.zpid, "Property could not be saved");
                    summary.settle(&record.zpid, EntityState::Abandoned);
                }
            }
        }

        if summary.persisted > 0 {
            info!(count = summary.persisted, "Scraped new properties");
        } else {
            info!("No new properties to save");
        }
        info!(
            pages = summary.pages_fetched,
            found = summary.listings_found,
            skipped = summary.skipped,
            persisted = summary.persisted,
            abandoned = summary.abandoned,
            cancelled = summary.cancelled,
            "Run finished"
        );

        self.finish_ledger(run_id, &summary);
        summary
    }

    fn collect(
        &mut self,
        delay: Duration,
        max_retries: u32,
        summary: &mut RunSummary,
    ) -> Result<(), ScraperError> {
        let policy = RetryPolicy::new(max_retries, delay);

        let scraper = &self.scraper;
        let pages = policy.run("search results", || {
            let result = scraper.fetch_all_pages();
            if result.listings.is_empty() {
                Err(ScraperError::NoResults)
            } else {
                Ok(result)
            }
        })?;

        summary.pages_fetched = pages.pages_fetched;
        summary.listings_found = pages.listings.len();
        info!(count = pages.listings.len(), "Found properties");

        let known = self.store.load();

        let mut queue = Vec::new();
        for listing in pages.listings {
            if known.contains(&listing.zpid) || queue.contains(&listing.zpid) {
                info!(zpid = %listing.zpid, "Skipping existing property");
                summary.settle(&listing.zpid, EntityState::Skipped);
                continue;
            }
            debug!(zpid = %listing.zpid, state = %EntityState::Pending, "Queued property");
            queue.push(listing.zpid);
        }

        if queue.len() > self.max_details {
            info!(
                cap = self.max_details,
                dropped = queue.len() - self.max_details,
                "Capping listings for this run"
            );
            queue.truncate(self.max_details);
        }

        for zpid in queue {
            if self.cancelled() {
                info!("Operation interrupted by user");
                summary.cancelled = true;
                break;
            }

            match self.acquire(&zpid, &policy) {
                Some(record) => {
                    // Persist right away; a failed save keeps the record
                    // buffered and unsettled until a later save lands.
                    self.buffer.push(record);
                    self.flush(summary);
                    self.pause(delay);
                }
                None => summary.settle(&zpid, EntityState::Abandoned),
            }
        }

        if !summary.cancelled && self.cancelled() {
            summary.cancelled = true;
        }

        Ok(())
    }

    /// Fetches and flattens one pending listing. `None` once retries run out.
    fn acquire(&self, zpid: &str, policy: &RetryPolicy) -> Option<PropertyRecord> {
        info!(zpid, state = %EntityState::Fetching, "Processing property");
        let fetched = policy.run(&format!("ZPID {zpid}"), || {
            self.scraper
                .fetch_detail(zpid)
                .ok_or_else(|| ScraperError::DetailUnavailable(zpid.to_string()))
        });

        match fetched {
            Ok(doc) => {
                debug!(zpid, state = %EntityState::Normalizing, "Normalizing property");
                Some(normalize(&doc, zpid, Local::now().naive_local()))
            }
            Err(e) => {
                warn!(zpid, "Abandoning property: {e}");
                None
            }
        }
    }

    /// Writes the buffer through the store. Every record that reaches disk
    /// settles as persisted; returns false when nothing was written.
    fn flush(&mut self, summary: &mut RunSummary) -> bool {
        let outcome = self.store.merge_and_persist(&self.buffer);
        if !outcome.is_flushed() {
            warn!(
                buffered = self.buffer.len(),
                "Records not written, keeping them for the next save"
            );
            return false;
        }

        for record in self.buffer.drain(..) {
            summary.settle(&record.zpid, EntityState::Persisted);
        }
        true
    }

    /// Sleeps for `delay`, waking early if the run is cancelled.
    fn pause(&self, delay: Duration) {
        let start = Instant::now();
        while !self.cancelled() {
            let elapsed = start.elapsed();
            if elapsed >= delay {
                break;
            }
            std::thread::sleep((delay - elapsed).min(CANCEL_POLL));
        }
    }

    fn start_ledger(&self) -> Option<i64> {
        let db = self.ledger.as_ref()?;
        let started = init_db(db).and_then(|_| {
            db.with_conn(|conn| {
                if let Some(last) = recent_runs(conn, 1)?.into_iter().next() {
                    info!(
                        started_at = %last.started_at,
                        persisted = last.persisted.unwrap_or(0),
                        success = last.success,
                        "Previous run"
                    );
                }
                start_run(conn, Local::now().naive_local())
            })
        });

        match started {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Could not record run start: {e}");
                None
            }
        }
    }

    fn finish_ledger(&self, run_id: Option<i64>, summary: &RunSummary) {
        let (Some(db), Some(run_id)) = (self.ledger.as_ref(), run_id) else {
            return;
        };

        let result = db.with_conn(|conn| {
            finish_run(
                conn,
                run_id,
                Local::now().naive_local(),
                summary,
                summary.aborted.as_deref(),
            )
        });

        if let Err(e) = result {
            warn!("Could not record run end: {e}");
        }
    }
}
