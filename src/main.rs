use crate::cli::Args;
use crate::config::ScraperConfig;
use crate::coordinator::Coordinator;
use crate::db::connection::Database;
use crate::logging::init_logging;
use crate::scraper::{ZillowClient, ZillowScraper};
use crate::store::DedupStore;
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

mod cli;
mod config;
mod coordinator;
mod db;
mod domain;
mod errors;
mod logging;
mod retry;
mod scraper;
mod spreadsheets;
mod store;

#[cfg(test)]
mod tests;

fn main() {
    let args = Args::parse();
    let verbose = args.verbose;
    let config = args.into_config();

    // Held until exit so the file writer drains.
    let _guard = match init_logging(&config.logs_dir, verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Logging initialization failed: {e}");
            std::process::exit(1);
        }
    };

    match run(config) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("Scraper failed to start: {e:#}");
            std::process::exit(1);
        }
    }
}

/// Returns `false` when the search phase failed and nothing was processed.
fn run(config: ScraperConfig) -> anyhow::Result<bool> {
    let client = ZillowClient::new(&config.session)?;
    let scraper = ZillowScraper::new(
        client,
        config.search.clone(),
        config.max_pages,
        config.page_delay,
    );
    let store = DedupStore::new(config.store.clone());
    info!(path = %store.policy().primary_path().display(), "Using data file");

    let cancel = Arc::new(AtomicBool::new(false));
    spawn_interrupt_listener(Arc::clone(&cancel));

    let mut coordinator = Coordinator::new(scraper, store, config.max_details).with_cancel(cancel);
    if let Some(path) = &config.ledger_path {
        coordinator = coordinator.with_ledger(Database::new(path));
    }

    let summary = coordinator.run(config.delay, config.max_retries);
    Ok(summary.aborted.is_none())
}

/// First Ctrl-C asks the run to wind down and save; a second one exits.
fn spawn_interrupt_listener(cancel: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                warn!("Ctrl-C handling unavailable: {e}");
                return;
            }
        };

        rt.block_on(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, saving buffered properties (Ctrl-C again to exit now)");
                cancel.store(true, Ordering::SeqCst);
            }
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        });
    });
}
