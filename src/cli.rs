//! Command-line arguments.

use crate::config::{
    ScraperConfig, DEFAULT_DELAY_SECS, DEFAULT_MAX_DETAILS, DEFAULT_MAX_PAGES,
    DEFAULT_MAX_RETRIES, DEFAULT_PAGE_DELAY_SECS,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Collect Zillow listings into a deduplicated spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "zillow_scraper")]
#[command(author, version, about)]
pub struct Args {
    /// Directory for the data file, backups and run ledger
    #[arg(long, env = "ZILLOW_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for daily log files
    #[arg(long, env = "ZILLOW_LOGS_DIR", default_value = "logs")]
    pub logs_dir: PathBuf,

    /// Seconds to wait between properties (retry backoff is twice this)
    #[arg(short, long, default_value_t = DEFAULT_DELAY_SECS)]
    pub delay_secs: u64,

    /// Seconds to wait between search pages
    #[arg(long, default_value_t = DEFAULT_PAGE_DELAY_SECS)]
    pub page_delay_secs: u64,

    /// Attempts per search pass and per property (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_retries: u32,

    /// Highest search page to request
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_pages: u32,

    /// New properties to fetch per run
    #[arg(long, default_value_t = DEFAULT_MAX_DETAILS)]
    pub max_details: usize,

    /// Cookie header sent with every request
    #[arg(long, env = "ZILLOW_COOKIES", hide_env_values = true)]
    pub cookies: Option<String>,

    /// Skip the .xlsx copy of the data file
    #[arg(long)]
    pub no_xlsx: bool,

    /// Skip recording runs in the SQLite ledger
    #[arg(long)]
    pub no_ledger: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn into_config(self) -> ScraperConfig {
        let mut config = ScraperConfig::new(self.data_dir, self.logs_dir);
        config.session = config.session.with_cookies(self.cookies);
        config.store.write_xlsx = !self.no_xlsx;
        if self.no_ledger {
            config.ledger_path = None;
        }
        config.max_pages = self.max_pages;
        config.max_details = self.max_details;
        config.page_delay = Duration::from_secs(self.page_delay_secs);
        config.delay = Duration::from_secs(self.delay_secs);
        config.max_retries = self.max_retries;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = Args::try_parse_from(["zillow_scraper"]).unwrap();
        assert_eq!(args.delay_secs, 2);
        assert_eq!(args.max_retries, 3);
        assert_eq!(args.max_details, 15);
        assert!(!args.no_xlsx);

        let config = args.into_config();
        assert_eq!(config.delay, Duration::from_secs(2));
        assert_eq!(config.page_delay, Duration::from_secs(3));
        assert!(config.store.write_xlsx);
        assert!(config.ledger_path.is_some());
    }

    #[test]
    fn test_cli_flags_reach_config() {
        let args = Args::try_parse_from([
            "zillow_scraper",
            "--data-dir",
            "/tmp/z",
            "--no-xlsx",
            "--no-ledger",
            "-r",
            "5",
            "--max-pages",
            "4",
        ])
        .unwrap();

        let config = args.into_config();
        assert_eq!(config.store.primary_path(), PathBuf::from("/tmp/z/zillow_data.csv"));
        assert!(!config.store.write_xlsx);
        assert!(config.ledger_path.is_none());
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.max_pages, 4);
    }

    #[test]
    fn test_cli_rejects_zero_retries() {
        assert!(Args::try_parse_from(["zillow_scraper", "-r", "0"]).is_err());
    }
}
