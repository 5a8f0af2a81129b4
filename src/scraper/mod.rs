pub mod client;
pub mod models;
mod scraper;
mod scraper_error;

pub use client::{Transport, ZillowClient};
pub use scraper::{PaginatedResult, ZillowScraper};
pub use scraper_error::ScraperError;
