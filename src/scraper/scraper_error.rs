use thiserror::Error;

/// Failures on the fetch side of a run.
///
/// `Network` and `HttpStatus` are transport failures, `JsonParse` and
/// `UnexpectedShape` are decode failures. `NoResults` is only produced at
/// the retry call site when a whole pagination pass came back empty.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    JsonParse(String),
    #[error("Unexpected data shape: {0}")]
    UnexpectedShape(String),
    #[error("No search results returned")]
    NoResults,
    #[error("No details for ZPID {0}")]
    DetailUnavailable(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ScraperError {
    fn from(e: reqwest::Error) -> Self {
        ScraperError::Network(e.to_string())
    }
}
