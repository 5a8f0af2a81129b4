// client.rs
use crate::config::SessionConfig;
use crate::scraper::ScraperError;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use serde_json::Value;

/// The HTTP seam. Everything above it deals in JSON values only.
pub trait Transport {
    fn put_json(&self, url: &str, body: &Value) -> Result<Value, ScraperError>;
    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, ScraperError>;
}

pub struct ZillowClient {
    client: Client,
}

impl ZillowClient {
    pub fn new(session: &SessionConfig) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &session.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ScraperError::Config(format!("bad header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ScraperError::Config(format!("bad header value for {name}: {e}")))?;
            headers.insert(name, value);
        }
        if let Some(cookies) = &session.cookies {
            let value = HeaderValue::from_str(cookies)
                .map_err(|e| ScraperError::Config(format!("bad cookie header: {e}")))?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .user_agent(session.user_agent.as_str())
            .default_headers(headers)
            .timeout(session.timeout)
            .build()?;

        Ok(Self { client })
    }

    fn read_json(resp: Response) -> Result<Value, ScraperError> {
        let status = resp.status();
        let text = resp.text()?;

        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }

        serde_json::from_str(&text).map_err(|e| ScraperError::JsonParse(e.to_string()))
    }
}

impl Transport for ZillowClient {
    fn put_json(&self, url: &str, body: &Value) -> Result<Value, ScraperError> {
        let resp = self.client.put(url).json(body).send()?;
        Self::read_json(resp)
    }

    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, ScraperError> {
        let resp = self.client.get(url).query(query).send()?;
        Self::read_json(resp)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn put_json(&self, url: &str, body: &Value) -> Result<Value, ScraperError> {
        (**self).put_json(url, body)
    }

    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, ScraperError> {
        (**self).get_json(url, query)
    }
}
