//! HTTP catalog backend.
//!
//! Talks to a catalog service exposing `GET /instruments` and `GET /sources`
//! as JSON arrays of the §3 wire shapes. Blocking client — callers run it on
//! the worker thread, never on the UI loop.

use std::time::Duration;

use crate::domain::{Instrument, Source};
use crate::provider::{CatalogError, CatalogProvider};

pub struct HttpCatalog {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CatalogError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CatalogError::Transport(format!("build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| CatalogError::Transport(format!("GET {url}: {e}")))?
            .error_for_status()
            .map_err(|e| CatalogError::Transport(format!("GET {url}: {e}")))?;
        response
            .json()
            .map_err(|e| CatalogError::Decode(format!("decode {url}: {e}")))
    }
}

impl CatalogProvider for HttpCatalog {
    fn name(&self) -> &str {
        &self.base_url
    }

    fn list_instruments(&self) -> Result<Vec<Instrument>, CatalogError> {
        self.get_json("instruments")
    }

    fn list_sources(&self) -> Result<Vec<Source>, CatalogError> {
        self.get_json("sources")
    }
}
