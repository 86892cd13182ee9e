//! Blocking HTTP client for the catalog API.

use std::time::Duration;

use pokedex_core::{PageCursor, Pokemon, PAGE_SIZE};
use reqwest::blocking::Client;
use tracing::debug;

use crate::error::FetchError;

/// Default host of the public catalog API.
pub const DEFAULT_BASE_URL: &str = "https://nestjs-pokedex-api.vercel.app";
/// Default collection path under the base URL.
pub const DEFAULT_COLLECTION: &str = "pokemons";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings for the catalog API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    /// Scheme and host, optionally with a path prefix.
    pub base_url: String,
    /// Collection path listing the records.
    pub collection: String,
    /// Timeout applied to each request.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            collection: DEFAULT_COLLECTION.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    /// URL of a single page, e.g. `https://host/pokemons?limit=50&page=2`.
    #[must_use]
    pub fn page_url(&self, page: PageCursor) -> String {
        format!(
            "{}/{}?limit={}&page={}",
            self.base_url.trim_end_matches('/'),
            self.collection.trim_matches('/'),
            PAGE_SIZE,
            page.get()
        )
    }
}

/// Source of catalog pages.
pub trait PageSource: Send + 'static {
    /// Fetches the records of a single page.
    fn fetch_page(&self, page: PageCursor) -> Result<Vec<Pokemon>, FetchError>;
}

/// Decodes a page body into records.
pub fn decode_page(body: &[u8]) -> Result<Vec<Pokemon>, FetchError> {
    Ok(serde_json::from_slice(body)?)
}

/// [`PageSource`] backed by the catalog HTTP API.
#[derive(Debug)]
pub struct HttpPageSource {
    config: ApiConfig,
    client: Client,
}

impl HttpPageSource {
    /// Builds a client for the provided configuration.
    pub fn new(config: ApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }
}

impl PageSource for HttpPageSource {
    fn fetch_page(&self, page: PageCursor) -> Result<Vec<Pokemon>, FetchError> {
        let url = self.config.page_url(page);
        debug!(%url, "fetching page");

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unexpected status");
            let body = response.text().unwrap_or_default();
            let message = if body.trim().is_empty() {
                reason.to_owned()
            } else {
                body
            };
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes()?;
        let pokemon = decode_page(&body)?;
        debug!(page = page.get(), count = pokemon.len(), "page decoded");
        Ok(pokemon)
    }
}
