//! The fetch seam for linked and imported stylesheets.
//!
//! The core never performs I/O itself. It asks a [`Fetch`] implementation for
//! stylesheet text and treats every error as an empty contribution.
//!
//! - [`MapFetcher`]: in-memory fixture keyed by URL
//! - `HttpFetcher` (feature `http`): `reqwest`-backed network fetch

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::FetchError;

/// Asynchronous source of stylesheet text.
///
/// Passes run on a single-threaded cooperative executor, so implementations
/// need not be `Send`.
#[async_trait(?Send)]
pub trait Fetch {
    /// Fetches the CSS text at `url`.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Serves stylesheets from a fixed URL → text map.
///
/// Unknown URLs fail with a 404 [`FetchError::Status`].
#[derive(Debug, Clone, Default)]
pub struct MapFetcher {
    sheets: HashMap<String, String>,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, css: impl Into<String>) -> Self {
        self.sheets.insert(url.into(), css.into());
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, css: impl Into<String>) {
        self.sheets.insert(url.into(), css.into());
    }
}

#[async_trait(?Send)]
impl Fetch for MapFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.sheets
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use async_trait::async_trait;

    use super::Fetch;
    use crate::error::FetchError;

    /// Fetches stylesheets over HTTP(S).
    #[derive(Debug, Clone, Default)]
    pub struct HttpFetcher {
        client: reqwest::Client,
    }

    impl HttpFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Uses a preconfigured client (timeouts, headers, proxies).
        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    #[async_trait(?Send)]
    impl Fetch for HttpFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            let transport = |e: reqwest::Error| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            };
            let response = self.client.get(url).send().await.map_err(transport)?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            response.text().await.map_err(transport)
        }
    }
}
