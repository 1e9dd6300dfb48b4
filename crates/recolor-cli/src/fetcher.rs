//! Local (and optionally remote) stylesheet fetching for the CLI.

use async_trait::async_trait;
use recolor::{Fetch, FetchError};
use url::Url;

/// Reads `file://` URLs from disk; `http(s)://` URLs go over the network
/// when built with the `http` feature.
#[derive(Debug, Default)]
pub struct CliFetcher {
    #[cfg(feature = "http")]
    http: recolor::HttpFetcher,
}

impl CliFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait(?Send)]
impl Fetch for CliFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        match parsed.scheme() {
            "file" => {
                let path = parsed.to_file_path().map_err(|()| FetchError::Transport {
                    url: url.to_string(),
                    message: "not a local path".to_string(),
                })?;
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| FetchError::Io {
                        url: url.to_string(),
                        source,
                    })
            }
            #[cfg(feature = "http")]
            "http" | "https" => self.http.fetch(url).await,
            scheme => Err(FetchError::Transport {
                url: url.to_string(),
                message: format!("unsupported scheme '{scheme}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.css");
        std::fs::write(&path, "a { color: red }").unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let css = CliFetcher::new().fetch(url.as_str()).await.unwrap();
        assert_eq!(css, "a { color: red }");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("missing.css")).unwrap();
        let err = CliFetcher::new().fetch(url.as_str()).await;
        assert!(matches!(err, Err(FetchError::Io { .. })));
    }

    #[tokio::test]
    async fn test_unknown_scheme() {
        let err = CliFetcher::new().fetch("gopher://a.test/x.css").await;
        assert!(matches!(err, Err(FetchError::Transport { .. })));
    }
}
