//! Image fetching.
//!
//! The pipeline only depends on the [`Fetcher`] trait; [`CurlFetcher`] is the
//! libcurl-backed implementation used by the CLI. One attempt per call, no
//! retries.

mod error;

use std::time::Duration;

use crate::config::LocalizerConfig;

pub use error::{classify_curl_error, FetchError, FetchErrorKind};

/// Body and declared type of a successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    /// Raw `Content-Type` of the final response, if any.
    pub content_type: Option<String>,
}

/// Trait implemented by anything that can GET a URL.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedImage, FetchError>;
}

/// Blocking GET via libcurl. Follows redirects; non-2xx is an error.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    connect_timeout: Duration,
    max_redirects: u32,
    user_agent: Option<String>,
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self::from_config(&LocalizerConfig::default())
    }
}

impl CurlFetcher {
    pub fn from_config(cfg: &LocalizerConfig) -> Self {
        Self {
            connect_timeout: cfg.connect_timeout(),
            max_redirects: cfg.max_redirects,
            user_agent: cfg.user_agent.clone(),
        }
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedImage, FetchError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirects)?;
        easy.connect_timeout(self.connect_timeout.min(timeout))?;
        easy.timeout(timeout)?;
        if let Some(agent) = &self.user_agent {
            easy.useragent(agent)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        if !(200..300).contains(&status) {
            return Err(FetchError::Http { status });
        }

        let content_type = easy.content_type()?.map(str::to_string);
        tracing::debug!(url, status, bytes = body.len(), ?content_type, "fetched image");
        Ok(FetchedImage {
            bytes: body,
            content_type,
        })
    }
}
