//! Remote fetcher for corpus exports
//!
//! Opens an HTTPS GET and exposes the response body as an ordered byte
//! stream. Transport failures and non-2xx responses are terminal: the
//! stream is never partially consumed as valid data, and no retries are
//! performed here — retry policy belongs to the external scheduler.

use std::io::Read;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while opening a source stream
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Configuration for the fetcher
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string sent with every request
    pub user_agent: String,
    /// Optional overall request timeout. None means no timeout; the
    /// caller may bound process lifetime externally.
    pub timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("zhcorpus/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
        }
    }
}

/// Blocking HTTP fetcher for compressed corpus exports.
///
/// Automatic content decoding is disabled: the payloads are compressed
/// files (`.gz`, `.tar.bz2`), and decompression is the pipeline's job,
/// not the transport's.
pub struct Fetcher {
    client: reqwest::blocking::Client,
}

impl Fetcher {
    /// Build a fetcher from configuration
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        } else {
            // reqwest's blocking client defaults to 30s; the contract here
            // is "no timeout unless configured"
            builder = builder.timeout(None);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Open a URL and return the response body as a byte stream.
    ///
    /// A non-success status is reported before any body bytes are read,
    /// so downstream stages never see garbage from an error page.
    pub fn open(&self, url: &str) -> Result<impl Read, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}
