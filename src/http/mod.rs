//! HTTP download client with bounded retries.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use std::io::Write;

/// Maximum number of attempts for a single download.
const MAX_RETRIES: usize = 3;

/// Delay between attempts in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// Errors that will not succeed on retry.
#[derive(Debug)]
pub enum NonRetryableError {
    /// The release asset does not exist (HTTP 404).
    NotFound(String),
    /// Other 4xx responses.
    ClientError(String),
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::NotFound(msg) => write!(f, "Not found: {}", msg),
            NonRetryableError::ClientError(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// Classifies a status error from `error_for_status()`.
/// Retryable errors pass through unchanged; client errors are replaced with
/// a [`NonRetryableError`] carrying a user-facing message.
fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match error.status() {
        Some(StatusCode::NOT_FOUND) => anyhow::Error::from(NonRetryableError::NotFound(
            "the requested release asset does not exist".to_string(),
        )),
        Some(s) if s.is_client_error() => anyhow::Error::from(NonRetryableError::ClientError(
            format!("HTTP {} error", s.as_u16()),
        )),
        // 5xx and transport errors are worth retrying.
        _ => anyhow::Error::from(error),
    }
}

/// HTTP client for downloading release assets.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Downloads a file from a URL, streaming it into a caller-created
    /// writer. Transient failures are retried up to [`MAX_RETRIES`] times;
    /// 4xx responses fail immediately. Returns the number of bytes written.
    #[tracing::instrument(skip(self, create_writer))]
    pub async fn download_file<W, F>(&self, url: &str, create_writer: F) -> Result<u64>
    where
        W: Write,
        F: Fn() -> Result<W>,
    {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match self.download_once(url, &create_writer).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    if e.downcast_ref::<NonRetryableError>().is_some() {
                        return Err(e);
                    }

                    if attempt < MAX_RETRIES {
                        warn!(
                            "Download attempt {}/{} failed ({}), retrying...",
                            attempt, MAX_RETRIES, e
                        );
                        tokio::time::sleep(std::time::Duration::from_millis(RETRY_DELAY_MS)).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow::anyhow!("Download failed after {} attempts", MAX_RETRIES)))
    }

    /// Single download attempt without retry.
    async fn download_once<W, F>(&self, url: &str, create_writer: &F) -> Result<u64>
    where
        W: Write,
        F: Fn() -> Result<W>,
    {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to start download request")?;

        let mut response = response.error_for_status().map_err(check_retryable)?;

        let mut writer = create_writer()?;
        let mut downloaded_bytes: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to read chunk from download stream")?
        {
            writer
                .write_all(&chunk)
                .context("Failed to write chunk to file")?;
            downloaded_bytes += chunk.len() as u64;
        }

        debug!(
            "Downloaded {:.2} MB",
            downloaded_bytes as f64 / (1024.0 * 1024.0)
        );

        Ok(downloaded_bytes)
    }
}
