use crate::archive::error::ArchiveError;
use crate::archive::retry::{with_retry, RetryPolicy};
use crate::types::query::ArchiveQuery;
use log::info;
use reqwest::{Client, Url};

/// Issues the archive GET request and returns the raw response body.
///
/// Server-side HTTP errors are retried per the [`RetryPolicy`]; every other
/// transport failure propagates immediately.
pub struct ArchiveFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl ArchiveFetcher {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            client: Client::new(),
            retry,
        }
    }

    pub async fn fetch(&self, query: &ArchiveQuery) -> Result<String, ArchiveError> {
        let url = query.to_url()?;
        with_retry(&self.retry, ArchiveError::is_transient, || {
            self.request(url.clone())
        })
        .await
    }

    async fn request(&self, url: Url) -> Result<String, ArchiveError> {
        info!("GET {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ArchiveError::Request(url.to_string(), e))?;

        match response.error_for_status() {
            Ok(response) => response
                .text()
                .await
                .map_err(|e| ArchiveError::Request(url.to_string(), e)),
            Err(e) => Err(match e.status() {
                Some(status) if status.is_server_error() => ArchiveError::ServerStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                },
                Some(status) => ArchiveError::HttpStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                },
                None => ArchiveError::Request(url.to_string(), e),
            }),
        }
    }
}

impl Default for ArchiveFetcher {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}
