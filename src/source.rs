use crate::stories::{parse_csv, RawRow};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("stories source returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Fetches the published spreadsheet export holding story rows.
#[derive(Clone)]
pub struct StorySource {
    client: reqwest::Client,
    url: String,
}

impl StorySource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// One request, no retries.
    pub async fn fetch_rows(&self) -> Result<Vec<RawRow>, FetchError> {
        let res = self.client.get(&self.url).send().await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let text = res.text().await?;
        let rows = parse_csv(&text);
        tracing::debug!(rows = rows.len(), url = %self.url, "fetched story rows");
        Ok(rows)
    }
}

/// Tags each load so a result that arrives after a newer load began is dropped.
#[derive(Debug, Default)]
pub struct LoadGuard {
    latest: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadGuard {
    pub fn begin(&mut self) -> LoadTicket {
        self.latest += 1;
        LoadTicket(self.latest)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Passes `result` through only when `ticket` belongs to the latest load.
    pub fn settle<T>(&self, ticket: LoadTicket, result: T) -> Option<T> {
        self.is_current(ticket).then_some(result)
    }
}
