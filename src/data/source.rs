//! Retrieval of the raw time-series CSVs.

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::domain::Kind;
use crate::error::HistoryError;

const URL_CONFIRMED: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_confirmed_global.csv";
const URL_DEATHS: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_deaths_global.csv";
const URL_RECOVERED: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_recovered_global.csv";

/// Fetch a document as text.
///
/// Implementations must be shareable across the threads that fetch the three
/// datasets concurrently.
pub trait FetchText: Send + Sync {
    fn fetch_text(&self, url: &str) -> Result<String, HistoryError>;
}

/// Where each dataset is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrls {
    pub confirmed: String,
    pub deaths: String,
    pub recovered: String,
}

impl SourceUrls {
    pub fn url(&self, kind: Kind) -> &str {
        match kind {
            Kind::Confirmed => &self.confirmed,
            Kind::Deaths => &self.deaths,
            Kind::Recovered => &self.recovered,
        }
    }
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            confirmed: URL_CONFIRMED.to_string(),
            deaths: URL_DEATHS.to_string(),
            recovered: URL_RECOVERED.to_string(),
        }
    }
}

/// Blocking HTTP fetcher. No retries: a failed request fails the run.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, HistoryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HistoryError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl FetchText for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, HistoryError> {
        let start = Instant::now();
        debug!("Fetching {url}");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| HistoryError::network(url, format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(HistoryError::network(
                url,
                format!("request failed with status {}", resp.status()),
            ));
        }

        let text = resp
            .text()
            .map_err(|e| HistoryError::network(url, format!("failed to read body: {e}")))?;

        info!(
            "Fetched {url} - bytes={}, duration={:.2}s",
            text.len(),
            start.elapsed().as_secs_f32()
        );
        Ok(text)
    }
}
