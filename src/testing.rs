//! Fixtures shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::data::{FetchText, SourceUrls};
use crate::error::HistoryError;

pub const CONFIRMED_CSV: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
Hubei,Mainland China,30.9756,112.2707,444,444,549
,Italy,43.0,12.0,0,20,50
,US,37.0902,-95.7129,1,1,
";

pub const DEATHS_CSV: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
Hubei,Mainland China,30.9756,112.2707,1,2,4
,Italy,43.0,12.0,0,7,30
,US,37.0902,-95.7129,0,0,0
";

pub const RECOVERED_CSV: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
Hubei,Mainland China,30.9756,112.2707,0,10,20
,Italy,43.0,12.0,0,1,2
Diamond Princess,Others,35.4437,139.638,0,0,3
";

pub fn sample_sources() -> SourceUrls {
    SourceUrls {
        confirmed: "stub://confirmed".to_string(),
        deaths: "stub://deaths".to_string(),
        recovered: "stub://recovered".to_string(),
    }
}

/// In-memory fetcher keyed by URL that counts requests.
pub struct StubFetcher {
    bodies: HashMap<String, String>,
    failing: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn with_samples() -> Self {
        let sources = sample_sources();
        let bodies = [
            (sources.confirmed, CONFIRMED_CSV),
            (sources.deaths, DEATHS_CSV),
            (sources.recovered, RECOVERED_CSV),
        ]
        .into_iter()
        .map(|(url, body)| (url, body.to_string()))
        .collect();
        Self {
            bodies,
            failing: Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Serve `body` for the stub URL of `kind`.
    pub fn serving(mut self, kind: &str, body: &str) -> Self {
        self.bodies.insert(format!("stub://{kind}"), body.to_string());
        self
    }

    /// Make the stub URL of `kind` fail with a network error.
    pub fn failing(self, kind: &str) -> Self {
        self.set_failing(kind, true);
        self
    }

    pub fn set_failing(&self, kind: &str, fail: bool) {
        let url = format!("stub://{kind}");
        let mut failing = self.failing.lock().unwrap();
        if fail {
            failing.insert(url);
        } else {
            failing.remove(&url);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FetchText for StubFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, HistoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(url) {
            return Err(HistoryError::network(url, "connection refused"));
        }
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| HistoryError::network(url, "request failed with status 404 Not Found"))
    }
}
