//! The cached `get_history` entry point.
//!
//! A request is validated, looked up in the per-query cache, and only on a
//! miss (or after expiry) runs the full pipeline. A failed run returns the
//! error and leaves whatever was cached before in place.

use std::sync::Arc;

use tracing::{debug, info};

use crate::app::pipeline::run_history;
use crate::cache::KeyedCache;
use crate::config::ServiceConfig;
use crate::data::{FetchText, HttpFetcher, SourceUrls};
use crate::domain::{HistoryQuery, HistoryResult, Kind};
use crate::error::HistoryError;
use crate::io::normalize::EmptySeriesPolicy;

/// Where a served result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Fresh,
}

/// A history result together with its origin.
#[derive(Debug, Clone)]
pub struct Served {
    pub result: Arc<HistoryResult>,
    pub origin: Origin,
}

pub struct HistoryService<F> {
    fetcher: F,
    sources: SourceUrls,
    empty_series: EmptySeriesPolicy,
    cache: KeyedCache<HistoryQuery, HistoryResult>,
}

impl HistoryService<HttpFetcher> {
    /// Service backed by the blocking HTTP fetcher.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, HistoryError> {
        let fetcher = HttpFetcher::new(config.http_timeout)?;
        let service = Self::new(fetcher, config);
        info!("History cache ttl={:?}", service.cache.expiry());
        Ok(service)
    }
}

impl<F: FetchText> HistoryService<F> {
    pub fn new(fetcher: F, config: &ServiceConfig) -> Self {
        Self {
            fetcher,
            sources: config.sources.clone(),
            empty_series: config.empty_series,
            cache: KeyedCache::new(config.cache_ttl),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn cache(&self) -> &KeyedCache<HistoryQuery, HistoryResult> {
        &self.cache
    }

    /// Merged history for an optional filter name.
    ///
    /// An unknown filter is rejected before anything is fetched.
    pub fn get_history(&self, filter: Option<&str>, include_geo: bool) -> Result<Arc<HistoryResult>, HistoryError> {
        let filter = Kind::parse_filter(filter)?;
        let query = HistoryQuery { filter, include_geo };
        Ok(self.serve(query)?.result)
    }

    /// Serve `query` from cache when fresh, otherwise run the pipeline.
    pub fn serve(&self, query: HistoryQuery) -> Result<Served, HistoryError> {
        if let Some(result) = self.cache.fresh(&query) {
            debug!("Cache hit - {query:?}");
            return Ok(Served {
                result,
                origin: Origin::Cache,
            });
        }

        debug!("Cache miss - {query:?}");
        let result = Arc::new(run_history(
            &self.fetcher,
            &self.sources,
            &query,
            self.empty_series,
        )?);
        self.cache.set(query, Arc::clone(&result));

        Ok(Served {
            result,
            origin: Origin::Fresh,
        })
    }

    pub fn clear_cache(&self) {
        info!("Clearing history cache");
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::{StubFetcher, sample_sources};

    fn service(ttl: Duration) -> HistoryService<StubFetcher> {
        let config = ServiceConfig {
            sources: sample_sources(),
            cache_ttl: ttl,
            ..ServiceConfig::default()
        };
        HistoryService::new(StubFetcher::with_samples(), &config)
    }

    #[test]
    fn invalid_filter_is_rejected_before_fetching() {
        let svc = service(Duration::from_secs(60));
        let err = svc.get_history(Some("active"), false).unwrap_err();
        assert_eq!(err, HistoryError::Validation("active".to_string()));
        assert_eq!(svc.fetcher().calls(), 0);
    }

    #[test]
    fn repeated_requests_within_window_are_served_from_memory() {
        let svc = service(Duration::from_secs(60));
        let first = svc.get_history(None, false).unwrap();
        let second = svc.get_history(None, false).unwrap();
        assert_eq!(svc.fetcher().calls(), 3);
        assert!(Arc::ptr_eq(&first, &second));

        let served = svc.serve(HistoryQuery { filter: None, include_geo: false }).unwrap();
        assert_eq!(served.origin, Origin::Cache);
    }

    #[test]
    fn each_request_shape_has_its_own_slot() {
        let svc = service(Duration::from_secs(60));
        let all = svc.get_history(None, false).unwrap();
        let deaths = svc.get_history(Some("deaths"), false).unwrap();
        let deaths_geo = svc.get_history(Some("deaths"), true).unwrap();
        assert_eq!(svc.fetcher().calls(), 5);

        assert!(all.regions["Hubei"].confirmed.is_some());
        assert!(deaths.regions["Hubei"].confirmed.is_none());
        assert!(deaths.regions["Hubei"].geo.is_none());
        assert!(deaths_geo.regions["Hubei"].geo.is_some());

        // Still cached after the other shapes were stored.
        let again = svc.get_history(None, false).unwrap();
        assert!(Arc::ptr_eq(&all, &again));
    }

    #[test]
    fn expired_entry_triggers_a_new_run() {
        let svc = service(Duration::from_millis(300));
        svc.get_history(Some("confirmed"), false).unwrap();
        std::thread::sleep(Duration::from_millis(500));

        let served = svc
            .serve(HistoryQuery {
                filter: Some(Kind::Confirmed),
                include_geo: false,
            })
            .unwrap();
        assert_eq!(served.origin, Origin::Fresh);
        assert_eq!(svc.fetcher().calls(), 2);
    }

    #[test]
    fn failed_refresh_keeps_previous_entry() {
        let svc = service(Duration::ZERO);
        let query = HistoryQuery {
            filter: Some(Kind::Recovered),
            include_geo: false,
        };
        let good = svc.serve(query).unwrap().result;

        svc.fetcher().set_failing("recovered", true);
        let err = svc.get_history(Some("recovered"), false).unwrap_err();
        assert!(matches!(err, HistoryError::Network { .. }));

        let kept = svc.cache().get(&query).unwrap();
        assert!(Arc::ptr_eq(&good, &kept));
    }

    #[test]
    fn cache_uses_configured_ttl() {
        let svc = service(Duration::from_millis(1500));
        assert_eq!(svc.cache().expiry(), Duration::from_millis(1500));
    }

    #[test]
    fn concurrent_refreshes_leave_a_complete_result() {
        let svc = service(Duration::from_millis(100));
        svc.get_history(None, false).unwrap();
        std::thread::sleep(Duration::from_millis(200));

        let results: Vec<Arc<HistoryResult>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| svc.get_history(None, false).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for result in &results {
            assert_eq!(result.regions.len(), 4);
            assert!(result.regions.keys().eq(result.sort_order.keys()));
        }
        // Every run fetches all three kinds; overlapping runs may both fetch.
        assert!(svc.fetcher().calls() >= 6);
        assert_eq!(svc.fetcher().calls() % 3, 0);

        let cached = svc
            .cache()
            .get(&HistoryQuery { filter: None, include_geo: false })
            .unwrap();
        assert!(results.iter().any(|r| Arc::ptr_eq(r, &cached)));
    }

    #[test]
    fn clear_forces_a_rerun() {
        let svc = service(Duration::from_secs(60));
        svc.get_history(Some("deaths"), false).unwrap();
        svc.clear_cache();
        svc.get_history(Some("deaths"), false).unwrap();
        assert_eq!(svc.fetcher().calls(), 2);
    }
}
