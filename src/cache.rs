//! Time-bounded in-memory cache.
//!
//! [`TimedSlot`] is the single-value primitive: a stored value plus the instant
//! it was set. [`KeyedCache`] holds one slot per request shape so different
//! filters never overwrite each other.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::HistoryError;

/// Validate an expiry given in (possibly fractional) seconds.
pub fn expiry_from_secs(secs: f64) -> Result<Duration, HistoryError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(HistoryError::InvalidConfig(format!(
            "cache expiry must be a non-negative number of seconds, got {secs}"
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| HistoryError::InvalidConfig(format!("cache expiry {secs}s: {e}")))
}

/// One cached value with a freshness window.
///
/// Freshness is reported separately from the value: `get` returns whatever is
/// stored, and callers consult `is_expired` to decide whether to refresh.
#[derive(Debug)]
pub struct TimedSlot<V> {
    expiry: Duration,
    value: Option<Arc<V>>,
    set_at: Option<Instant>,
}

impl<V> TimedSlot<V> {
    pub fn new(expiry: Duration) -> Self {
        Self {
            expiry,
            value: None,
            set_at: None,
        }
    }

    /// Build a slot from an expiry in seconds, rejecting negative or
    /// non-finite values.
    pub fn from_secs(secs: f64) -> Result<Self, HistoryError> {
        Ok(Self::new(expiry_from_secs(secs)?))
    }

    /// Replace the stored value and restart the freshness window.
    pub fn set(&mut self, value: Arc<V>) {
        self.value = Some(value);
        self.set_at = Some(Instant::now());
    }

    pub fn get(&self) -> Option<Arc<V>> {
        self.value.clone()
    }

    /// `false` until the first `set`; afterwards true once the expiry has elapsed.
    pub fn is_expired(&self) -> bool {
        match self.set_at {
            None => false,
            Some(at) => at.elapsed() >= self.expiry,
        }
    }

    /// Drop the stored value. The set time is kept.
    pub fn clear(&mut self) {
        self.value = None;
    }

    /// The stored value if one exists and has not expired.
    pub fn fresh(&self) -> Option<Arc<V>> {
        if self.is_expired() {
            return None;
        }
        self.get()
    }
}

/// A thread-safe map of timed slots sharing one expiry.
///
/// The lock is only held for lookups and swaps, never while a value is being
/// computed; two callers that both miss may both compute and the last `set`
/// wins.
#[derive(Debug)]
pub struct KeyedCache<K, V> {
    expiry: Duration,
    slots: Mutex<HashMap<K, TimedSlot<V>>>,
}

impl<K: Eq + Hash, V> KeyedCache<K, V> {
    pub fn new(expiry: Duration) -> Self {
        Self {
            expiry,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Freshness window shared by every slot.
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Fresh value for `key`, if any.
    pub fn fresh(&self, key: &K) -> Option<Arc<V>> {
        self.lock().get(key).and_then(TimedSlot::fresh)
    }

    /// Stored value for `key` regardless of freshness.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.lock().get(key).and_then(TimedSlot::get)
    }

    pub fn set(&self, key: K, value: Arc<V>) {
        let expiry = self.expiry;
        self.lock()
            .entry(key)
            .or_insert_with(|| TimedSlot::new(expiry))
            .set(value);
    }

    /// Whether the slot for `key` has expired (`false` if never set).
    pub fn is_expired(&self, key: &K) -> bool {
        self.lock().get(key).is_some_and(TimedSlot::is_expired)
    }

    /// Drop every stored value.
    pub fn clear(&self) {
        for slot in self.lock().values_mut() {
            slot.clear();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, TimedSlot<V>>> {
        // Slots are only ever swapped whole, so a poisoned map is still consistent.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
