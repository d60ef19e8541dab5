//! Keyed request cache with in-flight deduplication.
//!
//! # Design
//! Each key maps to one slot. A slot is either *in flight* (the first caller
//! is fetching; later callers block on a condition variable and receive the
//! same result) or *ready* (a value plus the instant it was fetched). Ready
//! values younger than the freshness window are served without a fetch.
//!
//! Failures are handed to every waiter and the slot is removed, so the next
//! call for the key starts a fresh attempt. A slot is only replaced by the
//! flight that owns it: a `refresh` that supersedes an older flight keeps the
//! older flight from overwriting the newer value when it completes.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::ApiError;

/// Endpoint name plus ordered parameters, e.g. `books?skip=0&limit=20`.
/// Names and values are percent-encoded, so distinct parameter sets never
/// render to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(endpoint: &str) -> Self {
        Self(endpoint.to_string())
    }

    pub fn param(mut self, name: &str, value: impl fmt::Display) -> Self {
        let sep = if self.0.contains('?') { '&' } else { '?' };
        self.0.push(sep);
        self.0.push_str(&urlencoding::encode(name));
        self.0.push('=');
        self.0.push_str(&urlencoding::encode(&value.to_string()));
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type FetchResult<V> = Result<V, ApiError>;

struct Flight<V> {
    result: Mutex<Option<FetchResult<V>>>,
    done: Condvar,
}

impl<V: Clone> Flight<V> {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn complete(&self, result: FetchResult<V>) {
        *lock(&self.result) = Some(result);
        self.done.notify_all();
    }

    fn wait(&self) -> FetchResult<V> {
        let mut guard = lock(&self.result);
        loop {
            if let Some(result) = guard.as_ref() {
                return result.clone();
            }
            guard = self
                .done
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

enum Slot<V> {
    InFlight(Arc<Flight<V>>),
    Ready { value: V, fetched_at: Instant },
}

/// Completes the flight with an error if the fetch closure unwinds, so that
/// waiters are never left blocked.
struct FlightGuard<'a, V: Clone> {
    cache: &'a RequestCache<V>,
    key: &'a CacheKey,
    flight: Arc<Flight<V>>,
    armed: bool,
}

impl<V: Clone> Drop for FlightGuard<'_, V> {
    fn drop(&mut self) {
        if self.armed {
            self.cache.release(self.key, &self.flight);
            self.flight
                .complete(Err(ApiError::Transport("fetch aborted".to_string())));
        }
    }
}

pub struct RequestCache<V> {
    entries: Mutex<HashMap<CacheKey, Slot<V>>>,
    freshness: Duration,
}

impl<V: Clone> RequestCache<V> {
    pub fn new(freshness: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            freshness,
        }
    }

    /// Returns the cached value for `key` when it is still fresh, joins an
    /// in-flight fetch for `key` when one exists, and otherwise runs `fetch`.
    pub fn get_or_fetch<F>(&self, key: &CacheKey, fetch: F) -> FetchResult<V>
    where
        F: FnOnce() -> FetchResult<V>,
    {
        let flight = {
            let mut entries = lock(&self.entries);
            let pending = match entries.get(key) {
                Some(Slot::Ready { value, fetched_at })
                    if fetched_at.elapsed() < self.freshness =>
                {
                    trace!(key = %key, "cache hit");
                    return Ok(value.clone());
                }
                Some(Slot::InFlight(flight)) => Some(Arc::clone(flight)),
                _ => None,
            };
            match pending {
                Some(flight) => {
                    drop(entries);
                    trace!(key = %key, "joining in-flight request");
                    return flight.wait();
                }
                None => {
                    self.evict_expired(&mut entries);
                    self.start(&mut entries, key)
                }
            }
        };
        self.run(key, flight, fetch)
    }

    /// Starts a new fetch for `key` even if a fresh value or an in-flight
    /// request exists.
    pub fn refresh<F>(&self, key: &CacheKey, fetch: F) -> FetchResult<V>
    where
        F: FnOnce() -> FetchResult<V>,
    {
        let flight = self.start(&mut lock(&self.entries), key);
        debug!(key = %key, "forced refresh");
        self.run(key, flight, fetch)
    }

    /// Drops a ready value for `key`. In-flight requests are left alone.
    pub fn invalidate(&self, key: &CacheKey) {
        let mut entries = lock(&self.entries);
        if matches!(entries.get(key), Some(Slot::Ready { .. })) {
            entries.remove(key);
        }
    }

    pub fn clear(&self) {
        lock(&self.entries).retain(|_, slot| matches!(slot, Slot::InFlight(_)));
    }

    /// Drops every ready value past the freshness window. Called on a miss,
    /// so a stale key is replaced rather than left behind.
    fn evict_expired(&self, entries: &mut HashMap<CacheKey, Slot<V>>) {
        let before = entries.len();
        entries.retain(|_, slot| match slot {
            Slot::Ready { fetched_at, .. } => fetched_at.elapsed() < self.freshness,
            Slot::InFlight(_) => true,
        });
        let evicted = before - entries.len();
        if evicted > 0 {
            trace!(evicted, "expired cache entries dropped");
        }
    }

    fn start(
        &self,
        entries: &mut HashMap<CacheKey, Slot<V>>,
        key: &CacheKey,
    ) -> Arc<Flight<V>> {
        let flight = Arc::new(Flight::new());
        entries.insert(key.clone(), Slot::InFlight(Arc::clone(&flight)));
        flight
    }

    fn run<F>(&self, key: &CacheKey, flight: Arc<Flight<V>>, fetch: F) -> FetchResult<V>
    where
        F: FnOnce() -> FetchResult<V>,
    {
        let mut guard = FlightGuard {
            cache: self,
            key,
            flight: Arc::clone(&flight),
            armed: true,
        };
        debug!(key = %key, "cache miss, fetching");
        let result = fetch();
        guard.armed = false;

        {
            let mut entries = lock(&self.entries);
            let owns_slot = matches!(
                entries.get(key),
                Some(Slot::InFlight(current)) if Arc::ptr_eq(current, &flight)
            );
            if owns_slot {
                match &result {
                    Ok(value) => {
                        entries.insert(
                            key.clone(),
                            Slot::Ready {
                                value: value.clone(),
                                fetched_at: Instant::now(),
                            },
                        );
                    }
                    Err(err) => {
                        debug!(key = %key, error = %err, "fetch failed, slot released");
                        entries.remove(key);
                    }
                }
            }
        }

        flight.complete(result.clone());
        result
    }

    fn release(&self, key: &CacheKey, flight: &Arc<Flight<V>>) {
        let mut entries = lock(&self.entries);
        if matches!(
            entries.get(key),
            Some(Slot::InFlight(current)) if Arc::ptr_eq(current, flight)
        ) {
            entries.remove(key);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
