//! # Schema Cache
//!
//! Load-once memoization of compiled schema handles, keyed by version.
//!
//! ## Concurrency
//!
//! The map is guarded by a `parking_lot::Mutex` that is only held long
//! enough to look up or replace a slot. The loader itself runs outside the
//! lock, so a slow load for one version never blocks callers asking for a
//! different one.
//!
//! The first caller for a missing version becomes the leader: it installs
//! a `Loading` slot and runs the loader. Callers that arrive while the load
//! is in flight wait on that slot's condition variable and receive the
//! leader's outcome, so concurrent requests for the same version trigger
//! exactly one load.
//!
//! A failed load removes the slot. Nothing negative is cached; the next
//! request starts a fresh load. A loader that panics completes the slot
//! with [`SchemaUnavailable::Aborted`] during unwinding so waiters are
//! always released.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::SchemaUnavailable;

type LoadOutcome<H> = Result<Arc<H>, SchemaUnavailable>;

enum Slot<H> {
    Ready(Arc<H>),
    Loading(Arc<InFlight<H>>),
}

struct InFlight<H> {
    outcome: Mutex<Option<LoadOutcome<H>>>,
    done: Condvar,
}

impl<H> InFlight<H> {
    fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn wait(&self) -> LoadOutcome<H> {
        let mut outcome = self.outcome.lock();
        loop {
            if let Some(result) = outcome.as_ref() {
                return result.clone();
            }
            self.done.wait(&mut outcome);
        }
    }

    fn finish(&self, result: LoadOutcome<H>) {
        *self.outcome.lock() = Some(result);
        self.done.notify_all();
    }
}

enum Lookup<H> {
    Hit(Arc<H>),
    Wait(Arc<InFlight<H>>),
}

/// Thread-safe, load-once cache of compiled schema handles.
pub struct SchemaCache<H> {
    slots: Mutex<HashMap<String, Slot<H>>>,
}

impl<H> SchemaCache<H> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the handle for `version`, running `loader` if no handle is
    /// cached and no load is in flight.
    ///
    /// # Errors
    ///
    /// Returns the loader's [`SchemaUnavailable`], or
    /// [`SchemaUnavailable::Aborted`] if the loader panicked. Either way the
    /// failure is not remembered.
    pub fn get_or_load<F>(&self, version: &str, loader: F) -> LoadOutcome<H>
    where
        F: FnOnce() -> Result<H, SchemaUnavailable>,
    {
        let flight = {
            let mut slots = self.slots.lock();
            let existing = match slots.get(version) {
                Some(Slot::Ready(handle)) => Some(Lookup::Hit(Arc::clone(handle))),
                Some(Slot::Loading(flight)) => Some(Lookup::Wait(Arc::clone(flight))),
                None => None,
            };
            match existing {
                Some(Lookup::Hit(handle)) => return Ok(handle),
                Some(Lookup::Wait(flight)) => {
                    drop(slots);
                    return flight.wait();
                }
                None => {
                    let flight = Arc::new(InFlight::new());
                    slots.insert(version.to_string(), Slot::Loading(Arc::clone(&flight)));
                    flight
                }
            }
        };

        let guard = LeadGuard {
            cache: self,
            version,
            flight,
            completed: false,
        };
        let result = loader().map(Arc::new);
        guard.complete(result)
    }

    /// The cached handle for `version`, without loading.
    pub fn get(&self, version: &str) -> Option<Arc<H>> {
        match self.slots.lock().get(version) {
            Some(Slot::Ready(handle)) => Some(Arc::clone(handle)),
            _ => None,
        }
    }

    /// Number of successfully loaded versions.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Successfully loaded versions, sorted.
    pub fn loaded_versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self
            .slots
            .lock()
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Ready(_)))
            .map(|(version, _)| version.clone())
            .collect();
        versions.sort();
        versions
    }

    /// Replace the slot for `version` with the leader's outcome, then wake
    /// waiters. The map is updated first so a woken waiter that immediately
    /// asks again observes the settled state.
    fn settle(&self, version: &str, flight: &Arc<InFlight<H>>, result: &LoadOutcome<H>) {
        {
            let mut slots = self.slots.lock();
            let ours = matches!(
                slots.get(version),
                Some(Slot::Loading(current)) if Arc::ptr_eq(current, flight)
            );
            if ours {
                match result {
                    Ok(handle) => {
                        slots.insert(version.to_string(), Slot::Ready(Arc::clone(handle)));
                    }
                    Err(_) => {
                        slots.remove(version);
                    }
                }
            }
        }
        flight.finish(result.clone());
    }
}

impl<H> Default for SchemaCache<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for SchemaCache<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCache")
            .field("loaded", &self.loaded_versions())
            .finish()
    }
}

/// Settles the leader's slot exactly once, including on panic.
struct LeadGuard<'a, H> {
    cache: &'a SchemaCache<H>,
    version: &'a str,
    flight: Arc<InFlight<H>>,
    completed: bool,
}

impl<H> LeadGuard<'_, H> {
    fn complete(mut self, result: LoadOutcome<H>) -> LoadOutcome<H> {
        self.cache.settle(self.version, &self.flight, &result);
        self.completed = true;
        result
    }
}

impl<H> Drop for LeadGuard<'_, H> {
    fn drop(&mut self) {
        if !self.completed {
            tracing::error!(version = self.version, "schema loader panicked");
            let aborted = Err(SchemaUnavailable::Aborted {
                version: self.version.to_string(),
            });
            self.cache.settle(self.version, &self.flight, &aborted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Barrier};
    use std::thread;
    use std::time::Duration;

    fn missing(version: &str) -> SchemaUnavailable {
        SchemaUnavailable::Missing {
            version: version.to_string(),
        }
    }

    #[test]
    fn loads_once_and_serves_from_cache() {
        let cache = SchemaCache::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let handle = cache
                .get_or_load("1.5", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("schema-1.5".to_string())
                })
                .unwrap();
            assert_eq!(*handle, "schema-1.5");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.loaded_versions(), vec!["1.5".to_string()]);
    }

    #[test]
    fn concurrent_callers_share_one_load() {
        let cache = Arc::new(SchemaCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache
                        .get_or_load("1.6", || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(50));
                            Ok(vec![1u8, 2, 3])
                        })
                        .unwrap()
                })
            })
            .collect();

        let handles: Vec<Arc<Vec<u8>>> = workers.into_iter().map(|w| w.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for handle in &handles {
            assert!(Arc::ptr_eq(handle, &handles[0]));
        }
    }

    #[test]
    fn failures_are_not_cached() {
        let cache: SchemaCache<String> = SchemaCache::new();
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_load("1.5", || {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(missing("1.5"))
        });
        assert_eq!(first.unwrap_err(), missing("1.5"));
        assert!(cache.is_empty());
        assert!(cache.get("1.5").is_none());

        let second = cache.get_or_load("1.5", || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok("recovered".to_string())
        });
        assert_eq!(*second.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn waiters_receive_the_leaders_error() {
        let cache: Arc<SchemaCache<String>> = Arc::new(SchemaCache::new());
        let (started_tx, started_rx) = mpsc::channel();

        let leader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                cache.get_or_load("1.5", || {
                    started_tx.send(()).unwrap();
                    thread::sleep(Duration::from_millis(100));
                    Err(missing("1.5"))
                })
            })
        };

        started_rx.recv().unwrap();
        let waiter = cache.get_or_load("1.5", || Ok("should not run".to_string()));

        assert_eq!(waiter.unwrap_err(), missing("1.5"));
        assert_eq!(leader.join().unwrap().unwrap_err(), missing("1.5"));
    }

    #[test]
    fn different_versions_do_not_block_each_other() {
        let cache: Arc<SchemaCache<&'static str>> = Arc::new(SchemaCache::new());
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let slow = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                cache.get_or_load("1.5", || {
                    started_tx.send(()).unwrap();
                    release_rx
                        .recv_timeout(Duration::from_secs(5))
                        .map_err(|_| missing("1.5"))?;
                    Ok("1.5")
                })
            })
        };

        started_rx.recv().unwrap();
        // Completes while 1.5 is still loading.
        let fast = cache.get_or_load("1.6", || Ok("1.6")).unwrap();
        assert_eq!(*fast, "1.6");
        assert!(cache.get("1.5").is_none());

        release_tx.send(()).unwrap();
        assert_eq!(*slow.join().unwrap().unwrap(), "1.5");
        assert_eq!(cache.loaded_versions(), vec!["1.5".to_string(), "1.6".to_string()]);
    }

    #[test]
    fn panicking_loader_releases_waiters() {
        let cache: Arc<SchemaCache<String>> = Arc::new(SchemaCache::new());
        let (started_tx, started_rx) = mpsc::channel();

        let leader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                cache.get_or_load("1.6", || {
                    started_tx.send(()).unwrap();
                    thread::sleep(Duration::from_millis(100));
                    panic!("loader exploded");
                })
            })
        };

        started_rx.recv().unwrap();
        let waiter = cache.get_or_load("1.6", || Ok("should not run".to_string()));
        assert!(matches!(waiter, Err(SchemaUnavailable::Aborted { ref version }) if version == "1.6"));
        assert!(leader.join().is_err());

        let retried = cache.get_or_load("1.6", || Ok("second try".to_string())).unwrap();
        assert_eq!(*retried, "second try");
    }

    #[test]
    fn debug_lists_loaded_versions() {
        let cache = SchemaCache::new();
        cache.get_or_load("1.5", || Ok(())).unwrap();
        assert!(format!("{cache:?}").contains("1.5"));
    }
}
