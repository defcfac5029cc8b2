//! Memoized "is this executable on PATH" checks.
//!
//! Each distinct command name is probed at most once per cache. There is no
//! invalidation: installing or removing a tool while the process runs is not
//! observed until restart.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

type Probe = dyn Fn(&str) -> bool + Send + Sync;

/// Thread-safe cache of command availability.
///
/// The mutex is held across the probe, so concurrent first lookups serialize.
/// The set of commands is small and fixed at registration time.
pub struct AvailabilityCache {
    probe: Box<Probe>,
    known: Mutex<HashMap<String, bool>>,
}

impl fmt::Debug for AvailabilityCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known = self.known.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("AvailabilityCache").field("known", &*known).finish()
    }
}

impl Default for AvailabilityCache {
    fn default() -> Self {
        Self::system()
    }
}

impl AvailabilityCache {
    /// Cache backed by a `PATH` search.
    pub fn system() -> Self {
        Self::with_probe(|command| which::which(command).is_ok())
    }

    /// Cache backed by a custom probe, mainly for tests.
    pub fn with_probe<F>(probe: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            probe: Box::new(probe),
            known: Mutex::new(HashMap::new()),
        }
    }

    /// Returns whether `command` is available, probing only on first use.
    pub fn is_available(&self, command: &str) -> bool {
        let mut known = self.known.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(available) = known.get(command) {
            return *available;
        }
        let available = (self.probe)(command);
        debug!(command = %command, available, "probed command availability");
        known.insert(command.to_string(), available);
        available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[test]
    fn probes_each_command_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cache = AvailabilityCache::with_probe(move |command| {
            counter.fetch_add(1, Ordering::SeqCst);
            command == "dig"
        });

        assert!(cache.is_available("dig"));
        assert!(cache.is_available("dig"));
        assert!(!cache.is_available("whois"));
        assert!(!cache.is_available("whois"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cached_value_survives_environment_changes() {
        let installed = Arc::new(AtomicBool::new(false));
        let state = Arc::clone(&installed);
        let cache = AvailabilityCache::with_probe(move |_| state.load(Ordering::SeqCst));

        assert!(!cache.is_available("nslookup"));
        installed.store(true, Ordering::SeqCst);
        assert!(!cache.is_available("nslookup"), "cache must not re-probe");
    }

    #[test]
    fn concurrent_first_lookups_probe_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cache = Arc::new(AvailabilityCache::with_probe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.is_available("dig"))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
