//! Watch mode: repeat a lookup on a fixed interval.
//!
//! [`WatchSession`] is the per-tab state machine and holds no timers itself.
//! [`WatchTimers`] owns the armed sleeps and delivers [`WatchTick`]s back to
//! the event loop. A session's generation changes whenever watching starts or
//! stops; ticks and completions tagged with an older generation are stale.

use std::collections::HashMap;
use std::time::Duration;

use dlookup_types::{TabId, WatchTick};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::error::WatchError;

/// Parse a user-entered interval: a positive whole number of seconds.
pub fn parse_interval(input: &str) -> Result<Duration, WatchError> {
    match input.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(WatchError::InvalidInterval { input: input.to_string() }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchPhase {
    #[default]
    Idle,
    AwaitingInterval,
    Watching { interval: Duration },
}

/// A freshly started watch. The caller runs the lookup immediately and
/// re-arms only after that run completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchStart {
    pub generation: u64,
    pub interval: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct WatchSession {
    phase: WatchPhase,
    generation: u64,
}

impl WatchSession {
    pub fn phase(&self) -> WatchPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_watching(&self) -> bool {
        matches!(self.phase, WatchPhase::Watching { .. })
    }

    pub fn is_awaiting_interval(&self) -> bool {
        self.phase == WatchPhase::AwaitingInterval
    }

    pub fn interval(&self) -> Option<Duration> {
        match self.phase {
            WatchPhase::Watching { interval } => Some(interval),
            _ => None,
        }
    }

    /// Idle → AwaitingInterval.
    ///
    /// Requires a finished lookup for a watchable provider.
    pub fn request(&mut self, provider: &str, watchable: bool, has_result: bool) -> Result<(), WatchError> {
        if !watchable {
            return Err(WatchError::NotWatchable {
                provider: provider.to_string(),
            });
        }
        if !has_result {
            return Err(WatchError::NoActiveResult);
        }
        self.stop();
        self.phase = WatchPhase::AwaitingInterval;
        Ok(())
    }

    /// AwaitingInterval → Watching. Invalid input leaves the prompt open.
    pub fn confirm(&mut self, input: &str) -> Result<WatchStart, WatchError> {
        if self.phase != WatchPhase::AwaitingInterval {
            return Err(WatchError::NoActiveResult);
        }
        let interval = parse_interval(input)?;
        self.generation += 1;
        self.phase = WatchPhase::Watching { interval };
        debug!(generation = self.generation, interval_secs = interval.as_secs(), "watch started");
        Ok(WatchStart {
            generation: self.generation,
            interval,
        })
    }

    /// Return to Idle from any phase. Returns true if a watch was running,
    /// meaning any armed timer for the tab must be cancelled.
    pub fn stop(&mut self) -> bool {
        let was_watching = self.is_watching();
        if was_watching {
            self.generation += 1;
            debug!(generation = self.generation, "watch stopped");
        }
        self.phase = WatchPhase::Idle;
        was_watching
    }

    /// Whether a tick or run tagged with `generation` belongs to the live watch.
    pub fn is_current(&self, generation: u64) -> bool {
        self.is_watching() && generation == self.generation
    }

    /// Interval for the next tick after a watch run finished, or `None` when
    /// the run belongs to a cancelled watch.
    pub fn rearm_after(&self, generation: u64) -> Option<Duration> {
        if self.is_current(generation) { self.interval() } else { None }
    }
}

/// At most one armed timer per tab.
#[derive(Debug)]
pub struct WatchTimers {
    sender: UnboundedSender<WatchTick>,
    armed: HashMap<TabId, JoinHandle<()>>,
}

impl WatchTimers {
    pub fn new(sender: UnboundedSender<WatchTick>) -> Self {
        Self {
            sender,
            armed: HashMap::new(),
        }
    }

    /// Schedule one tick for `tab_id` after `interval`, replacing any timer
    /// already armed for the tab. Must be called within a tokio runtime.
    pub fn arm(&mut self, tab_id: TabId, generation: u64, interval: Duration) {
        self.armed.retain(|_, handle| !handle.is_finished());
        let sender = self.sender.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            if sender.send(WatchTick { tab_id, generation }).is_err() {
                trace!(%tab_id, "watch tick receiver closed");
            }
        });
        if let Some(previous) = self.armed.insert(tab_id, handle) {
            previous.abort();
        }
    }

    pub fn cancel(&mut self, tab_id: TabId) {
        if let Some(handle) = self.armed.remove(&tab_id) {
            handle.abort();
            debug!(%tab_id, "watch timer cancelled");
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.armed.drain() {
            handle.abort();
        }
    }

    pub fn is_armed(&self, tab_id: TabId) -> bool {
        self.armed.get(&tab_id).is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for WatchTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
