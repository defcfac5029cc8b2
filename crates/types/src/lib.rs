//! Shared message and effect types for dlookup.
//!
//! The engine, the TUI, and the CLI exchange these values: the TUI runtime
//! turns [`Effect`]s into background work and feeds the results back into the
//! single-threaded update loop as [`Msg`]s.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};

/// Stable identifier of a UI tab.
///
/// Identifiers are never reused within a process, so messages addressed to a
/// closed tab can be detected and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// Result of running one provider against one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The lookup finished and produced normalized output.
    Success { output: String },
    /// The lookup failed. `output` holds whatever was captured before the failure.
    Failure { message: String, output: String },
}

impl LookupOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LookupOutcome::Success { .. })
    }
}

/// A finished lookup, addressed to the tab that requested it.
#[derive(Debug, Clone)]
pub struct LookupCompletion {
    pub tab_id: TabId,
    /// Per-tab run counter used to discard superseded results.
    pub run_id: u64,
    pub provider: String,
    pub target: String,
    pub outcome: LookupOutcome,
    pub finished_at: DateTime<Local>,
}

/// Timer notification produced by the watch scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchTick {
    pub tab_id: TabId,
    /// Watch generation the timer was armed for; stale generations are ignored.
    pub generation: u64,
}

/// Messages delivered to the application update loop.
#[derive(Debug, Clone)]
pub enum Msg {
    /// Periodic UI tick (throbber animation)
    Tick,
    /// Terminal resized
    Resize(u16, u16),
    /// Background lookup completed
    LookupCompleted(Box<LookupCompletion>),
    /// A watch timer fired
    WatchTick(WatchTick),
}

/// Side effects requested by state transitions.
///
/// The runtime executes these outside the pure update functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run `provider` against `target` in the background for `tab_id`.
    RunLookup {
        tab_id: TabId,
        run_id: u64,
        provider: String,
        target: String,
    },
    /// Arm a single watch timer that fires after `interval`.
    ArmWatchTimer {
        tab_id: TabId,
        generation: u64,
        interval: Duration,
    },
    /// Drop any pending watch timer for the tab.
    CancelWatchTimer(TabId),
    /// Leave the application.
    Quit,
}
