//! Per-tab state: the lookup flow, the current result, and the watch session.
//!
//! All transitions here are synchronous and return [`Effect`]s; nothing in
//! this module spawns work.

use chrono::{DateTime, Local};
use dlookup_engine::{WatchError, WatchSession};
use dlookup_types::{Effect, LookupCompletion, LookupOutcome, TabId};
use tracing::debug;

use crate::ui::text_input::TextInput;

const NEW_TAB_TITLE: &str = "New Tab";
const PAGE_SCROLL: u16 = 10;

/// Where the tab is in the lookup flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InputDomain,
    SelectLookup,
    Loading,
    ViewResults,
    Error,
}

/// Snapshot of a registered provider as the list shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEntry {
    pub name: String,
    pub watchable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRun {
    run_id: u64,
    /// Set for runs started by the watch scheduler.
    watch_generation: Option<u64>,
}

#[derive(Debug)]
pub struct Tab {
    id: TabId,
    phase: Phase,
    domain: TextInput,
    interval: TextInput,
    interval_error: Option<String>,
    selected: usize,
    provider: Option<String>,
    target: String,
    outcome: Option<LookupOutcome>,
    scroll: u16,
    watch: WatchSession,
    next_run_id: u64,
    pending: Option<PendingRun>,
    last_updated: Option<DateTime<Local>>,
}

impl Tab {
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            phase: Phase::InputDomain,
            domain: TextInput::default(),
            interval: TextInput::default(),
            interval_error: None,
            selected: 0,
            provider: None,
            target: String::new(),
            outcome: None,
            scroll: 0,
            watch: WatchSession::default(),
            next_run_id: 0,
            pending: None,
            last_updated: None,
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn domain(&self) -> &TextInput {
        &self.domain
    }

    pub fn domain_mut(&mut self) -> &mut TextInput {
        &mut self.domain
    }

    pub fn interval_input(&self) -> &TextInput {
        &self.interval
    }

    pub fn interval_input_mut(&mut self) -> &mut TextInput {
        &mut self.interval
    }

    pub fn interval_error(&self) -> Option<&str> {
        self.interval_error.as_deref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn outcome(&self) -> Option<&LookupOutcome> {
        self.outcome.as_ref()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn watch(&self) -> &WatchSession {
        &self.watch
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn title(&self) -> &str {
        if !self.target.is_empty() {
            &self.target
        } else if !self.domain.is_blank() {
            self.domain.value().trim()
        } else {
            NEW_TAB_TITLE
        }
    }

    /// InputDomain → SelectLookup when the domain is not blank.
    pub fn submit_domain(&mut self) -> bool {
        if self.phase != Phase::InputDomain || self.domain.is_blank() {
            return false;
        }
        self.phase = Phase::SelectLookup;
        true
    }

    pub fn select_next(&mut self, provider_count: usize) {
        if provider_count > 0 {
            self.selected = (self.selected + 1).min(provider_count - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn set_selected(&mut self, index: usize) {
        self.selected = index;
    }

    /// Start a user-requested lookup of the current domain.
    pub fn start_lookup(&mut self, provider: &str) -> Effect {
        self.target = self.domain.value().trim().to_string();
        self.provider = Some(provider.to_string());
        self.outcome = None;
        self.scroll = 0;
        self.phase = Phase::Loading;
        self.begin_run(provider.to_string(), None)
    }

    fn begin_run(&mut self, provider: String, watch_generation: Option<u64>) -> Effect {
        self.next_run_id += 1;
        self.pending = Some(PendingRun {
            run_id: self.next_run_id,
            watch_generation,
        });
        Effect::RunLookup {
            tab_id: self.id,
            run_id: self.next_run_id,
            provider,
            target: self.target.clone(),
        }
    }

    /// Apply a finished lookup. Superseded or abandoned runs are ignored.
    ///
    /// Returns the next watch timer when the run belonged to the live watch.
    pub fn complete(&mut self, completion: &LookupCompletion) -> Option<Effect> {
        let pending = match self.pending {
            Some(pending) if pending.run_id == completion.run_id => pending,
            _ => {
                debug!(tab = %self.id, run_id = completion.run_id, "dropping stale lookup result");
                return None;
            }
        };
        self.pending = None;
        self.phase = if completion.outcome.is_success() { Phase::ViewResults } else { Phase::Error };
        self.outcome = Some(completion.outcome.clone());
        self.last_updated = Some(completion.finished_at);

        let generation = pending.watch_generation?;
        self.watch.rearm_after(generation).map(|interval| Effect::ArmWatchTimer {
            tab_id: self.id,
            generation,
            interval,
        })
    }

    /// A watch timer fired. Starts one run unless the tick is stale or a run
    /// is still in flight.
    pub fn on_watch_tick(&mut self, generation: u64) -> Option<Effect> {
        if !self.watch.is_current(generation) || self.pending.is_some() {
            debug!(tab = %self.id, generation, "ignoring watch tick");
            return None;
        }
        let provider = self.provider.clone()?;
        Some(self.begin_run(provider, Some(generation)))
    }

    /// Open the interval prompt for the current result.
    pub fn request_watch(&mut self, watchable: bool, default_interval_secs: u64) -> Result<(), WatchError> {
        let provider = self.provider.clone().unwrap_or_default();
        let has_result = self.outcome.is_some() && matches!(self.phase, Phase::ViewResults | Phase::Error);
        self.watch.request(&provider, watchable, has_result)?;
        self.interval.set(default_interval_secs.to_string());
        self.interval_error = None;
        Ok(())
    }

    /// Submit the interval prompt. On success the lookup reruns immediately.
    pub fn confirm_watch(&mut self) -> Result<Effect, WatchError> {
        let start = match self.watch.confirm(self.interval.value()) {
            Ok(start) => start,
            Err(error) => {
                self.interval_error = Some(error.to_string());
                return Err(error);
            }
        };
        self.interval_error = None;
        let provider = self.provider.clone().ok_or(WatchError::NoActiveResult)?;
        Ok(self.begin_run(provider, Some(start.generation)))
    }

    /// Turn watching off and stay on the current result.
    pub fn stop_watch(&mut self) -> Vec<Effect> {
        if self.watch.stop() { vec![Effect::CancelWatchTimer(self.id)] } else { Vec::new() }
    }

    /// Leave the current view. From results, the list, or a running lookup
    /// this returns to domain input with the domain kept; an open interval
    /// prompt is closed first.
    pub fn back(&mut self) -> Vec<Effect> {
        if self.watch.is_awaiting_interval() {
            self.watch.stop();
            self.interval_error = None;
            return Vec::new();
        }
        if self.phase == Phase::InputDomain {
            return Vec::new();
        }
        self.phase = Phase::InputDomain;
        self.pending = None;
        self.domain.move_end();
        self.stop_watch()
    }

    /// Release timers before the tab is dropped.
    pub fn close(&mut self) -> Vec<Effect> {
        self.pending = None;
        self.watch.stop();
        vec![Effect::CancelWatchTimer(self.id)]
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(PAGE_SCROLL);
    }

    pub fn page_up(&mut self) {
        self.scroll_up(PAGE_SCROLL);
    }

    /// One-line status shown above the content.
    pub fn header(&self) -> String {
        let domain = if self.target.is_empty() { self.domain.value().trim() } else { self.target.as_str() };
        let mut header = match (self.phase, self.provider.as_deref()) {
            (Phase::InputDomain, _) => return "Enter a domain or IP address".to_string(),
            (Phase::SelectLookup, _) => format!("Domain: {} | Select a lookup type", self.domain.value().trim()),
            (_, Some(provider)) if self.pending.is_some() => format!("Domain: {domain} | Running {provider}..."),
            (_, Some(provider)) => format!("Domain: {domain} | Lookup: {provider}"),
            (_, None) => format!("Domain: {domain}"),
        };
        if let Some(interval) = self.watch.interval() {
            let last = self
                .last_updated
                .map(|at| at.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            header.push_str(&format!(" | Watching every {}s (last: {last})", interval.as_secs()));
        }
        header
    }

    /// Rendered result or error text.
    pub fn body(&self) -> Option<String> {
        let provider = self.provider.as_deref().unwrap_or_default();
        match self.outcome.as_ref()? {
            LookupOutcome::Success { output } => Some(format!("{provider} Results for {}\n\n{output}", self.target)),
            LookupOutcome::Failure { message, output } if output.trim().is_empty() => Some(format!("Error:\n{message}")),
            LookupOutcome::Failure { message, output } => Some(format!("Error:\n{message}\n\n{output}")),
        }
    }
}
