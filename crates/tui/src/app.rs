//! Application state and key routing.
//!
//! [`App`] owns the tabs and translates key presses and runtime messages into
//! state changes plus [`Effect`]s. It never touches the terminal or spawns
//! tasks; the runtime does that with the returned effects.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use dlookup_engine::ProviderRegistry;
use dlookup_types::{Effect, Msg, TabId};
use dlookup_util::AppConfig;
use tracing::{debug, info};

use crate::keymap::{Action, Keymap};
use crate::tab::{Phase, ProviderEntry, Tab};

const THROBBER_FRAMES: usize = 10;

#[derive(Debug)]
pub struct App {
    registry: Arc<ProviderRegistry>,
    providers: Vec<ProviderEntry>,
    keymap: Keymap,
    default_interval_secs: u64,
    tabs: Vec<Tab>,
    active: usize,
    next_tab_id: u64,
    /// Transient message shown in the help bar until the next key press.
    status: Option<String>,
    pub throbber_idx: usize,
}

impl App {
    pub fn new(registry: Arc<ProviderRegistry>, config: &AppConfig) -> Self {
        let providers = registry
            .list_available_providers()
            .iter()
            .map(|provider| ProviderEntry {
                name: provider.name().to_string(),
                watchable: provider.is_watchable(),
            })
            .collect();
        let mut app = Self {
            registry,
            providers,
            keymap: Keymap::from_config(&config.keybindings),
            default_interval_secs: config.watch.default_interval_secs,
            tabs: Vec::new(),
            active: 0,
            next_tab_id: 0,
            status: None,
            throbber_idx: 0,
        };
        app.push_tab();
        app
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn providers(&self) -> &[ProviderEntry] {
        &self.providers
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_tab(&self) -> &Tab {
        &self.tabs[self.active]
    }

    fn active_tab_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.active]
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Whether any tab has a lookup in flight.
    pub fn is_busy(&self) -> bool {
        self.tabs.iter().any(Tab::is_running)
    }

    fn push_tab(&mut self) -> usize {
        self.next_tab_id += 1;
        self.tabs.push(Tab::new(TabId(self.next_tab_id)));
        self.tabs.len() - 1
    }

    fn tab_mut(&mut self, tab_id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| tab.id() == tab_id)
    }

    /// Replace the tabs with one per target, each already running `provider`.
    pub fn open_batch(&mut self, provider: &str, targets: &[String]) -> Vec<Effect> {
        if targets.is_empty() {
            return Vec::new();
        }
        let selected = self.providers.iter().position(|entry| entry.name == provider).unwrap_or(0);
        let mut effects = Vec::new();
        for tab in &mut self.tabs {
            effects.extend(tab.close());
        }
        self.tabs.clear();
        for target in targets {
            let index = self.push_tab();
            let tab = &mut self.tabs[index];
            tab.domain_mut().set(target.as_str());
            tab.set_selected(selected);
            tab.submit_domain();
            effects.push(tab.start_lookup(provider));
        }
        self.active = 0;
        info!(provider, tabs = targets.len(), "opened batch tabs");
        effects
    }

    /// Apply a runtime message.
    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                if self.is_busy() {
                    self.throbber_idx = (self.throbber_idx + 1) % THROBBER_FRAMES;
                }
                Vec::new()
            }
            Msg::Resize(..) => Vec::new(),
            Msg::LookupCompleted(completion) => match self.tab_mut(completion.tab_id) {
                Some(tab) => tab.complete(&completion).into_iter().collect(),
                None => {
                    debug!(tab = %completion.tab_id, "lookup finished for a closed tab");
                    Vec::new()
                }
            },
            Msg::WatchTick(tick) => match self.tab_mut(tick.tab_id) {
                Some(tab) => tab.on_watch_tick(tick.generation).into_iter().collect(),
                None => vec![Effect::CancelWatchTimer(tick.tab_id)],
            },
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind == KeyEventKind::Release {
            return Vec::new();
        }
        self.status = None;
        let action = self.keymap.action_for(&key);
        let typing = self.active_tab().phase() == Phase::InputDomain || self.active_tab().watch().is_awaiting_interval();

        if !(typing && is_text_key(&key)) {
            match action {
                Some(Action::Quit) => return vec![Effect::Quit],
                Some(Action::NewTab) => {
                    self.active = self.push_tab();
                    return Vec::new();
                }
                Some(Action::CloseTab) => return self.close_active_tab(),
                Some(Action::NextTab) => {
                    self.active = (self.active + 1) % self.tabs.len();
                    return Vec::new();
                }
                Some(Action::PrevTab) => {
                    self.active = (self.active + self.tabs.len() - 1) % self.tabs.len();
                    return Vec::new();
                }
                _ => {}
            }
        }

        if self.active_tab().watch().is_awaiting_interval() {
            return self.handle_interval_key(key, action);
        }
        match self.active_tab().phase() {
            Phase::InputDomain => self.handle_domain_key(key, action),
            Phase::SelectLookup => self.handle_select_key(key, action),
            Phase::Loading => match action {
                Some(Action::Back) => self.active_tab_mut().back(),
                _ => Vec::new(),
            },
            Phase::ViewResults | Phase::Error => self.handle_result_key(key, action),
        }
    }

    fn close_active_tab(&mut self) -> Vec<Effect> {
        if self.tabs.len() == 1 {
            self.status = Some("Cannot close the last tab".into());
            return Vec::new();
        }
        let mut tab = self.tabs.remove(self.active);
        if self.active >= self.tabs.len() {
            self.active = self.tabs.len() - 1;
        }
        tab.close()
    }

    fn handle_domain_key(&mut self, key: KeyEvent, action: Option<Action>) -> Vec<Effect> {
        let tab = self.active_tab_mut();
        if is_text_key(&key) {
            if let KeyCode::Char(c) = key.code {
                tab.domain_mut().insert(c);
            }
            return Vec::new();
        }
        match (action, key.code) {
            (Some(Action::Confirm), _) => {
                if !tab.submit_domain() {
                    self.status = Some("Enter a domain or IP address".into());
                }
            }
            (_, KeyCode::Backspace) => tab.domain_mut().backspace(),
            (_, KeyCode::Delete) => tab.domain_mut().delete(),
            (_, KeyCode::Left) => tab.domain_mut().move_left(),
            (_, KeyCode::Right) => tab.domain_mut().move_right(),
            (_, KeyCode::Home) => tab.domain_mut().move_home(),
            (_, KeyCode::End) => tab.domain_mut().move_end(),
            _ => {}
        }
        Vec::new()
    }

    fn handle_select_key(&mut self, key: KeyEvent, action: Option<Action>) -> Vec<Effect> {
        let provider_count = self.providers.len();
        match (action, key.code) {
            (Some(Action::Back), _) => self.active_tab_mut().back(),
            (Some(Action::Confirm), _) => {
                let Some(entry) = self.providers.get(self.active_tab().selected()) else {
                    return Vec::new();
                };
                let provider = entry.name.clone();
                vec![self.active_tab_mut().start_lookup(&provider)]
            }
            (_, KeyCode::Down) => {
                self.active_tab_mut().select_next(provider_count);
                Vec::new()
            }
            (_, KeyCode::Up) => {
                self.active_tab_mut().select_previous();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_result_key(&mut self, key: KeyEvent, action: Option<Action>) -> Vec<Effect> {
        match (action, key.code) {
            (Some(Action::Back), _) => self.active_tab_mut().back(),
            (Some(Action::WatchToggle), _) => self.toggle_watch(),
            (_, KeyCode::Down) => {
                self.active_tab_mut().scroll_down(1);
                Vec::new()
            }
            (_, KeyCode::Up) => {
                self.active_tab_mut().scroll_up(1);
                Vec::new()
            }
            (_, KeyCode::PageDown) => {
                self.active_tab_mut().page_down();
                Vec::new()
            }
            (_, KeyCode::PageUp) => {
                self.active_tab_mut().page_up();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn toggle_watch(&mut self) -> Vec<Effect> {
        if self.active_tab().watch().is_watching() {
            self.status = Some("Watch mode stopped".into());
            return self.active_tab_mut().stop_watch();
        }
        let watchable = self
            .active_tab()
            .provider()
            .and_then(|name| self.providers.iter().find(|entry| entry.name == name))
            .is_some_and(|entry| entry.watchable);
        let default_interval = self.default_interval_secs;
        if let Err(error) = self.active_tab_mut().request_watch(watchable, default_interval) {
            self.status = Some(error.to_string());
        }
        Vec::new()
    }

    fn handle_interval_key(&mut self, key: KeyEvent, action: Option<Action>) -> Vec<Effect> {
        let tab = self.active_tab_mut();
        if is_text_key(&key) {
            if let KeyCode::Char(c) = key.code {
                tab.interval_input_mut().insert(c);
            }
            return Vec::new();
        }
        match (action, key.code) {
            (Some(Action::Back), _) => tab.back(),
            (Some(Action::Confirm), _) => tab.confirm_watch().map(|effect| vec![effect]).unwrap_or_default(),
            (_, KeyCode::Backspace) => {
                tab.interval_input_mut().backspace();
                Vec::new()
            }
            (_, KeyCode::Left) => {
                tab.interval_input_mut().move_left();
                Vec::new()
            }
            (_, KeyCode::Right) => {
                tab.interval_input_mut().move_right();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}

/// Printable input without ctrl/alt, typed into whichever field is focused.
fn is_text_key(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char(_)) && !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Local;
    use dlookup_engine::{AvailabilityCache, CommandRunner, LookupError};
    use dlookup_types::{LookupCompletion, LookupOutcome, WatchTick};
    use std::time::Duration;

    struct IdleRunner;

    #[async_trait]
    impl CommandRunner for IdleRunner {
        async fn run(&self, _command: &str, _args: &[String]) -> Result<String, LookupError> {
            Ok(String::new())
        }
    }

    fn app() -> App {
        let registry = ProviderRegistry::with_default_providers(
            Arc::new(IdleRunner),
            Arc::new(AvailabilityCache::with_probe(|_| true)),
            None,
        )
        .unwrap();
        App::new(registry, &AppConfig::default())
    }

    fn press(app: &mut App, code: KeyCode) -> Vec<Effect> {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(app: &mut App, code: KeyCode) -> Vec<Effect> {
        app.handle_key(KeyEvent::new(code, KeyModifiers::CONTROL))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn finish(app: &mut App, effect: &Effect, output: &str) -> Vec<Effect> {
        let Effect::RunLookup {
            tab_id,
            run_id,
            provider,
            target,
        } = effect.clone()
        else {
            panic!("expected RunLookup, got {effect:?}");
        };
        app.update(Msg::LookupCompleted(Box::new(LookupCompletion {
            tab_id,
            run_id,
            provider,
            target,
            outcome: LookupOutcome::Success { output: output.into() },
            finished_at: Local::now(),
        })))
    }

    fn run_provider(app: &mut App, domain: &str, provider: &str) -> Effect {
        type_text(app, domain);
        press(app, KeyCode::Enter);
        let index = app.providers().iter().position(|entry| entry.name == provider).unwrap();
        for _ in 0..index {
            press(app, KeyCode::Down);
        }
        let mut effects = press(app, KeyCode::Enter);
        assert_eq!(effects.len(), 1);
        effects.remove(0)
    }

    #[test]
    fn lists_every_registered_provider() {
        let app = app();
        assert_eq!(app.providers().len(), 10);
        assert_eq!(app.providers()[0].name, "NSLOOKUP");
        assert!(!app.providers().last().unwrap().watchable);
    }

    #[test]
    fn typing_and_selecting_runs_the_lookup() {
        let mut app = app();
        let effect = run_provider(&mut app, "example.com", "DIG (A)");
        assert!(matches!(
            effect,
            Effect::RunLookup { ref provider, ref target, .. } if provider == "DIG (A)" && target == "example.com"
        ));
        assert_eq!(app.active_tab().phase(), Phase::Loading);
        assert!(app.is_busy());

        assert!(finish(&mut app, &effect, "93.184.216.34").is_empty());
        assert_eq!(app.active_tab().phase(), Phase::ViewResults);
        assert!(!app.is_busy());
    }

    #[test]
    fn plain_keys_type_into_the_domain_field() {
        let mut app = app();
        type_text(&mut app, "www.example.com");
        assert_eq!(app.active_tab().domain().value(), "www.example.com");
        assert_eq!(app.active_tab().phase(), Phase::InputDomain);
    }

    #[test]
    fn blank_domain_shows_a_hint() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status(), Some("Enter a domain or IP address"));
        assert_eq!(app.active_tab().phase(), Phase::InputDomain);
    }

    #[test]
    fn tabs_open_wrap_and_never_close_the_last() {
        let mut app = app();
        assert!(ctrl(&mut app, KeyCode::Char('w')).is_empty());
        assert_eq!(app.tabs().len(), 1);
        assert_eq!(app.status(), Some("Cannot close the last tab"));

        ctrl(&mut app, KeyCode::Char('n'));
        ctrl(&mut app, KeyCode::Char('n'));
        assert_eq!(app.tabs().len(), 3);
        assert_eq!(app.active_index(), 2);

        ctrl(&mut app, KeyCode::Right);
        assert_eq!(app.active_index(), 0);
        ctrl(&mut app, KeyCode::Left);
        assert_eq!(app.active_index(), 2);

        let closed = app.active_tab().id();
        assert_eq!(ctrl(&mut app, KeyCode::Char('w')), vec![Effect::CancelWatchTimer(closed)]);
        assert_eq!(app.tabs().len(), 2);
        assert_eq!(app.active_index(), 1);
    }

    #[test]
    fn quit_binding_requests_exit() {
        let mut app = app();
        assert_eq!(ctrl(&mut app, KeyCode::Char('c')), vec![Effect::Quit]);
    }

    #[test]
    fn results_for_closed_tabs_are_dropped() {
        let mut app = app();
        let effect = run_provider(&mut app, "example.com", "WHOIS");
        ctrl(&mut app, KeyCode::Char('n'));
        ctrl(&mut app, KeyCode::Left);
        ctrl(&mut app, KeyCode::Char('w'));
        assert_eq!(app.tabs().len(), 1);

        assert!(finish(&mut app, &effect, "Registrar: Example").is_empty());
        assert_eq!(
            app.update(Msg::WatchTick(WatchTick {
                tab_id: TabId(1),
                generation: 1
            })),
            vec![Effect::CancelWatchTimer(TabId(1))]
        );
    }

    #[test]
    fn comprehensive_report_refuses_watch() {
        let mut app = app();
        let effect = run_provider(&mut app, "example.com", "Comprehensive Report");
        finish(&mut app, &effect, "Comprehensive Report for: example.com");

        assert!(press(&mut app, KeyCode::Char('w')).is_empty());
        assert_eq!(app.status(), Some("Watch mode is not available for Comprehensive Report"));
        assert!(!app.active_tab().watch().is_awaiting_interval());
    }

    #[test]
    fn watch_flow_through_keys() {
        let mut app = app();
        let effect = run_provider(&mut app, "example.com", "DIG (MX)");
        finish(&mut app, &effect, "10 mail.example.com.");

        press(&mut app, KeyCode::Char('w'));
        assert!(app.active_tab().watch().is_awaiting_interval());
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "3");

        let mut effects = press(&mut app, KeyCode::Enter);
        assert_eq!(effects.len(), 1);
        let rerun = effects.remove(0);
        assert!(app.active_tab().watch().is_watching());

        let generation = app.active_tab().watch().generation();
        let tab_id = app.active_tab().id();
        assert_eq!(
            finish(&mut app, &rerun, "10 mail.example.com."),
            vec![Effect::ArmWatchTimer {
                tab_id,
                generation,
                interval: Duration::from_secs(3),
            }]
        );

        let effects = app.update(Msg::WatchTick(WatchTick { tab_id, generation }));
        assert!(matches!(effects.as_slice(), [Effect::RunLookup { .. }]));

        assert_eq!(press(&mut app, KeyCode::Esc), vec![Effect::CancelWatchTimer(tab_id)]);
        assert_eq!(app.active_tab().phase(), Phase::InputDomain);
        assert!(app.update(Msg::WatchTick(WatchTick { tab_id, generation })).is_empty());
    }

    #[test]
    fn watch_toggle_stops_an_active_watch() {
        let mut app = app();
        let effect = run_provider(&mut app, "example.com", "NSLOOKUP");
        finish(&mut app, &effect, "Address: 93.184.216.34");
        press(&mut app, KeyCode::Char('w'));
        press(&mut app, KeyCode::Enter);

        let tab_id = app.active_tab().id();
        assert_eq!(press(&mut app, KeyCode::Char('w')), vec![Effect::CancelWatchTimer(tab_id)]);
        assert_eq!(app.status(), Some("Watch mode stopped"));
    }

    #[test]
    fn batch_opens_one_running_tab_per_target() {
        let mut app = app();
        let targets = vec!["example.com".to_string(), "example.org".to_string()];
        let effects = app.open_batch("WHOIS", &targets);

        assert_eq!(app.tabs().len(), 2);
        let run_targets: Vec<_> = effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::RunLookup { target, provider, .. } if provider == "WHOIS" => Some(target.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(run_targets, ["example.com", "example.org"]);
        assert!(app.tabs().iter().all(|tab| tab.phase() == Phase::Loading));
        assert_eq!(app.tabs()[1].title(), "example.org");
    }
}
