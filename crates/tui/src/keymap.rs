//! Configurable key bindings.
//!
//! Bindings are written as `[modifier+]*key`, e.g. `ctrl+w`, `alt+shift+f2`,
//! `esc`. A binding that fails to parse falls back to its default.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dlookup_util::Keybindings;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("empty key binding")]
    Empty,
    #[error("unknown modifier {0:?}")]
    UnknownModifier(String),
    #[error("unknown key {0:?}")]
    UnknownKey(String),
}

/// A single key chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Whether `event` triggers this binding.
    ///
    /// Shift is ignored for character keys since terminals report it
    /// inconsistently for uppercase letters and symbols.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        match (self.code, event.code) {
            (KeyCode::Char(expected), KeyCode::Char(actual)) => {
                let relevant = KeyModifiers::CONTROL | KeyModifiers::ALT;
                expected.eq_ignore_ascii_case(&actual) && (self.modifiers & relevant) == (event.modifiers & relevant)
            }
            (expected, actual) => expected == actual && self.modifiers == event.modifiers,
        }
    }
}

pub fn parse_key(text: &str) -> Result<KeyBinding, KeyParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(KeyParseError::Empty);
    }
    // `ctrl++` binds the plus key
    let (prefix, key) = match text.strip_suffix("++") {
        Some(rest) => (rest, "+"),
        None => match text.rsplit_once('+') {
            Some((rest, key)) => (rest, key),
            None => ("", text),
        },
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in prefix.split('+').filter(|part| !part.is_empty()) {
        modifiers |= match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "alt" => KeyModifiers::ALT,
            "shift" => KeyModifiers::SHIFT,
            other => return Err(KeyParseError::UnknownModifier(other.to_string())),
        };
    }

    let code = parse_code(key)?;
    Ok(KeyBinding { code, modifiers })
}

fn parse_code(key: &str) -> Result<KeyCode, KeyParseError> {
    let mut chars = key.chars();
    if let (Some(single), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(single.to_ascii_lowercase()));
    }
    let lower = key.to_ascii_lowercase();
    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        _ => match lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            Some(n @ 1..=12) => KeyCode::F(n),
            _ => return Err(KeyParseError::UnknownKey(key.to_string())),
        },
    };
    Ok(code)
}

/// Human-readable label for the help bar.
pub fn describe(binding: &KeyBinding) -> String {
    let mut label = String::new();
    if binding.modifiers.contains(KeyModifiers::CONTROL) {
        label.push_str("Ctrl+");
    }
    if binding.modifiers.contains(KeyModifiers::ALT) {
        label.push_str("Alt+");
    }
    if binding.modifiers.contains(KeyModifiers::SHIFT) {
        label.push_str("Shift+");
    }
    let key = match binding.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::Backspace => "Backspace".into(),
        KeyCode::Left => "←".into(),
        KeyCode::Right => "→".into(),
        KeyCode::Up => "↑".into(),
        KeyCode::Down => "↓".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PgUp".into(),
        KeyCode::PageDown => "PgDn".into(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}"),
    };
    label.push_str(&key);
    label
}

/// Bindable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NewTab,
    CloseTab,
    NextTab,
    PrevTab,
    Back,
    Confirm,
    WatchToggle,
}

#[derive(Debug, Clone)]
pub struct Keymap {
    pub quit: KeyBinding,
    pub new_tab: KeyBinding,
    pub close_tab: KeyBinding,
    pub next_tab: KeyBinding,
    pub prev_tab: KeyBinding,
    pub back: KeyBinding,
    pub confirm: KeyBinding,
    pub watch_toggle: KeyBinding,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&Keybindings::default())
    }
}

impl Keymap {
    pub fn from_config(config: &Keybindings) -> Self {
        let defaults = Keybindings::default();
        let resolve = |action: &str, configured: &str, fallback: &str| match parse_key(configured) {
            Ok(binding) => binding,
            Err(error) => {
                warn!(action = action, binding = configured, error = %error, "invalid key binding; using default");
                // defaults always parse
                parse_key(fallback).unwrap_or(KeyBinding {
                    code: KeyCode::Null,
                    modifiers: KeyModifiers::NONE,
                })
            }
        };
        Self {
            quit: resolve("quit", &config.quit, &defaults.quit),
            new_tab: resolve("new_tab", &config.new_tab, &defaults.new_tab),
            close_tab: resolve("close_tab", &config.close_tab, &defaults.close_tab),
            next_tab: resolve("next_tab", &config.next_tab, &defaults.next_tab),
            prev_tab: resolve("prev_tab", &config.prev_tab, &defaults.prev_tab),
            back: resolve("back", &config.back, &defaults.back),
            confirm: resolve("confirm", &config.confirm, &defaults.confirm),
            watch_toggle: resolve("watch_toggle", &config.watch_toggle, &defaults.watch_toggle),
        }
    }

    /// First action bound to `event`. Tab management and quit win over the
    /// per-view actions.
    pub fn action_for(&self, event: &KeyEvent) -> Option<Action> {
        [
            (Action::Quit, &self.quit),
            (Action::NewTab, &self.new_tab),
            (Action::CloseTab, &self.close_tab),
            (Action::NextTab, &self.next_tab),
            (Action::PrevTab, &self.prev_tab),
            (Action::Back, &self.back),
            (Action::Confirm, &self.confirm),
            (Action::WatchToggle, &self.watch_toggle),
        ]
        .into_iter()
        .find(|(_, binding)| binding.matches(event))
        .map(|(action, _)| action)
    }

    pub fn binding(&self, action: Action) -> &KeyBinding {
        match action {
            Action::Quit => &self.quit,
            Action::NewTab => &self.new_tab,
            Action::CloseTab => &self.close_tab,
            Action::NextTab => &self.next_tab,
            Action::PrevTab => &self.prev_tab,
            Action::Back => &self.back,
            Action::Confirm => &self.confirm,
            Action::WatchToggle => &self.watch_toggle,
        }
    }
}
