//! Theme styling for the TUI.
//!
//! Widgets pull colors from semantic [`roles::ThemeRoles`] rather than hard-coding
//! them. Dracula is the only palette; terminals without truecolor get an
//! ANSI-indexed approximation.

use std::env;

use tracing::debug;

pub mod dracula;
pub mod roles;
pub mod theme_helpers;

pub use dracula::DraculaTheme;
pub use roles::Theme;

/// Pick the palette variant for the current terminal.
pub fn load() -> DraculaTheme {
    if supports_truecolor() {
        DraculaTheme::new()
    } else {
        debug!("truecolor not advertised; using indexed palette");
        DraculaTheme::indexed()
    }
}

fn supports_truecolor() -> bool {
    let color_term = env::var("COLORTERM").unwrap_or_default().to_ascii_lowercase();
    if color_term.contains("truecolor") || color_term.contains("24bit") {
        return true;
    }
    env::var("TERM").unwrap_or_default().to_ascii_lowercase().contains("truecolor")
}
