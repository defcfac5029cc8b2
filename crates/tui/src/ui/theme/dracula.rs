use ratatui::style::Color;

use super::roles::{Theme, ThemeRoles};

// Dracula palette (https://draculatheme.com/contribute)
pub const BG: Color = Color::Rgb(0x28, 0x2A, 0x36);
pub const CURRENT_LINE: Color = Color::Rgb(0x44, 0x47, 0x5A);
pub const FOREGROUND: Color = Color::Rgb(0xF8, 0xF8, 0xF2);
pub const COMMENT: Color = Color::Rgb(0x62, 0x72, 0xA4);

pub const CYAN: Color = Color::Rgb(0x8B, 0xE9, 0xFD);
pub const GREEN: Color = Color::Rgb(0x50, 0xFA, 0x7B);
pub const ORANGE: Color = Color::Rgb(0xFF, 0xB8, 0x6C);
pub const PINK: Color = Color::Rgb(0xFF, 0x79, 0xC6);
pub const RED: Color = Color::Rgb(0xFF, 0x55, 0x55);

#[derive(Debug, Clone)]
pub struct DraculaTheme {
    roles: ThemeRoles,
}

impl Default for DraculaTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl DraculaTheme {
    pub fn new() -> Self {
        Self {
            roles: ThemeRoles {
                surface: BG,
                border: CURRENT_LINE,
                border_focused: CYAN,
                text: FOREGROUND,
                label: COMMENT,
                hint: COMMENT,
                header: PINK,
                spinner: CYAN,
                watching: GREEN,
                notice: ORANGE,
                error: RED,
                selection_bg: CURRENT_LINE,
                selection_fg: FOREGROUND,
            },
        }
    }

    /// Nearest xterm-256 indices for terminals without truecolor.
    pub fn indexed() -> Self {
        Self {
            roles: ThemeRoles {
                surface: Color::Reset,
                border: Color::Indexed(60),
                border_focused: Color::Indexed(117),
                text: Color::Indexed(255),
                label: Color::Indexed(103),
                hint: Color::Indexed(61),
                header: Color::Indexed(212),
                spinner: Color::Indexed(117),
                watching: Color::Indexed(84),
                notice: Color::Indexed(215),
                error: Color::Indexed(203),
                selection_bg: Color::Indexed(238),
                selection_fg: Color::Indexed(255),
            },
        }
    }
}

impl Theme for DraculaTheme {
    fn roles(&self) -> &ThemeRoles {
        &self.roles
    }
}
