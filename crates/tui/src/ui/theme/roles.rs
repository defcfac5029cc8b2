use std::fmt::Debug;

use ratatui::style::{Color, Modifier, Style};

/// Colors by what they mark on screen, so palettes stay interchangeable.
#[derive(Debug, Clone)]
pub struct ThemeRoles {
    pub surface: Color,
    pub border: Color,
    pub border_focused: Color,

    pub text: Color,
    /// Block titles, inactive tabs, the loading line.
    pub label: Color,
    /// Help bar descriptions.
    pub hint: Color,

    pub header: Color,
    pub spinner: Color,
    /// Tab marker and header while a watch is running.
    pub watching: Color,

    pub notice: Color,
    pub error: Color,

    pub selection_bg: Color,
    pub selection_fg: Color,
}

/// Style builders over [`ThemeRoles`].
pub trait Theme: Send + Sync + Debug {
    fn roles(&self) -> &ThemeRoles;

    fn text_style(&self) -> Style {
        Style::default().fg(self.roles().text)
    }

    fn label_style(&self) -> Style {
        Style::default().fg(self.roles().label)
    }

    fn hint_style(&self) -> Style {
        Style::default().fg(self.roles().hint)
    }

    fn border_style(&self, focused: bool) -> Style {
        let roles = self.roles();
        Style::default().fg(if focused { roles.border_focused } else { roles.border })
    }

    fn header_style(&self) -> Style {
        Style::default().fg(self.roles().header).add_modifier(Modifier::BOLD)
    }

    fn spinner_style(&self) -> Style {
        Style::default().fg(self.roles().spinner)
    }

    fn watching_style(&self) -> Style {
        Style::default().fg(self.roles().watching).add_modifier(Modifier::BOLD)
    }

    fn notice_style(&self) -> Style {
        Style::default().fg(self.roles().notice)
    }

    fn error_style(&self) -> Style {
        Style::default().fg(self.roles().error)
    }

    fn selection_style(&self) -> Style {
        let roles = self.roles();
        Style::default().fg(roles.selection_fg).bg(roles.selection_bg)
    }
}
