use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Tabs},
};

use super::roles::{Theme, ThemeRoles};

/// Standard bordered block with an optional bold title.
pub fn block<'a, T: Theme + ?Sized>(theme: &T, title: Option<&'a str>, focused: bool) -> Block<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style(focused))
        .style(panel_style(theme));
    if let Some(title) = title {
        block = block.title(Span::styled(title, theme.label_style().add_modifier(Modifier::BOLD)));
    }
    block
}

pub fn panel_style<T: Theme + ?Sized>(theme: &T) -> Style {
    let ThemeRoles { surface, text, .. } = *theme.roles();
    Style::default().bg(surface).fg(text)
}

/// Tab strip with the active title underlined.
pub fn tabs<'a, T: Theme + ?Sized>(theme: &T, titles: Vec<Line<'a>>, index: usize) -> Tabs<'a> {
    Tabs::new(titles)
        .select(index)
        .highlight_style(
            theme
                .text_style()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::UNDERLINED),
        )
        .style(theme.label_style())
}

/// Input text; invalid input turns the error color.
pub fn input_style<T: Theme + ?Sized>(theme: &T, valid: bool) -> Style {
    let ThemeRoles { surface, text, error, .. } = *theme.roles();
    Style::default().bg(surface).fg(if valid { text } else { error })
}

pub fn list_highlight_style<T: Theme + ?Sized>(theme: &T) -> Style {
    theme.selection_style().add_modifier(Modifier::BOLD)
}
