//! Frame rendering.
//!
//! Layout, top to bottom: tab strip, tab header, content, help bar. The
//! watch interval prompt overlays the bottom of the content area.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;
use crate::keymap::{Action, describe};
use crate::tab::{Phase, Tab};
use crate::ui::theme::{Theme, theme_helpers as th};

const MAX_TAB_TITLE_WIDTH: usize = 20;
const THROBBER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(frame: &mut Frame, app: &App, theme: &dyn Theme) {
    let [tabs_area, header_area, content_area, help_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(Paragraph::new("").style(th::panel_style(theme)), frame.area());
    draw_tabs(frame, tabs_area, app, theme);

    let tab = app.active_tab();
    let header_style = if tab.watch().is_watching() { theme.watching_style() } else { theme.header_style() };
    frame.render_widget(Paragraph::new(tab.header()).style(header_style), header_area);

    match tab.phase() {
        Phase::InputDomain => draw_domain_input(frame, content_area, tab, theme),
        Phase::SelectLookup => draw_provider_list(frame, content_area, app, tab, theme),
        Phase::Loading => draw_loading(frame, content_area, app, tab, theme),
        Phase::ViewResults | Phase::Error => draw_result(frame, content_area, tab, theme),
    }
    if tab.watch().is_awaiting_interval() {
        draw_interval_prompt(frame, content_area, tab, theme);
    }

    draw_help_bar(frame, help_area, app, theme);
}

fn draw_tabs(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
    let titles = app
        .tabs()
        .iter()
        .enumerate()
        .map(|(index, tab)| {
            let mut spans = vec![Span::raw(format!("{} {}", index + 1, truncate(tab.title(), MAX_TAB_TITLE_WIDTH)))];
            if tab.watch().is_watching() {
                spans.push(Span::styled(" ◉", theme.watching_style()));
            }
            Line::from(spans)
        })
        .collect();
    frame.render_widget(th::tabs(theme, titles, app.active_index()), area);
}

fn draw_domain_input(frame: &mut Frame, area: Rect, tab: &Tab, theme: &dyn Theme) {
    let [input_area, _] = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
    let input = Paragraph::new(tab.domain().value())
        .style(th::input_style(theme, true))
        .block(th::block(theme, Some(" Domain or IP "), true));
    frame.render_widget(input, input_area);
    if !tab.watch().is_awaiting_interval() {
        frame.set_cursor_position((
            input_area.x + 1 + tab.domain().cursor_column(),
            input_area.y + 1,
        ));
    }
}

fn draw_provider_list(frame: &mut Frame, area: Rect, app: &App, tab: &Tab, theme: &dyn Theme) {
    let items: Vec<ListItem> = app
        .providers()
        .iter()
        .map(|entry| ListItem::new(entry.name.as_str()))
        .collect();
    let list = List::new(items)
        .block(th::block(theme, Some(" Lookup type "), true))
        .highlight_style(th::list_highlight_style(theme))
        .highlight_symbol("› ");
    let mut state = ListState::default().with_selected(Some(tab.selected()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_loading(frame: &mut Frame, area: Rect, app: &App, tab: &Tab, theme: &dyn Theme) {
    let spinner = THROBBER[app.throbber_idx % THROBBER.len()];
    let line = Line::from(vec![
        Span::styled(spinner, theme.spinner_style()),
        Span::raw(format!(
            " Running {} for {}...",
            tab.provider().unwrap_or_default(),
            tab.target()
        )),
    ]);
    frame.render_widget(
        Paragraph::new(line)
            .style(theme.label_style())
            .block(th::block(theme, None, false)),
        area,
    );
}

fn draw_result(frame: &mut Frame, area: Rect, tab: &Tab, theme: &dyn Theme) {
    let style = if tab.phase() == Phase::Error { theme.error_style() } else { theme.text_style() };
    let body = tab.body().unwrap_or_default();
    frame.render_widget(
        Paragraph::new(body)
            .style(style)
            .wrap(Wrap { trim: false })
            .scroll((tab.scroll(), 0))
            .block(th::block(theme, None, false)),
        area,
    );
}

fn draw_interval_prompt(frame: &mut Frame, area: Rect, tab: &Tab, theme: &dyn Theme) {
    let height = if tab.interval_error().is_some() { 4 } else { 3 };
    let prompt_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(height),
        width: area.width,
        height: height.min(area.height),
    };
    let mut lines = vec![Line::from(tab.interval_input().value())];
    if let Some(error) = tab.interval_error() {
        lines.push(Line::from(Span::styled(error, theme.notice_style())));
    }
    frame.render_widget(Clear, prompt_area);
    frame.render_widget(
        Paragraph::new(lines)
            .style(th::input_style(theme, tab.interval_error().is_none()))
            .block(th::block(theme, Some(" Watch interval (seconds) "), true)),
        prompt_area,
    );
    frame.set_cursor_position((
        prompt_area.x + 1 + tab.interval_input().cursor_column(),
        prompt_area.y + 1,
    ));
}

fn draw_help_bar(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
    if let Some(status) = app.status() {
        frame.render_widget(Paragraph::new(status).style(theme.notice_style()), area);
        return;
    }
    let keymap = app.keymap();
    let tab = app.active_tab();
    let key = |action: Action| describe(keymap.binding(action));

    let mut hints: Vec<(String, &str)> = Vec::new();
    if tab.watch().is_awaiting_interval() {
        hints.push((key(Action::Confirm), "start watch"));
        hints.push((key(Action::Back), "cancel"));
    } else {
        match tab.phase() {
            Phase::InputDomain => hints.push((key(Action::Confirm), "choose lookup")),
            Phase::SelectLookup => {
                hints.push(("↑/↓".into(), "move"));
                hints.push((key(Action::Confirm), "run"));
                hints.push((key(Action::Back), "back"));
            }
            Phase::Loading => hints.push((key(Action::Back), "abandon")),
            Phase::ViewResults | Phase::Error => {
                hints.push(("↑/↓/PgUp/PgDn".into(), "scroll"));
                let watch_label = if tab.watch().is_watching() { "stop watch" } else { "watch" };
                hints.push((key(Action::WatchToggle), watch_label));
                hints.push((key(Action::Back), "new lookup"));
            }
        }
    }
    hints.push((key(Action::NewTab), "new tab"));
    hints.push((key(Action::CloseTab), "close tab"));
    hints.push((format!("{}/{}", key(Action::PrevTab), key(Action::NextTab)), "switch tab"));
    hints.push((key(Action::Quit), "quit"));

    let mut spans = Vec::with_capacity(hints.len() * 3);
    for (index, (keys, label)) in hints.into_iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled("  ", theme.hint_style()));
        }
        spans.push(Span::styled(keys, theme.header_style()));
        spans.push(Span::styled(format!(" {label}"), theme.hint_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Shorten `text` to `max_width` display columns, marking the cut with `…`.
fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let char_width = c.width().unwrap_or(0);
        if width + char_width > budget {
            break;
        }
        width += char_width;
        out.push(c);
    }
    out.push('…');
    out
}
