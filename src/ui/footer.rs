use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Overlay, ViewMode};
use crate::ui::theme::{notice_color, DIM};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();

    match (&app.overlay, app.view_mode) {
        (Some(Overlay::EditTitle { .. }), _) => {
            spans.push(hint("enter", "save"));
            spans.push(hint("esc", "cancel"));
        }
        (Some(Overlay::ConfirmDelete { .. }), _) => {
            spans.push(hint("y", "delete"));
            spans.push(hint("n", "keep"));
        }
        (Some(Overlay::Drawer { .. }), _) => {
            spans.push(hint("esc", "close"));
        }
        (Some(_), _) => {
            spans.push(hint("↑↓", "choose"));
            spans.push(hint("enter", "apply"));
            spans.push(hint("esc", "close"));
        }
        (None, ViewMode::Table) => {
            spans.push(hint("↑↓", "navigate"));
            spans.push(hint("←→", "column"));
            spans.push(hint("s", "sort"));
            spans.push(hint("t", "status"));
            spans.push(hint("p", "priority"));
            spans.push(hint("enter", "actions"));
            spans.push(hint("tab", "kanban"));
            spans.push(hint("r", "refresh"));
            spans.push(hint("q", "quit"));
        }
        (None, ViewMode::Kanban) if app.board.drag.is_some() => {
            spans.push(hint("←→", "move"));
            spans.push(hint("space", "drop"));
            spans.push(hint("esc", "cancel"));
        }
        (None, ViewMode::Kanban) => {
            spans.push(hint("←→↑↓", "navigate"));
            spans.push(hint("space", "pick up"));
            spans.push(hint("t", "status"));
            spans.push(hint("p", "priority"));
            spans.push(hint("enter", "actions"));
            spans.push(hint("tab", "table"));
            spans.push(hint("q", "quit"));
        }
    }

    if app.loading {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            " LOADING ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }

    if !app.pending.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!(" SAVING {} ", app.pending.len()),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ));
    }

    if let Some(notice) = app.notifications.current() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            notice.text.clone(),
            Style::default().fg(notice_color(notice.level)),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn hint(key: &str, desc: &str) -> Span<'static> {
    Span::styled(format!(" {key}:{desc} "), Style::default().fg(DIM))
}
