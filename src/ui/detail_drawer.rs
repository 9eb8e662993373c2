use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::model::work_item::WorkItem;
use crate::ui::theme::{priority_color, status_color, ACCENT, DIM};

fn row(label: &str, value: Span<'static>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<10}"), Style::default().fg(Color::Gray)),
        value,
    ])
}

/// Read-only panel over the right side of the main area.
pub fn render(f: &mut Frame, area: Rect, item: &WorkItem) {
    let [_, drawer] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);

    let due = item
        .due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "No due date".into());
    let assignees = if item.assigned_to.is_empty() {
        Span::styled("Unassigned", Style::default().fg(DIM))
    } else {
        Span::raw(item.assignee_names())
    };

    let mut lines = vec![
        Line::from(Span::styled(
            item.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        row(
            "Status",
            Span::styled(item.status.label(), Style::default().fg(status_color(item.status))),
        ),
        row(
            "Priority",
            Span::styled(
                item.priority.label(),
                Style::default().fg(priority_color(item.priority)),
            ),
        ),
        row("Due", Span::raw(due)),
        row("Project", Span::raw(item.project.name.clone())),
        row("Assignees", assignees),
        Line::raw(""),
    ];

    match item.description.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(desc) => lines.extend(desc.lines().map(|l| Line::raw(l.to_string()))),
        None => lines.push(Line::from(Span::styled(
            "No description",
            Style::default().fg(DIM),
        ))),
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .title(format!(" #{} ", item.id))
                .title_bottom(Line::from(" esc:close ").right_aligned()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, drawer);
    f.render_widget(paragraph, drawer);
}
