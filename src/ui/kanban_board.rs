use ratatui::{
    layout::{Constraint, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::kanban::{column_items, Board};
use crate::model::work_item::{Field, ItemId, Status, WorkItem};
use crate::ui::theme::{priority_color, status_color, ACCENT, DIM};
use crate::ui::window_offset;

const CARD_HEIGHT: u16 = 2;

pub fn column_areas(area: Rect) -> [Rect; 3] {
    Layout::horizontal([Constraint::Ratio(1, 3); 3]).areas(area)
}

fn card_area(column: Rect) -> Rect {
    column.inner(Margin {
        horizontal: 1,
        vertical: 1,
    })
}

fn visible_cards(column: Rect) -> usize {
    (card_area(column).height / CARD_HEIGHT) as usize
}

/// First card drawn in a column. Only the focused column scrolls.
fn column_offset(board: &Board, status: Status, column: Rect) -> usize {
    if board.column_status() == status {
        window_offset(board.row, visible_cards(column))
    } else {
        0
    }
}

/// The column under (x, y), if any.
pub fn column_at(area: Rect, x: u16, y: u16) -> Option<Status> {
    column_areas(area)
        .iter()
        .position(|r| x >= r.x && x < r.right() && y >= r.y && y < r.bottom())
        .and_then(Status::from_column)
}

/// The card under (x, y), if any.
pub fn card_at(area: Rect, board: &Board, items: &[WorkItem], x: u16, y: u16) -> Option<ItemId> {
    let status = column_at(area, x, y)?;
    let column = column_areas(area)[status.column()];
    let cards = card_area(column);
    if y < cards.y || y >= cards.bottom() || x < cards.x || x >= cards.right() {
        return None;
    }
    let index = column_offset(board, status, column) + ((y - cards.y) / CARD_HEIGHT) as usize;
    column_items(items, status).get(index).map(|i| i.id)
}

fn card(app: &App, item: &WorkItem, in_hand: bool) -> ListItem<'static> {
    let due = item
        .due_date
        .map(|d| format!(" · due {}", d.format("%b %d")))
        .unwrap_or_default();
    let mut title_style = Style::default().add_modifier(Modifier::BOLD);
    if in_hand {
        title_style = title_style.fg(ACCENT);
    }
    let mut meta = vec![
        Span::styled(format!("#{} · ", item.id), Style::default().fg(DIM)),
        Span::styled(
            item.priority.label(),
            Style::default().fg(priority_color(item.priority)),
        ),
        Span::styled(due, Style::default().fg(DIM)),
    ];
    if app.pending.is_pending(item.id, Field::Status)
        || app.pending.is_pending(item.id, Field::Priority)
    {
        meta.push(Span::styled(" …", Style::default().fg(DIM)));
    }
    ListItem::new(vec![
        Line::from(Span::styled(item.title.clone(), title_style)),
        Line::from(meta),
    ])
}

fn render_column(f: &mut Frame, area: Rect, app: &App, status: Status) {
    let cards = column_items(&app.items, status);
    let drag = app.board.drag;
    let focused = app.board.column_status() == status;
    let hovered = drag.is_some_and(|d| d.over == Some(status));

    let border = if hovered {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else if focused && drag.is_none() {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(DIM)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(
            format!(" {} ({}) ", status.label(), cards.len()),
            Style::default().fg(status_color(status)),
        ));

    if cards.is_empty() {
        let hint = Paragraph::new(Span::styled("No items", Style::default().fg(DIM))).block(block);
        f.render_widget(hint, area);
        return;
    }

    let offset = column_offset(&app.board, status, area);
    let list_items: Vec<ListItem> = cards
        .iter()
        .skip(offset)
        .map(|item| card(app, item, drag.is_some_and(|d| d.item_id == item.id)))
        .collect();

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.board.row - offset));
    }
    let list = List::new(list_items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, area, &mut state);
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    for (status, column) in Status::ALL.into_iter().zip(column_areas(area)) {
        render_column(f, column, app, status);
    }
}
