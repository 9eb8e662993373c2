use ratatui::{
    layout::{Constraint, Flex, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, HighlightSpacing, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::model::work_item::{Field, WorkItem};
use crate::sort::{SortConfig, SortField};
use crate::ui::theme::{priority_color, status_color, ACCENT, DIM};
use crate::ui::window_offset;

// id column, then one column per sortable field in `SortField::ALL` order
const WIDTHS: [Constraint; 6] = [
    Constraint::Length(6),
    Constraint::Fill(1),
    Constraint::Length(14),
    Constraint::Length(12),
    Constraint::Length(12),
    Constraint::Length(16),
];
const HIGHLIGHT_SYMBOL: &str = "▶ ";
const SYMBOL_WIDTH: u16 = 2;
// header line plus its bottom margin
const HEADER_HEIGHT: u16 = 2;

fn inner(area: Rect) -> Rect {
    area.inner(Margin {
        horizontal: 1,
        vertical: 1,
    })
}

fn column_rects(area: Rect) -> [Rect; 6] {
    let inner = inner(area);
    let body = Rect {
        x: inner.x + SYMBOL_WIDTH,
        width: inner.width.saturating_sub(SYMBOL_WIDTH),
        ..inner
    };
    Layout::horizontal(WIDTHS)
        .flex(Flex::Legacy)
        .spacing(1)
        .areas(body)
}

pub fn body_height(area: Rect) -> usize {
    inner(area).height.saturating_sub(HEADER_HEIGHT) as usize
}

/// The sortable column whose header sits at (x, y).
pub fn header_at(area: Rect, x: u16, y: u16) -> Option<SortField> {
    if y != inner(area).y {
        return None;
    }
    column_rects(area)
        .iter()
        .position(|r| x >= r.x && x < r.right())
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| SortField::ALL.get(i).copied())
}

/// Index into the sorted rows for a click at line `y`, given the current
/// selection (which fixes the scroll offset).
pub fn row_at(area: Rect, y: u16, selected: usize) -> Option<usize> {
    let top = inner(area).y + HEADER_HEIGHT;
    let height = body_height(area);
    if y < top || (y - top) as usize >= height {
        return None;
    }
    Some(window_offset(selected, height) + (y - top) as usize)
}

fn header_label(sort: &SortConfig, field: SortField) -> String {
    match (sort.get(field), sort.rank(field)) {
        (Some(c), Some(rank)) => format!("{} {}{rank}", field.label(), c.direction().arrow()),
        _ => field.label().to_string(),
    }
}

fn field_cell(app: &App, item: &WorkItem, field: Field) -> Cell<'static> {
    let (label, color) = match field {
        Field::Status => (item.status.label(), status_color(item.status)),
        Field::Priority => (item.priority.label(), priority_color(item.priority)),
    };
    if app.pending.is_pending(item.id, field) {
        Cell::from(Span::styled(
            format!("{label} …"),
            Style::default().fg(DIM).add_modifier(Modifier::ITALIC),
        ))
    } else {
        Cell::from(Span::styled(format!("{label} ▾"), Style::default().fg(color)))
    }
}

fn build_row(app: &App, item: &WorkItem) -> Row<'static> {
    let due = item
        .due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "—".into());
    Row::new(vec![
        Cell::from(Span::styled(format!("#{}", item.id), Style::default().fg(DIM))),
        Cell::from(item.title.clone()),
        field_cell(app, item, Field::Status),
        field_cell(app, item, Field::Priority),
        Cell::from(due),
        Cell::from(item.project.name.clone()),
    ])
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let rows = app.sorted_items();
    let selected = app.table.selected_index(&rows);
    let height = body_height(area);
    let offset = window_offset(selected, height);

    let header_cells = std::iter::once(Cell::from("ID")).chain(
        SortField::ALL.iter().enumerate().map(|(i, field)| {
            let mut style = Style::default().add_modifier(Modifier::BOLD);
            if app.sort.get(*field).is_some() {
                style = style.fg(ACCENT);
            }
            if i == app.table.header {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            Cell::from(Span::styled(header_label(&app.sort, *field), style))
        }),
    );
    let header = Row::new(header_cells).bottom_margin(1);

    let (body, state) = if rows.is_empty() {
        let placeholder = Row::new(vec![
            Cell::from(""),
            Cell::from(Span::styled("No items found", Style::default().fg(DIM))),
        ]);
        (vec![placeholder], TableState::default())
    } else {
        let body: Vec<Row> = rows
            .iter()
            .skip(offset)
            .take(height.max(1))
            .map(|item| build_row(app, item))
            .collect();
        (body, TableState::default().with_selected(Some(selected - offset)))
    };

    let title = if app.loading {
        " Work Items (loading...) ".to_string()
    } else if app.sort.is_empty() {
        format!(" Work Items ({}) ", rows.len())
    } else {
        format!(" Work Items ({}) [sort: {}] ", rows.len(), app.sort)
    };

    let table = Table::new(body, WIDTHS)
        .header(header)
        .flex(Flex::Legacy)
        .column_spacing(1)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .title(Line::from(title)),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(HIGHLIGHT_SYMBOL)
        .highlight_spacing(HighlightSpacing::Always);

    let mut state = state;
    f.render_stateful_widget(table, area, &mut state);
}
