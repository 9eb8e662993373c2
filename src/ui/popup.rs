use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{menu_choices, RowAction};
use crate::model::work_item::{Field, FieldChange, ItemId};
use crate::ui::theme::{priority_color, status_color, ACCENT, DIM};

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    rect
}

fn frame(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(title)
}

fn render_menu(f: &mut Frame, area: Rect, title: String, items: Vec<ListItem>, selected: usize) {
    let rect = centered(area, 30, items.len() as u16 + 2);
    let list = List::new(items)
        .block(frame(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");
    let mut state = ListState::default().with_selected(Some(selected));
    f.render_widget(Clear, rect);
    f.render_stateful_widget(list, rect, &mut state);
}

pub fn render_field_menu(f: &mut Frame, area: Rect, item_id: ItemId, field: Field, selected: usize) {
    let items = menu_choices(field)
        .into_iter()
        .map(|choice| {
            let (label, color) = match choice {
                FieldChange::Status(s) => (s.label(), status_color(s)),
                FieldChange::Priority(p) => (p.label(), priority_color(p)),
            };
            ListItem::new(Span::styled(label, Style::default().fg(color)))
        })
        .collect();
    render_menu(f, area, format!(" #{item_id} {field} "), items, selected);
}

pub fn render_actions(f: &mut Frame, area: Rect, item_id: ItemId, selected: usize) {
    let items = RowAction::ALL
        .iter()
        .map(|action| {
            let style = match action {
                RowAction::Delete => Style::default().fg(Color::Red),
                _ => Style::default(),
            };
            ListItem::new(Span::styled(action.label(), style))
        })
        .collect();
    render_menu(f, area, format!(" #{item_id} "), items, selected);
}

pub fn render_edit_title(f: &mut Frame, area: Rect, item_id: ItemId, input: &str) {
    let rect = centered(area, area.width.saturating_sub(8).min(70), 3);
    let line = Line::from(vec![
        Span::raw(input.to_string()),
        Span::styled("█", Style::default().fg(ACCENT)),
    ]);
    let paragraph = Paragraph::new(line).block(
        frame(format!(" Rename #{item_id} "))
            .title_bottom(Line::from(" enter:save  esc:cancel ").right_aligned()),
    );
    f.render_widget(Clear, rect);
    f.render_widget(paragraph, rect);
}

pub fn render_confirm_delete(f: &mut Frame, area: Rect, item_id: ItemId, title: &str) {
    let rect = centered(area, area.width.saturating_sub(8).min(60), 4);
    let lines = vec![
        Line::from(format!("Delete \"{title}\"?")),
        Line::from(Span::styled("y:delete  n:keep", Style::default().fg(DIM))),
    ];
    let paragraph = Paragraph::new(lines).block(
        frame(format!(" Delete #{item_id} ")).border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(paragraph, rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 100, 20);
        let rect = centered(area, 30, 5);
        assert_eq!((rect.width, rect.height), (30, 5));
        assert_eq!(rect.x, 35);
        assert!(rect.y >= area.y && rect.bottom() <= area.bottom());
    }
}
