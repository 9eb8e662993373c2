pub mod detail_drawer;
pub mod footer;
pub mod item_table;
pub mod kanban_board;
pub mod popup;
pub mod theme;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

use crate::app::{App, Overlay, ViewMode};

/// Main content and the one-line footer.
pub fn layout(area: Rect) -> [Rect; 2] {
    Layout::vertical([Constraint::Min(6), Constraint::Length(1)]).areas(area)
}

/// First visible row of a list of `visible` rows that keeps `selected` on
/// screen. Rendering and mouse hit-testing both go through this.
pub fn window_offset(selected: usize, visible: usize) -> usize {
    if visible == 0 {
        return selected;
    }
    selected.saturating_sub(visible - 1)
}

pub fn render(f: &mut Frame, app: &App) {
    let [main_area, footer_area] = layout(f.area());

    match app.view_mode {
        ViewMode::Table => item_table::render(f, main_area, app),
        ViewMode::Kanban => kanban_board::render(f, main_area, app),
    }

    if let Some(overlay) = &app.overlay {
        match overlay {
            Overlay::Drawer { item_id } => {
                if let Some(item) = app.item(*item_id) {
                    detail_drawer::render(f, main_area, item);
                }
            }
            Overlay::FieldMenu {
                item_id,
                field,
                selected,
            } => popup::render_field_menu(f, main_area, *item_id, *field, *selected),
            Overlay::Actions { item_id, selected } => {
                popup::render_actions(f, main_area, *item_id, *selected)
            }
            Overlay::EditTitle { item_id, input } => {
                popup::render_edit_title(f, main_area, *item_id, input)
            }
            Overlay::ConfirmDelete { item_id } => {
                let title = app.item(*item_id).map(|i| i.title.as_str()).unwrap_or("");
                popup::render_confirm_delete(f, main_area, *item_id, title)
            }
        }
    }

    footer::render(f, footer_area, app);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use tokio::sync::mpsc;

    use crate::app::Action;
    use crate::backend::{tests::MockBackend, Backend};
    use crate::config::AppConfig;
    use crate::model::fixtures::item;
    use crate::model::work_item::{Priority, Status};
    use std::sync::Arc;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let backend: Arc<dyn Backend> = Arc::new(MockBackend::new());
        App::new(&AppConfig::default(), Some(backend), tx).unwrap()
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut text = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn empty_table_shows_placeholder_row() {
        let text = draw(&app());
        assert!(text.contains("No items found"));
        assert!(text.contains("Title"));
    }

    #[test]
    fn empty_kanban_shows_three_empty_columns() {
        let mut app = app();
        app.view_mode = ViewMode::Kanban;
        let text = draw(&app);
        assert!(text.contains("Pending (0)"));
        assert!(text.contains("In Progress (0)"));
        assert!(text.contains("Completed (0)"));
        assert_eq!(text.matches("No items").count(), 3);
    }

    #[test]
    fn table_headers_show_sort_rank() {
        let mut app = app();
        app.sort = "status:asc,priority:medium_first".parse().unwrap();
        app.update(Action::ItemsLoaded(vec![item(
            1,
            "Ship it",
            Status::Pending,
            Priority::Medium,
        )]));
        let text = draw(&app);
        assert!(text.contains("Status ▲1"));
        assert!(text.contains("Priority ◆2"));
        assert!(text.contains("Ship it"));
    }

    #[test]
    fn drawer_shows_item_details() {
        let mut app = app();
        let mut it = item(7, "Audit logs", Status::InProgress, Priority::High);
        it.description = Some("Check retention".into());
        app.update(Action::ItemsLoaded(vec![it]));
        app.overlay = Some(Overlay::Drawer { item_id: 7 });
        let text = draw(&app);
        assert!(text.contains("Check retention"));
        assert!(text.contains("Unassigned"));
    }

    #[test]
    fn window_offset_keeps_selection_visible() {
        assert_eq!(window_offset(0, 5), 0);
        assert_eq!(window_offset(4, 5), 0);
        assert_eq!(window_offset(7, 5), 3);
        assert_eq!(window_offset(3, 0), 3);
    }
}
