use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::backend::{Backend, BackendError};
use crate::config::{AppConfig, DefaultView};
use crate::event::{KeyAction, MouseAction};
use crate::kanban::Board;
use crate::model::work_item::{Field, FieldChange, ItemId, Priority, Status, WorkItem};
use crate::mutation::{IssuedUpdate, MutationError, PendingUpdates, Resolution};
use crate::notify::Notifications;
use crate::sort::{sort_items, SortConfig};
use crate::table::TableView;
use crate::ui;

#[derive(Debug, Clone)]
pub enum Action {
    Key(KeyAction),
    Mouse(MouseAction),
    Resize(u16, u16),
    Tick,
    ItemsLoaded(Vec<WorkItem>),
    FetchError(String),
    FieldUpdated {
        update: IssuedUpdate,
        outcome: Result<(), BackendError>,
    },
    ItemRenamed {
        item_id: ItemId,
        title: String,
        outcome: Result<(), BackendError>,
    },
    ItemDeleted {
        item_id: ItemId,
        outcome: Result<(), BackendError>,
    },
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Table,
    Kanban,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    View,
    Edit,
    Delete,
}

impl RowAction {
    pub const ALL: [RowAction; 3] = [RowAction::View, RowAction::Edit, RowAction::Delete];

    pub fn label(&self) -> &'static str {
        match self {
            RowAction::View => "View",
            RowAction::Edit => "Edit",
            RowAction::Delete => "Delete",
        }
    }
}

/// Whatever sits on top of the current view and takes the keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    FieldMenu {
        item_id: ItemId,
        field: Field,
        selected: usize,
    },
    Actions {
        item_id: ItemId,
        selected: usize,
    },
    Drawer {
        item_id: ItemId,
    },
    EditTitle {
        item_id: ItemId,
        input: String,
    },
    ConfirmDelete {
        item_id: ItemId,
    },
}

impl Overlay {
    pub fn item_id(&self) -> ItemId {
        match self {
            Overlay::FieldMenu { item_id, .. }
            | Overlay::Actions { item_id, .. }
            | Overlay::Drawer { item_id }
            | Overlay::EditTitle { item_id, .. }
            | Overlay::ConfirmDelete { item_id } => *item_id,
        }
    }
}

/// The fixed choices offered by a status or priority menu.
pub fn menu_choices(field: Field) -> [FieldChange; 3] {
    match field {
        Field::Status => Status::ALL.map(FieldChange::Status),
        Field::Priority => Priority::ALL.map(FieldChange::Priority),
    }
}

fn not_configured() -> BackendError {
    BackendError::Transport("no API configured".into())
}

pub struct App {
    pub items: Vec<WorkItem>,
    pub pending: PendingUpdates,
    pub sort: SortConfig,
    pub view_mode: ViewMode,
    pub table: TableView,
    pub board: Board,
    pub overlay: Option<Overlay>,
    pub notifications: Notifications,
    pub loading: bool,
    pub should_quit: bool,
    pub screen: Rect,
    pub action_tx: mpsc::UnboundedSender<Action>,
    backend: Option<Arc<dyn Backend>>,
}

impl App {
    pub fn new(
        config: &AppConfig,
        backend: Option<Arc<dyn Backend>>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Result<Self> {
        let sort = config.initial_sort()?;
        let view_mode = match config.ui.default_view {
            DefaultView::Table => ViewMode::Table,
            DefaultView::Kanban => ViewMode::Kanban,
        };

        let mut notifications = Notifications::default();
        if backend.is_none() {
            notifications.error("No API configured: set [api] base_url in ~/.taskboard/config.toml");
        }

        Ok(Self {
            items: Vec::new(),
            pending: PendingUpdates::new(),
            sort,
            view_mode,
            table: TableView::default(),
            board: Board::default(),
            overlay: None,
            notifications,
            loading: false,
            should_quit: false,
            screen: Rect::default(),
            action_tx,
            backend,
        })
    }

    pub fn update(&mut self, action: Action) {
        match action {
            Action::Key(key) => self.handle_key(key),
            Action::Mouse(mouse) => self.handle_mouse(mouse),
            Action::Resize(w, h) => self.screen = Rect::new(0, 0, w, h),
            Action::Tick => self.notifications.tick(Instant::now()),
            Action::ItemsLoaded(items) => {
                info!(count = items.len(), "work items loaded");
                self.items = items;
                self.pending.reapply(&mut self.items);
                self.loading = false;
                self.after_items_changed();
            }
            Action::FetchError(msg) => {
                self.loading = false;
                self.notifications.error(format!("Fetch error: {msg}"));
            }
            Action::FieldUpdated { update, outcome } => {
                let resolution = self.pending.resolve(&mut self.items, &update, outcome);
                if let Resolution::RolledBack { restored, error } = resolution {
                    self.notifications.error(format!(
                        "Could not set {} of #{}, back to {}: {error}",
                        update.field(),
                        update.item_id,
                        restored.value_str()
                    ));
                }
                self.board.clamp(&self.items);
            }
            Action::ItemRenamed {
                item_id,
                title,
                outcome,
            } => match outcome {
                Ok(()) => {
                    if let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) {
                        item.title = title;
                    }
                    self.notifications.info(format!("#{item_id} renamed"));
                }
                Err(e) => {
                    warn!(item_id, error = %e, "rename failed");
                    self.notifications.error(format!("Could not rename #{item_id}: {e}"));
                }
            },
            Action::ItemDeleted { item_id, outcome } => match outcome {
                Ok(()) => {
                    self.items.retain(|i| i.id != item_id);
                    self.notifications.info(format!("#{item_id} deleted"));
                    self.after_items_changed();
                }
                Err(e) => {
                    warn!(item_id, error = %e, "delete failed");
                    self.notifications.error(format!("Could not delete #{item_id}: {e}"));
                }
            },
            Action::Quit => {
                self.should_quit = true;
            }
        }
    }

    fn after_items_changed(&mut self) {
        self.board.clamp(&self.items);
        if let Some(overlay) = &self.overlay {
            let id = overlay.item_id();
            if !self.items.iter().any(|i| i.id == id) {
                self.overlay = None;
            }
        }
        if let Some(drag) = self.board.drag {
            if !self.items.iter().any(|i| i.id == drag.item_id) {
                self.board.cancel();
            }
        }
    }

    fn spawn_call<F>(&self, call: F)
    where
        F: Future<Output = Action> + Send + 'static,
    {
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(call.await);
        });
    }

    pub fn refresh_items(&mut self) {
        let Some(backend) = self.backend.clone() else {
            return;
        };
        self.loading = true;
        self.spawn_call(async move {
            match backend.fetch_items().await {
                Ok(items) => Action::ItemsLoaded(items),
                Err(e) => Action::FetchError(format!("{}: {e}", backend.name())),
            }
        });
    }

    /// The single entry point for status/priority changes. Applies the change
    /// locally now and reconciles when the backend answers.
    pub fn update_field(&mut self, item_id: ItemId, change: FieldChange) -> Result<(), MutationError> {
        let update = self.pending.begin(&mut self.items, item_id, change)?;
        let backend = self.backend.clone();
        self.spawn_call(async move {
            let outcome = match backend {
                Some(b) => b.set_field(update.item_id, update.change).await,
                None => Err(not_configured()),
            };
            Action::FieldUpdated { update, outcome }
        });
        Ok(())
    }

    fn apply_change(&mut self, item_id: ItemId, change: FieldChange) {
        if let Err(e) = self.update_field(item_id, change) {
            self.notifications.error(e.to_string());
            return;
        }
        // a status change moves the card; keep the board focused on it
        if self.view_mode == ViewMode::Kanban {
            self.board.focus_item(item_id, &self.items);
        }
    }

    fn rename_item(&mut self, item_id: ItemId, title: String) {
        let backend = self.backend.clone();
        self.spawn_call(async move {
            let outcome = match backend {
                Some(b) => b.rename_item(item_id, &title).await,
                None => Err(not_configured()),
            };
            Action::ItemRenamed {
                item_id,
                title,
                outcome,
            }
        });
    }

    fn delete_item(&mut self, item_id: ItemId) {
        let backend = self.backend.clone();
        self.spawn_call(async move {
            let outcome = match backend {
                Some(b) => b.delete_item(item_id).await,
                None => Err(not_configured()),
            };
            Action::ItemDeleted { item_id, outcome }
        });
    }

    pub fn item(&self, item_id: ItemId) -> Option<&WorkItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Rows of the table view, in display order.
    pub fn sorted_items(&self) -> Vec<&WorkItem> {
        sort_items(&self.sort, &self.items)
    }

    fn focused_item_id(&self) -> Option<ItemId> {
        match self.view_mode {
            ViewMode::Table => self.table.selected_item(&self.sorted_items()).map(|i| i.id),
            ViewMode::Kanban => self.board.focused_item(&self.items).map(|i| i.id),
        }
    }

    fn open_field_menu(&mut self, field: Field) {
        let Some((item_id, current)) = self
            .focused_item_id()
            .and_then(|id| self.item(id))
            .map(|i| (i.id, i.field_value(field)))
        else {
            return;
        };
        if self.pending.is_pending(item_id, field) {
            debug!(item_id, %field, "control disabled while update is in flight");
            return;
        }
        let selected = menu_choices(field)
            .iter()
            .position(|c| *c == current)
            .unwrap_or(0);
        self.overlay = Some(Overlay::FieldMenu {
            item_id,
            field,
            selected,
        });
    }

    fn open_actions(&mut self) {
        if let Some(item_id) = self.focused_item_id() {
            self.overlay = Some(Overlay::Actions {
                item_id,
                selected: 0,
            });
        }
    }

    fn toggle_view(&mut self) {
        self.board.cancel();
        self.view_mode = match self.view_mode {
            ViewMode::Table => ViewMode::Kanban,
            ViewMode::Kanban => ViewMode::Table,
        };
    }

    fn handle_key(&mut self, key: KeyAction) {
        if let Some(overlay) = self.overlay.take() {
            self.overlay = self.handle_overlay_key(overlay, key);
            return;
        }

        match key {
            KeyAction::Char('q') => self.should_quit = true,
            KeyAction::Tab => self.toggle_view(),
            KeyAction::Char('r') => self.refresh_items(),
            KeyAction::Char('t') => self.open_field_menu(Field::Status),
            KeyAction::Char('p') => self.open_field_menu(Field::Priority),
            _ => match self.view_mode {
                ViewMode::Table => self.handle_table_key(key),
                ViewMode::Kanban => self.handle_kanban_key(key),
            },
        }
    }

    fn handle_table_key(&mut self, key: KeyAction) {
        match key {
            KeyAction::Up | KeyAction::Down => {
                let delta = if key == KeyAction::Up { -1 } else { 1 };
                let rows = sort_items(&self.sort, &self.items);
                self.table.move_row(delta, &rows);
            }
            KeyAction::Left => self.table.move_header(-1),
            KeyAction::Right => self.table.move_header(1),
            KeyAction::Char('s') => self.toggle_sort(self.table.focused_field()),
            KeyAction::Select => self.open_actions(),
            _ => {}
        }
    }

    fn toggle_sort(&mut self, field: crate::sort::SortField) {
        self.sort.toggle(field);
        info!(sort = %self.sort, "sort changed");
    }

    fn handle_kanban_key(&mut self, key: KeyAction) {
        match key {
            KeyAction::Left => self.board.move_column(-1, &self.items),
            KeyAction::Right => self.board.move_column(1, &self.items),
            KeyAction::Up => self.board.move_row(-1, &self.items),
            KeyAction::Down => self.board.move_row(1, &self.items),
            KeyAction::Char(' ') => {
                if self.board.drag.is_some() {
                    self.finish_drag();
                } else {
                    self.board.pick_up(&self.items);
                }
            }
            KeyAction::Select => {
                if self.board.drag.is_some() {
                    self.finish_drag();
                } else {
                    self.open_actions();
                }
            }
            KeyAction::Escape => self.board.cancel(),
            _ => {}
        }
    }

    fn finish_drag(&mut self) {
        if let Some((item_id, change)) = self.board.drop_card(&self.items) {
            self.apply_change(item_id, change);
        }
    }

    fn handle_overlay_key(&mut self, overlay: Overlay, key: KeyAction) -> Option<Overlay> {
        match overlay {
            Overlay::FieldMenu {
                item_id,
                field,
                selected,
            } => match key {
                KeyAction::Up => Some(Overlay::FieldMenu {
                    item_id,
                    field,
                    selected: selected.saturating_sub(1),
                }),
                KeyAction::Down => Some(Overlay::FieldMenu {
                    item_id,
                    field,
                    selected: (selected + 1).min(menu_choices(field).len() - 1),
                }),
                KeyAction::Select => {
                    if let Some(change) = menu_choices(field).get(selected) {
                        self.apply_change(item_id, *change);
                    }
                    None
                }
                KeyAction::Escape | KeyAction::Char('q') => None,
                _ => Some(Overlay::FieldMenu {
                    item_id,
                    field,
                    selected,
                }),
            },
            Overlay::Actions { item_id, selected } => match key {
                KeyAction::Up => Some(Overlay::Actions {
                    item_id,
                    selected: selected.saturating_sub(1),
                }),
                KeyAction::Down => Some(Overlay::Actions {
                    item_id,
                    selected: (selected + 1).min(RowAction::ALL.len() - 1),
                }),
                KeyAction::Select => match RowAction::ALL.get(selected) {
                    Some(RowAction::View) => Some(Overlay::Drawer { item_id }),
                    Some(RowAction::Edit) => self.item(item_id).map(|item| Overlay::EditTitle {
                        item_id,
                        input: item.title.clone(),
                    }),
                    Some(RowAction::Delete) => Some(Overlay::ConfirmDelete { item_id }),
                    None => None,
                },
                KeyAction::Escape | KeyAction::Char('q') => None,
                _ => Some(Overlay::Actions { item_id, selected }),
            },
            Overlay::Drawer { item_id } => match key {
                KeyAction::Escape | KeyAction::Select | KeyAction::Char('q') => None,
                _ => Some(Overlay::Drawer { item_id }),
            },
            Overlay::EditTitle { item_id, mut input } => match key {
                KeyAction::Char(c) => {
                    input.push(c);
                    Some(Overlay::EditTitle { item_id, input })
                }
                KeyAction::Backspace => {
                    input.pop();
                    Some(Overlay::EditTitle { item_id, input })
                }
                KeyAction::Select => {
                    let title = input.trim().to_string();
                    let changed = self.item(item_id).is_some_and(|i| i.title != title);
                    if !title.is_empty() && changed {
                        self.rename_item(item_id, title);
                    }
                    None
                }
                KeyAction::Escape => None,
                _ => Some(Overlay::EditTitle { item_id, input }),
            },
            Overlay::ConfirmDelete { item_id } => match key {
                KeyAction::Char('y') | KeyAction::Select => {
                    self.delete_item(item_id);
                    None
                }
                KeyAction::Char('n') | KeyAction::Escape => None,
                _ => Some(Overlay::ConfirmDelete { item_id }),
            },
        }
    }

    fn handle_mouse(&mut self, mouse: MouseAction) {
        if self.overlay.is_some() {
            return;
        }
        let [main, _] = ui::layout(self.screen);
        match self.view_mode {
            ViewMode::Table => {
                let MouseAction::Press { x, y } = mouse else {
                    return;
                };
                if let Some(field) = ui::item_table::header_at(main, x, y) {
                    self.toggle_sort(field);
                    return;
                }
                let rows = sort_items(&self.sort, &self.items);
                let selected = self.table.selected_index(&rows);
                if let Some(index) = ui::item_table::row_at(main, y, selected) {
                    self.table.select_index(index, &rows);
                }
            }
            ViewMode::Kanban => match mouse {
                MouseAction::Press { x, y } => {
                    let hit = ui::kanban_board::card_at(main, &self.board, &self.items, x, y);
                    if let Some(item_id) = hit {
                        self.board.focus_item(item_id, &self.items);
                        if let Some(item) = self.items.iter().find(|i| i.id == item_id) {
                            self.board.pick_up_item(item);
                        }
                    }
                }
                MouseAction::Drag { x, y } => {
                    self.board.hover(ui::kanban_board::column_at(main, x, y));
                }
                MouseAction::Release { x, y } => {
                    if self.board.drag.is_some() {
                        self.board.hover(ui::kanban_board::column_at(main, x, y));
                        self.finish_drag();
                    }
                }
            },
        }
    }
}
