use crate::model::work_item::{FieldChange, ItemId, Status, WorkItem};

/// A card in hand. `over` is the column under the card, `None` when it is
/// hovering outside every column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drag {
    pub item_id: ItemId,
    pub from: Status,
    pub over: Option<Status>,
}

/// The change a drop produces for a card whose status is `current`, if any.
/// Same column and nowhere are no-ops; position inside a column is not
/// tracked.
pub fn drop_change(current: Status, target: Option<Status>) -> Option<FieldChange> {
    match target {
        Some(status) if status != current => Some(FieldChange::Status(status)),
        _ => None,
    }
}

/// Items in one column, in collection order.
pub fn column_items(items: &[WorkItem], status: Status) -> Vec<&WorkItem> {
    items.iter().filter(|i| i.status == status).collect()
}

#[derive(Debug, Default)]
pub struct Board {
    pub column: usize,
    pub row: usize,
    pub drag: Option<Drag>,
}

impl Board {
    pub fn column_status(&self) -> Status {
        Status::from_column(self.column).unwrap_or(Status::Pending)
    }

    pub fn focused_item<'a>(&self, items: &'a [WorkItem]) -> Option<&'a WorkItem> {
        column_items(items, self.column_status())
            .get(self.row)
            .copied()
    }

    pub fn move_column(&mut self, delta: isize, items: &[WorkItem]) {
        let last = Status::ALL.len() - 1;
        if let Some(drag) = &mut self.drag {
            let from = drag.over.map_or(drag.from.column(), |s| s.column());
            let to = from.saturating_add_signed(delta).min(last);
            drag.over = Status::from_column(to);
            return;
        }
        self.column = self.column.saturating_add_signed(delta).min(last);
        self.clamp(items);
    }

    pub fn move_row(&mut self, delta: isize, items: &[WorkItem]) {
        if self.drag.is_some() {
            return;
        }
        self.row = self.row.saturating_add_signed(delta);
        self.clamp(items);
    }

    pub fn clamp(&mut self, items: &[WorkItem]) {
        let len = column_items(items, self.column_status()).len();
        self.row = self.row.min(len.saturating_sub(1));
    }

    /// Pick up the focused card. Returns false when the column is empty.
    pub fn pick_up(&mut self, items: &[WorkItem]) -> bool {
        let Some(item) = self.focused_item(items) else {
            return false;
        };
        self.pick_up_item(item);
        true
    }

    pub fn pick_up_item(&mut self, item: &WorkItem) {
        self.drag = Some(Drag {
            item_id: item.id,
            from: item.status,
            over: Some(item.status),
        });
    }

    pub fn hover(&mut self, over: Option<Status>) {
        if let Some(drag) = &mut self.drag {
            drag.over = over;
        }
    }

    /// Let go of the card over its current target. The card's status is read
    /// from `items`, since a rollback or refresh may have moved it while held.
    pub fn drop_card(&mut self, items: &[WorkItem]) -> Option<(ItemId, FieldChange)> {
        let drag = self.drag.take()?;
        let current = items.iter().find(|i| i.id == drag.item_id)?.status;
        drop_change(current, drag.over).map(|change| (drag.item_id, change))
    }

    pub fn cancel(&mut self) {
        self.drag = None;
    }

    /// Move focus onto `item_id` wherever it now sits.
    pub fn focus_item(&mut self, item_id: ItemId, items: &[WorkItem]) {
        let Some(item) = items.iter().find(|i| i.id == item_id) else {
            return;
        };
        self.column = item.status.column();
        self.row = column_items(items, item.status)
            .iter()
            .position(|i| i.id == item_id)
            .unwrap_or(0);
    }
}
