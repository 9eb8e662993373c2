use crate::model::work_item::{ItemId, WorkItem};
use crate::sort::SortField;

/// Cursor state of the table view. The selection follows an item, not a row
/// index, so re-sorting or a status change does not move it to a neighbour.
#[derive(Debug, Default)]
pub struct TableView {
    pub selected: Option<ItemId>,
    pub header: usize,
}

impl TableView {
    pub fn selected_index(&self, rows: &[&WorkItem]) -> usize {
        self.selected
            .and_then(|id| rows.iter().position(|i| i.id == id))
            .unwrap_or(0)
    }

    pub fn selected_item<'a>(&self, rows: &[&'a WorkItem]) -> Option<&'a WorkItem> {
        rows.get(self.selected_index(rows)).copied()
    }

    pub fn move_row(&mut self, delta: isize, rows: &[&WorkItem]) {
        if rows.is_empty() {
            self.selected = None;
            return;
        }
        let index = self
            .selected_index(rows)
            .saturating_add_signed(delta)
            .min(rows.len() - 1);
        self.selected = Some(rows[index].id);
    }

    pub fn select_index(&mut self, index: usize, rows: &[&WorkItem]) {
        if let Some(item) = rows.get(index) {
            self.selected = Some(item.id);
        }
    }

    pub fn focused_field(&self) -> SortField {
        SortField::ALL[self.header.min(SortField::ALL.len() - 1)]
    }

    pub fn move_header(&mut self, delta: isize) {
        self.header = self
            .header
            .saturating_add_signed(delta)
            .min(SortField::ALL.len() - 1);
    }
}
