use ratatui::style::Color;

use crate::model::work_item::{Priority, Status};
use crate::notify::Level;

pub const ACCENT: Color = Color::Cyan;
pub const DIM: Color = Color::DarkGray;

pub fn status_color(status: Status) -> Color {
    match status {
        Status::Pending => Color::Yellow,
        Status::InProgress => Color::Cyan,
        Status::Completed => Color::Green,
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Blue,
        Priority::Low => Color::Gray,
    }
}

pub fn notice_color(level: Level) -> Color {
    match level {
        Level::Info => Color::Green,
        Level::Error => Color::Red,
    }
}
