use std::time::Duration;

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::app::Action;

pub async fn run_event_loop(tx: mpsc::UnboundedSender<Action>) {
    let mut reader = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(500));

    loop {
        let action = tokio::select! {
            _ = tick.tick() => Some(Action::Tick),
            maybe_event = reader.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => key_to_action(key),
                Some(Ok(Event::Mouse(mouse))) => mouse_to_action(mouse).map(Action::Mouse),
                Some(Ok(Event::Resize(w, h))) => Some(Action::Resize(w, h)),
                Some(Err(_)) | None => break,
                _ => None,
            },
        };
        if let Some(action) = action {
            if tx.send(action).is_err() {
                break;
            }
        }
    }
}

fn key_to_action(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    let key = match key.code {
        KeyCode::Up => KeyAction::Up,
        KeyCode::Down => KeyAction::Down,
        KeyCode::Left => KeyAction::Left,
        KeyCode::Right => KeyAction::Right,
        KeyCode::Enter => KeyAction::Select,
        KeyCode::Esc => KeyAction::Escape,
        KeyCode::Tab => KeyAction::Tab,
        KeyCode::Backspace => KeyAction::Backspace,
        KeyCode::Char(c) => KeyAction::Char(c),
        _ => return None,
    };
    Some(Action::Key(key))
}

fn mouse_to_action(mouse: MouseEvent) -> Option<MouseAction> {
    let (x, y) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(MouseAction::Press { x, y }),
        MouseEventKind::Drag(MouseButton::Left) => Some(MouseAction::Drag { x, y }),
        MouseEventKind::Up(MouseButton::Left) => Some(MouseAction::Release { x, y }),
        _ => None,
    }
}

/// Keys are passed through mostly raw; what a character means depends on
/// whether a text prompt is open, which only the app knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Up,
    Down,
    Left,
    Right,
    Select,
    Escape,
    Tab,
    Backspace,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Press { x: u16, y: u16 },
    Drag { x: u16, y: u16 },
    Release { x: u16, y: u16 },
}
