use std::collections::VecDeque;
use std::time::{Duration, Instant};

const SHOW_FOR: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: Level,
    pub text: String,
    pub shown_at: Option<Instant>,
}

/// Toasts shown one at a time in the footer, oldest first.
#[derive(Debug, Default)]
pub struct Notifications {
    queue: VecDeque<Notice>,
}

impl Notifications {
    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Level::Info, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Level::Error, text.into());
    }

    fn push(&mut self, level: Level, text: String) {
        self.queue.push_back(Notice {
            level,
            text,
            shown_at: None,
        });
    }

    pub fn current(&self) -> Option<&Notice> {
        self.queue.front()
    }

    /// Start the clock on the front notice and drop it once it has been up
    /// long enough.
    pub fn tick(&mut self, now: Instant) {
        let Some(front) = self.queue.front_mut() else {
            return;
        };
        match front.shown_at {
            None => front.shown_at = Some(now),
            Some(t) if now.duration_since(t) >= SHOW_FOR => {
                self.queue.pop_front();
                if let Some(next) = self.queue.front_mut() {
                    next.shown_at = Some(now);
                }
            }
            Some(_) => {}
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_rotate_after_display_time() {
        let mut n = Notifications::default();
        n.error("first");
        n.info("second");
        let start = Instant::now();

        n.tick(start);
        assert_eq!(n.current().unwrap().text, "first");
        n.tick(start + Duration::from_secs(1));
        assert_eq!(n.len(), 2);

        n.tick(start + SHOW_FOR);
        assert_eq!(n.current().unwrap().text, "second");
        assert_eq!(n.current().unwrap().level, Level::Info);

        n.tick(start + SHOW_FOR * 2);
        assert!(n.is_empty());
    }
}
