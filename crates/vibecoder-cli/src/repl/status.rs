use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

pub const ANIMATION_TICK: Duration = Duration::from_millis(500);
const FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Waiting,
    Responding,
    Working {
        started: Instant,
        deadline: Instant,
    },
}

impl Status {
    pub fn is_busy(&self) -> bool {
        !matches!(self, Status::Waiting)
    }

    /// Time spent in work mode so far
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        match self {
            Status::Working { started, .. } => Some(now.saturating_duration_since(*started)),
            _ => None,
        }
    }

    pub fn status_line(&self, now: Instant) -> String {
        match self {
            Status::Waiting => "👂 Waiting for input...".to_string(),
            Status::Responding => "💭 Responding...".to_string(),
            Status::Working { deadline, .. } => {
                let remaining = deadline.saturating_duration_since(now).as_secs();
                format!(
                    "⚡ Working ⏳ {}:{:02} remaining",
                    remaining / 60,
                    remaining % 60
                )
            }
        }
    }
}

/// Where the busy indicator is drawn
pub trait StatusDisplay {
    fn show(&mut self, text: &str);
    fn hide(&mut self);
}

/// Redraw the busy indicator until the status channel closes. Only reads the
/// published status; it never touches the controller.
pub async fn animate<D: StatusDisplay>(mut status: watch::Receiver<Status>, mut display: D) {
    let mut ticker = time::interval(ANIMATION_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut frame = 0;
    let mut visible = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        let current = *status.borrow_and_update();
        if current.is_busy() {
            let line = current.status_line(Instant::now());
            display.show(&format!("{} - {}", line, FRAMES[frame % FRAMES.len()]));
            frame += 1;
            visible = true;
        } else if visible {
            display.hide();
            visible = false;
            frame = 0;
        }
    }

    if visible {
        display.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingDisplay {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl StatusDisplay for RecordingDisplay {
        fn show(&mut self, text: &str) {
            self.events.lock().unwrap().push(text.to_string());
        }

        fn hide(&mut self) {
            self.events.lock().unwrap().push("<hidden>".to_string());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_lines() {
        let now = Instant::now();
        assert_eq!(Status::Waiting.status_line(now), "👂 Waiting for input...");
        assert_eq!(Status::Responding.status_line(now), "💭 Responding...");

        let working = Status::Working {
            started: now,
            deadline: now + Duration::from_secs(125),
        };
        assert_eq!(working.status_line(now), "⚡ Working ⏳ 2:05 remaining");
        assert_eq!(
            working.status_line(now + Duration::from_secs(200)),
            "⚡ Working ⏳ 0:00 remaining"
        );

        assert_eq!(
            working.elapsed(now + Duration::from_secs(3)),
            Some(Duration::from_secs(3))
        );
        assert_eq!(Status::Responding.elapsed(now), None);

        assert!(!Status::Waiting.is_busy());
        assert!(Status::Responding.is_busy());
        assert!(working.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_animation_follows_status() {
        let (sender, receiver) = watch::channel(Status::Waiting);
        let display = RecordingDisplay::default();
        let events = display.events.clone();
        let task = tokio::spawn(animate(receiver, display));

        time::sleep(Duration::from_millis(1200)).await;
        assert!(events.lock().unwrap().is_empty());

        sender.send_replace(Status::Responding);
        time::sleep(Duration::from_millis(1200)).await;
        {
            let events = events.lock().unwrap();
            assert!(events.len() >= 2);
            assert_eq!(events[0], "💭 Responding... - |");
            assert_eq!(events[1], "💭 Responding... - /");
        }

        sender.send_replace(Status::Waiting);
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(events.lock().unwrap().last().unwrap(), "<hidden>");

        drop(sender);
        task.await.unwrap();
    }
}
