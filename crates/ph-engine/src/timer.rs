use std::time::Duration;
use tokio::time::Instant;

/// Wall-clock deadline for the seat currently on the clock.
///
/// `enforce_action_timeout` is idempotent and re-entrant: it only ever acts
/// when `now >= deadline`, and clearing the deadline is always the last
/// step of handling an action, so calling it twice in a row is harmless.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub const DEFAULT_ACTION_TIME: Duration = Duration::from_secs(30);

    pub fn start(&mut self, timeout: Duration) {
        self.deadline = Some(Instant::now() + timeout);
    }
    pub fn clear(&mut self) {
        self.deadline = None;
    }
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
    pub fn expired(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_cleared() {
        let timer = Timer::default();
        assert!(timer.deadline().is_none());
        assert!(!timer.expired());
    }

    #[test]
    fn zero_timeout_expires_immediately() {
        let mut timer = Timer::default();
        timer.start(Duration::ZERO);
        assert!(timer.expired());
    }

    #[test]
    fn clear_removes_deadline() {
        let mut timer = Timer::default();
        timer.start(Duration::ZERO);
        timer.clear();
        assert!(!timer.expired());
    }
}
