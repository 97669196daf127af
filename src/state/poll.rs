use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generation counter that keeps at most one background loop alive.
///
/// `begin` invalidates every earlier ticket; loops check `is_current`
/// after each sleep or await and exit once superseded or cancelled.
#[derive(Clone, Debug, Default)]
pub(crate) struct PollGuard {
    generation: Arc<AtomicU64>,
}

#[derive(Clone, Debug)]
pub(crate) struct PollTicket {
    generation: Arc<AtomicU64>,
    id: u64,
}

impl PollGuard {
    pub fn begin(&self) -> PollTicket {
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        PollTicket {
            generation: self.generation.clone(),
            id,
        }
    }

    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl PollTicket {
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.id
    }
}

/// Wall-clock ceiling for a loop, measured in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Deadline {
    started_ms: i64,
    limit_ms: i64,
}

impl Deadline {
    pub fn new(started_ms: i64, limit_ms: i64) -> Self {
        Self {
            started_ms,
            limit_ms,
        }
    }

    pub fn expired_at(&self, now_ms: i64) -> bool {
        now_ms - self.started_ms >= self.limit_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_supersedes_previous_ticket() {
        let guard = PollGuard::default();
        let first = guard.begin();
        assert!(first.is_current());

        let second = guard.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
    }

    #[test]
    fn test_cancel_invalidates_current_ticket() {
        let guard = PollGuard::default();
        let ticket = guard.begin();
        guard.cancel();
        assert!(!ticket.is_current());
    }

    #[test]
    fn test_clones_share_generation() {
        let guard = PollGuard::default();
        let other = guard.clone();
        let ticket = guard.begin();
        other.cancel();
        assert!(!ticket.is_current());
    }

    #[test]
    fn test_deadline() {
        let d = Deadline::new(1_000, 300_000);
        assert!(!d.expired_at(1_000));
        assert!(!d.expired_at(300_999));
        assert!(d.expired_at(301_000));
    }
}
