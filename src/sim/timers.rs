//! Deferred one-shot tasks
//!
//! Timed effects (no-clip expiry, the end-of-session delay) are queued as
//! (fire-time, action) pairs against the simulation clock and drained each
//! physics tick. Scheduling an action that is already pending replaces the
//! pending entry, so re-arming resets the window instead of stacking.

use serde::{Deserialize, Serialize};

/// Actions a timer can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    /// No-clip power-up expired
    NoClipExpire,
    /// Terminal-phase delay elapsed; hand control back to the shell
    EndOfSession,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Entry {
    fire_at_ms: u64,
    action: TimerAction,
}

/// Queue of pending one-shot timers, ordered by fire time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerQueue {
    entries: Vec<Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire `delay_ms` after `now_ms`. A pending
    /// entry for the same action is dropped first (stop-then-start).
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, action: TimerAction) {
        self.cancel(action);
        let entry = Entry {
            fire_at_ms: now_ms + delay_ms,
            action,
        };
        let at = self
            .entries
            .partition_point(|e| e.fire_at_ms <= entry.fire_at_ms);
        self.entries.insert(at, entry);
    }

    /// Remove a pending entry for `action`, if any.
    pub fn cancel(&mut self, action: TimerAction) {
        self.entries.retain(|e| e.action != action);
    }

    pub fn is_pending(&self, action: TimerAction) -> bool {
        self.entries.iter().any(|e| e.action == action)
    }

    /// Pop every entry due at or before `now_ms`, in fire order.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<TimerAction> {
        let due = self.entries.partition_point(|e| e.fire_at_ms <= now_ms);
        self.entries.drain(..due).map(|e| e.action).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_order_once_due() {
        let mut q = TimerQueue::new();
        q.schedule(0, 500, TimerAction::EndOfSession);
        q.schedule(0, 100, TimerAction::NoClipExpire);

        assert!(q.drain_due(50).is_empty());
        assert_eq!(q.drain_due(200), vec![TimerAction::NoClipExpire]);
        assert_eq!(q.drain_due(600), vec![TimerAction::EndOfSession]);
        assert!(q.drain_due(10_000).is_empty());
    }

    #[test]
    fn test_reschedule_replaces_pending() {
        let mut q = TimerQueue::new();
        q.schedule(0, 100, TimerAction::NoClipExpire);
        // Re-arm before the first fires: the window resets, nothing stacks
        q.schedule(80, 100, TimerAction::NoClipExpire);

        assert!(q.drain_due(120).is_empty());
        assert_eq!(q.drain_due(180), vec![TimerAction::NoClipExpire]);
    }

    #[test]
    fn test_cancel() {
        let mut q = TimerQueue::new();
        q.schedule(0, 100, TimerAction::NoClipExpire);
        assert!(q.is_pending(TimerAction::NoClipExpire));
        q.cancel(TimerAction::NoClipExpire);
        assert!(!q.is_pending(TimerAction::NoClipExpire));
        assert!(q.drain_due(1000).is_empty());
    }
}
