//! Timer Queue
//!
//! `setTimeout`-style deferred work against a virtual millisecond clock.
//! The host advances the clock; nothing here reads wall time.

use crate::audio::Tone;

/// Deferred work item
#[derive(Debug, Clone, PartialEq)]
pub enum TimerTask {
    /// Empty the live region if it still shows announcement `generation`
    ClearAnnouncement { generation: u64 },
    /// Staggered step of an alert sequence
    PlayTone(Tone),
    /// Look for missing control markup again
    RetryBind { attempt: u32 },
}

#[derive(Debug, Clone)]
struct Timer {
    id: u32,
    due_ms: u64,
    task: TimerTask,
}

/// Timer manager
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
    now_ms: u64,
    next_id: u32,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `task` to run `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u64, task: TimerTask) -> u32 {
        self.next_id += 1;
        let id = self.next_id;
        self.timers.push(Timer { id, due_ms: self.now_ms + delay_ms, task });
        id
    }

    pub fn cancel(&mut self, id: u32) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        before != self.timers.len()
    }

    /// Move the clock to `now_ms` and return every task that became due,
    /// ordered by due time then scheduling order. The clock never runs
    /// backwards.
    pub fn advance_to(&mut self, now_ms: u64) -> Vec<TimerTask> {
        self.now_ms = self.now_ms.max(now_ms);
        let now = self.now_ms;

        let mut ready: Vec<Timer> = Vec::new();
        self.timers.retain(|t| {
            if t.due_ms <= now {
                ready.push(t.clone());
                false
            } else {
                true
            }
        });
        ready.sort_by_key(|t| (t.due_ms, t.id));
        ready.into_iter().map(|t| t.task).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Time until the next timer fires
    pub fn time_until_next(&self) -> Option<u64> {
        self.timers
            .iter()
            .map(|t| t.due_ms.saturating_sub(self.now_ms))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_order() {
        let mut q = TimerQueue::new();
        q.schedule(200, TimerTask::RetryBind { attempt: 2 });
        q.schedule(100, TimerTask::RetryBind { attempt: 1 });
        q.schedule(100, TimerTask::ClearAnnouncement { generation: 7 });

        assert!(q.advance_to(99).is_empty());
        assert_eq!(
            q.advance_to(150),
            vec![TimerTask::RetryBind { attempt: 1 }, TimerTask::ClearAnnouncement { generation: 7 }]
        );
        assert_eq!(q.time_until_next(), Some(50));
        assert_eq!(q.advance_to(1000), vec![TimerTask::RetryBind { attempt: 2 }]);
        assert!(!q.has_pending());
    }

    #[test]
    fn test_cancel() {
        let mut q = TimerQueue::new();
        let id = q.schedule(10, TimerTask::RetryBind { attempt: 1 });
        assert!(q.cancel(id));
        assert!(q.advance_to(100).is_empty());
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut q = TimerQueue::new();
        q.advance_to(500);
        q.advance_to(100);
        assert_eq!(q.now_ms(), 500);
        q.schedule(10, TimerTask::RetryBind { attempt: 1 });
        assert_eq!(q.time_until_next(), Some(10));
    }
}
