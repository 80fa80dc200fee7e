//! Single-threaded delayed-task queue.
//!
//! The owner supplies `now` on every call, so the queue never reads a clock
//! and behaves the same under a simulated one.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

/// Handle for cancelling a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// Tasks keyed by deadline; ties run in scheduling order.
#[derive(Debug)]
pub struct Scheduler<T> {
    next_seq: u64,
    queue: BTreeMap<(Instant, u64), T>,
    deadlines: HashMap<u64, Instant>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_seq: 0,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn schedule_at(&mut self, deadline: Instant, task: T) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((deadline, seq), task);
        self.deadlines.insert(seq, deadline);
        TaskHandle(seq)
    }

    pub fn schedule_after(&mut self, now: Instant, delay: Duration, task: T) -> TaskHandle {
        self.schedule_at(now + delay, task)
    }

    /// Removes a pending task. Returns `None` if it already ran or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> Option<T> {
        let deadline = self.deadlines.remove(&handle.0)?;
        self.queue.remove(&(deadline, handle.0))
    }

    #[must_use]
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.deadlines.contains_key(&handle.0)
    }

    /// Removes and returns every task whose deadline is at or before `now`.
    pub fn drain_due(&mut self, now: Instant) -> Vec<T> {
        let mut due = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let ((_, seq), task) = entry.remove_entry();
            self.deadlines.remove(&seq);
            due.push(task);
        }
        due
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Drops every pending task.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.deadlines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_deadline_order() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(start, Duration::from_millis(30), "c");
        scheduler.schedule_after(start, Duration::from_millis(10), "a");
        scheduler.schedule_after(start, Duration::from_millis(20), "b");

        assert_eq!(scheduler.next_deadline(), Some(start + Duration::from_millis(10)));
        assert!(scheduler.drain_due(start).is_empty());
        assert_eq!(
            scheduler.drain_due(start + Duration::from_millis(20)),
            vec!["a", "b"]
        );
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn ties_keep_scheduling_order() {
        let at = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule_at(at, 1);
        scheduler.schedule_at(at, 2);
        scheduler.schedule_at(at, 3);
        assert_eq!(scheduler.drain_due(at), vec![1, 2, 3]);
    }

    #[test]
    fn cancel_prevents_run() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_after(start, Duration::from_secs(1), "request");
        assert!(scheduler.is_pending(handle));
        assert_eq!(scheduler.cancel(handle), Some("request"));
        assert!(!scheduler.is_pending(handle));
        assert_eq!(scheduler.cancel(handle), None);
        assert!(scheduler.drain_due(start + Duration::from_secs(2)).is_empty());
    }

    #[test]
    fn cancel_after_run_is_none() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_at(start, ());
        assert_eq!(scheduler.drain_due(start).len(), 1);
        assert_eq!(scheduler.cancel(handle), None);
    }

    #[test]
    fn clear_drops_everything() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_at(start, ());
        scheduler.clear();
        assert!(scheduler.is_empty());
        assert!(!scheduler.is_pending(handle));
        assert_eq!(scheduler.next_deadline(), None);
    }
}
