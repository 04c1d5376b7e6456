//! Cooperative timer scheduler
//!
//! A virtual millisecond clock with cancellable one-shot and repeating timers.
//! Nothing fires on its own: the owner pulls due timers one at a time with
//! [`Scheduler::pop_due`], handles each to completion, then pulls the next.

use serde::{Deserialize, Serialize};

/// Cancellation handle for a registered timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

/// Lower values fire first when several timers are due at the same instant
pub trait TimerPriority {
    fn priority(&self) -> u8;
}

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    due_ms: u64,
    /// Repeat period; `None` for one-shot timers
    period_ms: Option<u64>,
    payload: T,
}

/// Timer wheel driven by an external clock
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: u64,
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone + TimerPriority> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Fire `payload` once, `delay_ms` from now
    pub fn schedule_once(&mut self, delay_ms: u64, payload: T) -> TimerId {
        self.insert(delay_ms, None, payload)
    }

    /// Fire `payload` every `period_ms`, first time one period from now
    pub fn schedule_repeating(&mut self, period_ms: u64, payload: T) -> TimerId {
        let period_ms = period_ms.max(1);
        self.insert(period_ms, Some(period_ms), payload)
    }

    fn insert(&mut self, delay_ms: u64, period_ms: Option<u64>, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due_ms: self.now_ms + delay_ms,
            period_ms,
            payload,
        });
        id
    }

    /// Returns false if the timer already fired (one-shot) or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Cancel every timer whose payload matches
    pub fn cancel_where<F: Fn(&T) -> bool>(&mut self, pred: F) {
        self.entries.retain(|e| !pred(&e.payload));
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Next timer due at or before `until_ms`
    ///
    /// Order: due time, then payload priority, then registration order. The
    /// clock moves to the timer's due time; repeating timers are re-armed
    /// before returning so the handler may cancel them.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, T)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= until_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.payload.priority(), e.id))
            .map(|(i, _)| i)?;

        let due_ms = self.entries[index].due_ms;
        self.now_ms = self.now_ms.max(due_ms);

        let fired = match self.entries[index].period_ms {
            Some(period) => {
                let entry = &mut self.entries[index];
                entry.due_ms += period;
                (entry.id, entry.payload.clone())
            }
            None => {
                let entry = self.entries.remove(index);
                (entry.id, entry.payload)
            }
        };
        Some(fired)
    }

    /// Move the clock to `until_ms` once all due timers were handled
    pub fn finish(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Job {
        Clock,
        Other(u32),
    }

    impl TimerPriority for Job {
        fn priority(&self) -> u8 {
            match self {
                Job::Clock => 0,
                Job::Other(_) => 1,
            }
        }
    }

    fn drain(s: &mut Scheduler<Job>, until: u64) -> Vec<(u64, Job)> {
        let mut fired = Vec::new();
        while let Some((_, job)) = s.pop_due(until) {
            fired.push((s.now_ms(), job));
        }
        s.finish(until);
        fired
    }

    #[test]
    fn test_once_fires_once() {
        let mut s = Scheduler::new();
        s.schedule_once(100, Job::Other(1));
        assert!(drain(&mut s, 99).is_empty());
        assert_eq!(drain(&mut s, 100), vec![(100, Job::Other(1))]);
        assert!(drain(&mut s, 1000).is_empty());
        assert!(s.is_empty());
    }

    #[test]
    fn test_repeating_catches_up_in_order() {
        let mut s = Scheduler::new();
        s.schedule_repeating(1000, Job::Clock);
        s.schedule_once(1500, Job::Other(7));
        let fired = drain(&mut s, 3000);
        assert_eq!(
            fired,
            vec![
                (1000, Job::Clock),
                (1500, Job::Other(7)),
                (2000, Job::Clock),
                (3000, Job::Clock)
            ]
        );
        assert_eq!(s.now_ms(), 3000);
    }

    #[test]
    fn test_priority_breaks_ties() {
        let mut s = Scheduler::new();
        s.schedule_once(1000, Job::Other(1));
        s.schedule_repeating(1000, Job::Clock);
        let fired = drain(&mut s, 1000);
        assert_eq!(fired[0].1, Job::Clock);
        assert_eq!(fired[1].1, Job::Other(1));
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::new();
        let a = s.schedule_repeating(10, Job::Other(1));
        let b = s.schedule_once(10, Job::Other(2));
        assert!(s.is_active(a));
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        assert_eq!(drain(&mut s, 50), vec![(10, Job::Other(2))]);
        assert!(!s.is_active(b));
    }

    #[test]
    fn test_cancel_from_handler_stops_repeats() {
        let mut s = Scheduler::new();
        let id = s.schedule_repeating(100, Job::Clock);
        let mut count = 0;
        while let Some((fired, _)) = s.pop_due(1000) {
            count += 1;
            if count == 3 {
                s.cancel(fired);
            }
        }
        assert_eq!(count, 3);
        assert!(!s.is_active(id));
    }

    #[test]
    fn test_delays_are_relative_to_current_time() {
        let mut s = Scheduler::new();
        s.finish(500);
        s.schedule_once(250, Job::Other(3));
        assert_eq!(drain(&mut s, 750), vec![(750, Job::Other(3))]);
    }
}
