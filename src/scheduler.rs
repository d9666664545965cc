//! Fixed-period task multiplexer using an accumulator pattern.
//!
//! The host calls [`Scheduler::advance`] with the current wall-clock time as
//! often as it likes (every animation frame, every `setInterval` callback,
//! after a tab wakes up). Each registered task accumulates elapsed time and
//! becomes due once its period has been covered. A task is reported at most
//! once per `advance` call; long gaps coalesce instead of replaying every
//! missed period, because every timer in the engine recomputes from stored
//! timestamps anyway.

use crate::time::Millis;

struct Task<K> {
    key: K,
    period: Millis,
    /// Accumulated milliseconds not yet consumed by a firing.
    accumulator: Millis,
}

pub struct Scheduler<K> {
    tasks: Vec<Task<K>>,
    /// Timestamp of the last `advance`, `None` before the first one.
    last_timestamp: Option<Millis>,
}

impl<K: Copy + PartialEq> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + PartialEq> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            last_timestamp: None,
        }
    }

    /// Register a periodic task. Registering a key that is already present
    /// changes nothing and returns `false`, so a repeated "enable" never
    /// produces a second timer.
    pub fn register(&mut self, key: K, period: Millis) -> bool {
        if self.is_registered(key) {
            return false;
        }
        self.tasks.push(Task {
            key,
            period: period.max(1),
            accumulator: 0,
        });
        true
    }

    /// Remove a task. Returns `false` when it was not registered.
    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.key != key);
        self.tasks.len() != before
    }

    pub fn is_registered(&self, key: K) -> bool {
        self.tasks.iter().any(|t| t.key == key)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Feed the current wall-clock time and collect the tasks that are due,
    /// in registration order.
    pub fn advance(&mut self, now_ms: Millis) -> Vec<K> {
        let delta = match self.last_timestamp {
            // Clock stepped backwards: treat as no time passing.
            Some(prev) => now_ms.saturating_sub(prev),
            None => 0,
        };
        self.last_timestamp = Some(now_ms.max(self.last_timestamp.unwrap_or(0)));

        let mut due = Vec::new();
        for task in &mut self.tasks {
            task.accumulator = task.accumulator.saturating_add(delta);
            if task.accumulator >= task.period {
                task.accumulator %= task.period;
                due.push(task.key);
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Job {
        Fast,
        Slow,
    }

    #[test]
    fn first_advance_fires_nothing() {
        let mut s = Scheduler::new();
        s.register(Job::Fast, 1_000);
        assert!(s.advance(50_000).is_empty());
    }

    #[test]
    fn fires_once_period_elapses() {
        let mut s = Scheduler::new();
        s.register(Job::Fast, 1_000);
        s.advance(0);
        assert!(s.advance(999).is_empty());
        assert_eq!(s.advance(1_000), vec![Job::Fast]);
    }

    #[test]
    fn remainder_carried_over() {
        let mut s = Scheduler::new();
        s.register(Job::Fast, 1_000);
        s.advance(0);
        assert_eq!(s.advance(1_500), vec![Job::Fast]); // 500ms remainder
        assert_eq!(s.advance(2_000), vec![Job::Fast]); // 500 + 500
    }

    #[test]
    fn long_gap_coalesces_to_one_firing() {
        let mut s = Scheduler::new();
        s.register(Job::Fast, 1_000);
        s.advance(0);
        // Tab was suspended for a minute.
        assert_eq!(s.advance(60_000), vec![Job::Fast]);
        assert!(s.advance(60_100).is_empty());
    }

    #[test]
    fn tasks_multiplex_on_one_clock() {
        let mut s = Scheduler::new();
        s.register(Job::Fast, 1_000);
        s.register(Job::Slow, 30_000);
        s.advance(0);
        let mut slow_count = 0;
        let mut fast_count = 0;
        for sec in 1..=60u64 {
            for job in s.advance(sec * 1_000) {
                match job {
                    Job::Fast => fast_count += 1,
                    Job::Slow => slow_count += 1,
                }
            }
        }
        assert_eq!(fast_count, 60);
        assert_eq!(slow_count, 2);
    }

    #[test]
    fn register_is_idempotent() {
        let mut s = Scheduler::new();
        assert!(s.register(Job::Slow, 30_000));
        assert!(!s.register(Job::Slow, 30_000));
        assert_eq!(s.len(), 1);
        s.advance(0);
        assert_eq!(s.advance(30_000), vec![Job::Slow]);
    }

    #[test]
    fn cancel_stops_firing() {
        let mut s = Scheduler::new();
        s.register(Job::Fast, 1_000);
        s.advance(0);
        assert!(s.cancel(Job::Fast));
        assert!(!s.cancel(Job::Fast));
        assert!(s.advance(5_000).is_empty());
        assert!(s.is_empty());
    }

    #[test]
    fn clock_going_backwards_is_ignored() {
        let mut s = Scheduler::new();
        s.register(Job::Fast, 1_000);
        s.advance(10_000);
        assert!(s.advance(5_000).is_empty());
        // Time is measured from the latest timestamp seen, not the rewound one.
        assert!(s.advance(10_500).is_empty());
        assert_eq!(s.advance(11_000), vec![Job::Fast]);
    }
}
