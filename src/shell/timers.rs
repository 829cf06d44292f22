// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Timers<T> {
    queue: Vec<(Instant, T)>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self { queue: Vec::new() }
    }
}

impl<T> Timers<T> {
    pub fn schedule_in(&mut self, now: Instant, delay: Duration, action: T) {
        self.queue.push((now + delay, action));
    }

    pub fn drain_due(&mut self, now: Instant) -> Vec<T> {
        let mut due: Vec<(Instant, T)> = Vec::new();
        let mut i = 0;
        while i < self.queue.len() {
            if self.queue[i].0 <= now {
                due.push(self.queue.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|(at, _)| *at);
        due.into_iter().map(|(_, action)| action).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_due_actions_fire_in_order() {
        let t0 = Instant::now();
        let mut timers = Timers::default();
        timers.schedule_in(t0, Duration::from_millis(300), "late");
        timers.schedule_in(t0, Duration::from_millis(100), "early");
        timers.schedule_in(t0, Duration::from_secs(5), "never");

        assert!(timers.drain_due(t0).is_empty());
        assert_eq!(timers.drain_due(t0 + Duration::from_secs(1)), vec!["early", "late"]);
        assert_eq!(timers.len(), 1);
    }
}
