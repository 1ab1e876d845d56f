//! Timeouts and intervals with cancelable handles.

pub type TimerId = u64;

#[derive(Debug, Clone, Copy)]
struct Timer {
    id: TimerId,
    due_ms: u64,
    period_ms: Option<u64>,
}

/// Timer wheel advanced by [`Timers::tick`].
#[derive(Debug, Default)]
pub struct Timers {
    next_id: TimerId,
    timers: Vec<Timer>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire once, `delay_ms` from now.
    pub fn set_timeout(&mut self, delay_ms: u64, now_ms: u64) -> TimerId {
        self.insert(now_ms + delay_ms, None)
    }

    /// Fire every `period_ms`, first after one full period.
    pub fn set_interval(&mut self, period_ms: u64, now_ms: u64) -> TimerId {
        let period_ms = period_ms.max(1);
        self.insert(now_ms + period_ms, Some(period_ms))
    }

    fn insert(&mut self, due_ms: u64, period_ms: Option<u64>) -> TimerId {
        self.next_id += 1;
        let id = self.next_id;
        self.timers.push(Timer {
            id,
            due_ms,
            period_ms,
        });
        id
    }

    /// Cancel a timer. Canceling an unknown or fired timeout is a no-op.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() < before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Collect timers due at `now_ms`, ordered by due time.
    ///
    /// An interval that missed several periods fires once and is
    /// rescheduled to its next period after `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> Vec<TimerId> {
        let mut fired: Vec<(u64, TimerId)> = Vec::new();

        self.timers.retain_mut(|timer| {
            if timer.due_ms > now_ms {
                return true;
            }
            fired.push((timer.due_ms, timer.id));
            match timer.period_ms {
                Some(period) => {
                    let missed = (now_ms - timer.due_ms) / period;
                    timer.due_ms += period * (missed + 1);
                    true
                }
                None => false,
            }
        });

        fired.sort_unstable();
        fired.into_iter().map(|(_, id)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_fires_once() {
        let mut timers = Timers::new();
        let id = timers.set_timeout(100, 0);
        assert!(timers.tick(99).is_empty());
        assert_eq!(timers.tick(100), vec![id]);
        assert!(timers.tick(500).is_empty());
        assert!(!timers.is_pending(id));
    }

    #[test]
    fn test_interval_repeats_without_burst() {
        let mut timers = Timers::new();
        let id = timers.set_interval(100, 0);
        assert_eq!(timers.tick(100), vec![id]);
        // three periods missed: one fire, next due at 500
        assert_eq!(timers.tick(450), vec![id]);
        assert!(timers.tick(499).is_empty());
        assert_eq!(timers.tick(500), vec![id]);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timers = Timers::new();
        let id = timers.set_interval(10, 0);
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.tick(1000).is_empty());
    }

    #[test]
    fn test_fired_in_due_order() {
        let mut timers = Timers::new();
        let late = timers.set_timeout(50, 0);
        let early = timers.set_timeout(10, 0);
        assert_eq!(timers.tick(60), vec![early, late]);
    }
}
