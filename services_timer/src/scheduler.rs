//! Periodic timer scheduler

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Timer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(Uuid);

impl TimerId {
    /// Creates a new timer ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer:{}", self.0)
    }
}

/// Scheduler errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("Timer period must be greater than zero")]
    ZeroPeriod,

    #[error("Unknown timer: {0}")]
    UnknownTimer(TimerId),
}

/// One firing of a periodic timer
///
/// When several periods elapsed between two calls to
/// [`TimerScheduler::advance`], they are coalesced into a single tick whose
/// `periods` counts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Timer that fired
    pub id: TimerId,
    /// Due time of the latest elapsed period
    pub due_ms: u64,
    /// Number of periods this tick stands for (at least 1)
    pub periods: u64,
}

#[derive(Debug, Clone)]
struct PeriodicTimer {
    id: TimerId,
    label: String,
    period_ms: u64,
    next_due_ms: u64,
    fired: u64,
}

/// Periodic timer scheduler
///
/// Time only moves through [`advance`](Self::advance), and never backwards.
pub struct TimerScheduler {
    timers: Vec<PeriodicTimer>,
    now_ms: u64,
}

impl TimerScheduler {
    /// Creates a scheduler at time 0
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            now_ms: 0,
        }
    }

    /// Returns the scheduler's current time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedules a timer that first fires one period from now
    pub fn schedule_periodic(
        &mut self,
        label: impl Into<String>,
        period_ms: u64,
    ) -> Result<TimerId, TimerError> {
        if period_ms == 0 {
            return Err(TimerError::ZeroPeriod);
        }
        let timer = PeriodicTimer {
            id: TimerId::new(),
            label: label.into(),
            period_ms,
            next_due_ms: self.now_ms.saturating_add(period_ms),
            fired: 0,
        };
        let id = timer.id;
        tracing::debug!(target: "overlay::timer", timer = %id, label = %timer.label, period_ms, "scheduled");
        self.timers.push(timer);
        Ok(id)
    }

    /// Cancels a timer
    ///
    /// No tick for it is reported after this returns.
    pub fn cancel(&mut self, id: TimerId) -> Result<(), TimerError> {
        let pos = self
            .timers
            .iter()
            .position(|t| t.id == id)
            .ok_or(TimerError::UnknownTimer(id))?;
        let timer = self.timers.remove(pos);
        tracing::debug!(target: "overlay::timer", timer = %id, label = %timer.label, fired = timer.fired, "cancelled");
        Ok(())
    }

    /// Returns true if the timer is scheduled
    pub fn is_live(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Returns the number of scheduled timers
    pub fn live_count(&self) -> usize {
        self.timers.len()
    }

    /// Returns how many ticks a timer has produced
    pub fn fired_count(&self, id: TimerId) -> Option<u64> {
        self.timers.iter().find(|t| t.id == id).map(|t| t.fired)
    }

    /// Moves time to `now_ms` and returns the due timers, in schedule order
    ///
    /// Each due timer is reported once, however many periods elapsed.
    /// An earlier `now_ms` leaves the time unchanged and fires nothing.
    pub fn advance(&mut self, now_ms: u64) -> Vec<Tick> {
        if now_ms < self.now_ms {
            return Vec::new();
        }
        self.now_ms = now_ms;

        let mut ticks = Vec::new();
        for timer in &mut self.timers {
            if now_ms < timer.next_due_ms {
                continue;
            }
            let periods = (now_ms - timer.next_due_ms) / timer.period_ms + 1;
            let due_ms = timer.next_due_ms + (periods - 1) * timer.period_ms;
            timer.next_due_ms = due_ms.saturating_add(timer.period_ms);
            timer.fired += 1;
            ticks.push(Tick {
                id: timer.id,
                due_ms,
                periods,
            });
        }
        ticks
    }
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_id_display() {
        let id = TimerId::new();
        assert!(id.to_string().starts_with("timer:"));
        assert_ne!(id, TimerId::new());
    }

    #[test]
    fn test_zero_period_rejected() {
        let mut scheduler = TimerScheduler::new();
        assert_eq!(
            scheduler.schedule_periodic("x", 0),
            Err(TimerError::ZeroPeriod)
        );
        assert_eq!(scheduler.live_count(), 0);
    }

    #[test]
    fn test_fires_on_period_boundaries() {
        let mut scheduler = TimerScheduler::new();
        let id = scheduler.schedule_periodic("poll", 550).unwrap();

        assert!(scheduler.advance(549).is_empty());
        let ticks = scheduler.advance(550);
        assert_eq!(
            ticks,
            vec![Tick {
                id,
                due_ms: 550,
                periods: 1
            }]
        );
        assert!(scheduler.advance(1099).is_empty());
        assert_eq!(scheduler.advance(1100).len(), 1);
        assert_eq!(scheduler.fired_count(id), Some(2));
    }

    #[test]
    fn test_missed_periods_coalesce() {
        let mut scheduler = TimerScheduler::new();
        let id = scheduler.schedule_periodic("poll", 100).unwrap();

        let ticks = scheduler.advance(1050);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].periods, 10);
        assert_eq!(ticks[0].due_ms, 1000);

        assert!(scheduler.advance(1099).is_empty());
        assert_eq!(scheduler.advance(1100)[0].periods, 1);
        assert_eq!(scheduler.fired_count(id), Some(2));
    }

    #[test]
    fn test_first_due_relative_to_schedule_time() {
        let mut scheduler = TimerScheduler::new();
        scheduler.advance(1000);
        scheduler.schedule_periodic("late", 550).unwrap();
        assert!(scheduler.advance(1549).is_empty());
        assert_eq!(scheduler.advance(1550).len(), 1);
    }

    #[test]
    fn test_cancel_is_synchronous() {
        let mut scheduler = TimerScheduler::new();
        let id = scheduler.schedule_periodic("poll", 10).unwrap();
        assert!(scheduler.is_live(id));

        scheduler.cancel(id).unwrap();
        assert!(!scheduler.is_live(id));
        assert_eq!(scheduler.live_count(), 0);
        assert!(scheduler.advance(1_000).is_empty());
        assert_eq!(scheduler.cancel(id), Err(TimerError::UnknownTimer(id)));
    }

    #[test]
    fn test_time_never_moves_backwards() {
        let mut scheduler = TimerScheduler::new();
        scheduler.schedule_periodic("poll", 10).unwrap();
        scheduler.advance(100);
        assert!(scheduler.advance(50).is_empty());
        assert_eq!(scheduler.now_ms(), 100);
    }

    #[test]
    fn test_schedule_order_is_preserved() {
        let mut scheduler = TimerScheduler::new();
        let a = scheduler.schedule_periodic("a", 10).unwrap();
        let b = scheduler.schedule_periodic("b", 5).unwrap();
        let ids: Vec<TimerId> = scheduler.advance(10).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
