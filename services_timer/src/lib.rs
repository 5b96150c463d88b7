//! # Timer Service
//!
//! Deterministic periodic timers for cooperative, single-threaded hosts.
//!
//! ## Philosophy
//!
//! - **Explicit ticks**: Timers only fire when the host calls [`TimerScheduler::advance`]
//! - **No hidden threads**: The scheduler never owns callbacks; it reports which
//!   timers are due and the caller runs them
//! - **Synchronous cancel**: Once [`TimerScheduler::cancel`] returns, the timer
//!   never fires again
//! - **Injectable time**: Hosts read time through the [`Clock`] trait, so tests
//!   drive it with [`ManualClock`]
//!
//! ## Example
//!
//! ```
//! use services_timer::{TimerScheduler, Clock, ManualClock};
//!
//! let clock = ManualClock::new();
//! let mut scheduler = TimerScheduler::new();
//! let id = scheduler.schedule_periodic("poll", 550).unwrap();
//!
//! clock.advance(1200);
//! let ticks = scheduler.advance(clock.now_ms());
//! assert_eq!(ticks.len(), 1);
//! assert_eq!(ticks[0].id, id);
//! assert_eq!(ticks[0].periods, 2);
//! ```

pub mod clock;
pub mod scheduler;

pub use clock::{Clock, ManualClock};
pub use scheduler::{Tick, TimerError, TimerId, TimerScheduler};
