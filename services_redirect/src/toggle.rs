//! Toggle controller
//!
//! Owns whether automatic redirection is on, the poller that drives it,
//! and the status label that shows it.

use crate::service::RedirectError;
use overlay_types::POLL_INTERVAL_MS;
use services_notification::{NotificationHandle, StatusItem};
use services_timer::{TimerId, TimerScheduler};

/// Status item showing the toggle state
pub const TOGGLE_ITEM: &str = "redirect.toggle";

/// Toggle label while off
pub const TOGGLE_LABEL_OFF: &str = "redirect: off";

/// Toggle label while on
pub const TOGGLE_LABEL_ON: &str = "redirect: on";

/// Label of the poller timer
const POLLER_LABEL: &str = "redirect-monitor";

/// Toggle state
///
/// The poll handle exists exactly while the toggle is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    Off,
    On { poller: TimerId },
}

impl ToggleState {
    /// Returns true if automatic redirection is on
    pub fn is_enabled(&self) -> bool {
        matches!(self, ToggleState::On { .. })
    }

    /// Returns the live poll handle
    pub fn poller(&self) -> Option<TimerId> {
        match self {
            ToggleState::On { poller } => Some(*poller),
            ToggleState::Off => None,
        }
    }
}

/// Toggle controller
pub struct ToggleController {
    state: ToggleState,
    notifications: NotificationHandle,
}

impl ToggleController {
    /// Creates a controller in the `Off` state and shows its label
    pub fn new(notifications: NotificationHandle) -> Self {
        notifications.register_item(StatusItem::new(TOGGLE_ITEM, TOGGLE_LABEL_OFF));
        Self {
            state: ToggleState::Off,
            notifications,
        }
    }

    /// Returns the current state
    pub fn state(&self) -> ToggleState {
        self.state
    }

    /// Flips the state and returns whether it is now on
    ///
    /// Turning on schedules the poller; turning off cancels it before
    /// returning, so no tick fires afterwards.
    pub fn switch(&mut self, scheduler: &mut TimerScheduler) -> Result<bool, RedirectError> {
        match self.state {
            ToggleState::Off => {
                let poller = scheduler.schedule_periodic(POLLER_LABEL, POLL_INTERVAL_MS)?;
                self.state = ToggleState::On { poller };
                self.notifications.set_label(TOGGLE_ITEM, TOGGLE_LABEL_ON);
            }
            ToggleState::On { poller } => {
                self.state = ToggleState::Off;
                self.notifications.set_label(TOGGLE_ITEM, TOGGLE_LABEL_OFF);
                scheduler.cancel(poller)?;
            }
        }
        let enabled = self.state.is_enabled();
        tracing::info!(target: "overlay::redirect", enabled, "toggle switched");
        Ok(enabled)
    }

    /// Turns the toggle off if it is on
    pub fn disable(&mut self, scheduler: &mut TimerScheduler) -> Result<(), RedirectError> {
        if self.state.is_enabled() {
            self.switch(scheduler)?;
        }
        Ok(())
    }
}
