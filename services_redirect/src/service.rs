//! Composed redirect service
//!
//! Wires the toggle, the monitor, and the manual command to a timer
//! scheduler and a notification channel, behind two string commands.

use crate::command::CommandId;
use crate::host::{EditorHost, HostError};
use crate::manual::ManualRedirect;
use crate::monitor::{RedirectMonitor, RedirectOutcome};
use crate::toggle::{ToggleController, ToggleState};
use overlay_path::PathError;
use services_notification::NotificationHandle;
use services_timer::{TimerError, TimerScheduler};
use thiserror::Error;

/// Message shown once the service is up
pub const READY_MESSAGE: &str = "overlay ready";

/// Redirect service errors
#[derive(Debug, Error)]
pub enum RedirectError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),
}

/// Redirect service
pub struct RedirectService {
    toggle: ToggleController,
    manual: ManualRedirect,
    scheduler: TimerScheduler,
    notifications: NotificationHandle,
}

impl RedirectService {
    /// Creates the service, registers its status items, and announces itself
    pub fn new(notifications: NotificationHandle) -> Self {
        let toggle = ToggleController::new(notifications.clone());
        let manual = ManualRedirect::new(notifications.clone());
        notifications.info(READY_MESSAGE);
        tracing::info!(target: "overlay::redirect", "redirect service ready");
        Self {
            toggle,
            manual,
            scheduler: TimerScheduler::new(),
            notifications,
        }
    }

    /// Returns the toggle state
    pub fn state(&self) -> ToggleState {
        self.toggle.state()
    }

    /// Returns the number of live pollers (0 or 1)
    pub fn live_pollers(&self) -> usize {
        self.scheduler.live_count()
    }

    /// Returns the service's logical time
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Returns the notification channel
    pub fn notifications(&self) -> &NotificationHandle {
        &self.notifications
    }

    /// Runs a command by its registered id
    pub fn execute(
        &mut self,
        command: &str,
        host: &mut dyn EditorHost,
    ) -> Result<Option<RedirectOutcome>, RedirectError> {
        let id: CommandId = command
            .parse()
            .map_err(RedirectError::UnknownCommand)?;
        self.execute_command(id, host)
    }

    /// Runs a command
    ///
    /// Returns the redirect outcome for `redirectActive`, nothing for the
    /// toggle.
    pub fn execute_command(
        &mut self,
        command: CommandId,
        host: &mut dyn EditorHost,
    ) -> Result<Option<RedirectOutcome>, RedirectError> {
        tracing::debug!(target: "overlay::redirect", %command, "execute");
        match command {
            CommandId::ToggleRedirect => {
                self.toggle.switch(&mut self.scheduler)?;
                Ok(None)
            }
            CommandId::RedirectActive => self.manual.run(host).map(Some),
        }
    }

    /// Moves logical time to `now_ms`
    ///
    /// Fires the poller if it is due (missed periods collapse into one
    /// tick) and expires transient labels. A failed tick is logged and the
    /// poller keeps running.
    pub fn advance(&mut self, now_ms: u64, host: &mut dyn EditorHost) -> Vec<RedirectOutcome> {
        self.notifications.set_time(now_ms);
        let poller = self.toggle.state().poller();

        let mut outcomes = Vec::new();
        for tick in self.scheduler.advance(now_ms) {
            if Some(tick.id) != poller {
                continue;
            }
            if tick.periods > 1 {
                tracing::debug!(target: "overlay::redirect", periods = tick.periods, "coalesced tick");
            }
            match RedirectMonitor::tick(host) {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    tracing::warn!(target: "overlay::redirect", error = %err, "redirect tick failed");
                }
            }
        }
        outcomes
    }

    /// Stops the poller and returns the toggle to `Off`
    pub fn shutdown(&mut self) -> Result<(), RedirectError> {
        self.toggle.disable(&mut self.scheduler)?;
        tracing::info!(target: "overlay::redirect", "redirect service shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::SkipReason;
    use crate::test_utils::FakeHost;
    use crate::toggle::{TOGGLE_ITEM, TOGGLE_LABEL_ON};
    use overlay_types::{DocumentUri, POLL_INTERVAL_MS};

    #[test]
    fn test_ready_notification() {
        let notifications = NotificationHandle::new();
        RedirectService::new(notifications.clone());
        let service = notifications.service();
        assert_eq!(service.get_recent_notifications(1)[0].message, READY_MESSAGE);
    }

    #[test]
    fn test_unknown_command() {
        let mut service = RedirectService::new(NotificationHandle::new());
        let mut host = FakeHost::default();
        assert!(matches!(
            service.execute("autoFormat.switchEnable", &mut host),
            Err(RedirectError::UnknownCommand(name)) if name == "autoFormat.switchEnable"
        ));
    }

    #[test]
    fn test_toggle_then_tick_redirects() {
        let notifications = NotificationHandle::new();
        let mut service = RedirectService::new(notifications.clone());
        let mut host = FakeHost::with_active(DocumentUri::file("/tmp/a.js"));

        assert_eq!(service.execute("toggleRedirect", &mut host).unwrap(), None);
        assert_eq!(notifications.label(TOGGLE_ITEM).as_deref(), Some(TOGGLE_LABEL_ON));
        assert!(service.advance(POLL_INTERVAL_MS - 1, &mut host).is_empty());

        let outcomes = service.advance(POLL_INTERVAL_MS, &mut host);
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_redirected());
    }

    #[test]
    fn test_no_ticks_while_off() {
        let mut service = RedirectService::new(NotificationHandle::new());
        let mut host = FakeHost::with_active(DocumentUri::file("/tmp/a.js"));
        assert!(service.advance(10 * POLL_INTERVAL_MS, &mut host).is_empty());
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_failed_tick_keeps_poller() {
        let mut service = RedirectService::new(NotificationHandle::new());
        let mut host = FakeHost::with_active(DocumentUri::file("/tmp/a.js"));
        host.fail_open = true;
        service.execute("toggleRedirect", &mut host).unwrap();

        assert!(service.advance(POLL_INTERVAL_MS, &mut host).is_empty());
        assert_eq!(service.live_pollers(), 1);
        assert!(service.state().is_enabled());

        let outcomes = service.advance(2 * POLL_INTERVAL_MS, &mut host);
        assert_eq!(
            outcomes,
            vec![RedirectOutcome::Skipped(SkipReason::NoActiveDocument)]
        );
    }

    #[test]
    fn test_shutdown() {
        let mut service = RedirectService::new(NotificationHandle::new());
        let mut host = FakeHost::default();
        service.execute("toggleRedirect", &mut host).unwrap();
        service.shutdown().unwrap();
        assert_eq!(service.state(), ToggleState::Off);
        assert_eq!(service.live_pollers(), 0);
        service.shutdown().unwrap();
    }
}
