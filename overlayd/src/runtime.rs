//! # Host Runtime
//!
//! Wires the engine, the provider, the redirect service, and the simulated
//! editor together for the daemon's commands.

use crate::script::{ScriptError, SessionScript, Step};
use lint_engine::StyleEngine;
use overlay_path::{PathError, PathTranslator};
use overlay_types::{
    FixReport, RuleConfig, ValidationReport, OVERLAY_AUTHORITY, OVERLAY_SCHEME, POLL_INTERVAL_MS,
    TRACKED_EXTENSIONS, TRANSIENT_LABEL_MS,
};
use serde::Serialize;
use services_notification::{NotificationHandle, NotificationLevel};
use services_overlay_fs::{OverlayFileSystem, ProviderError, VirtualFileProvider};
use services_redirect::{
    CommandId, EditorHost, HostError, RedirectError, RedirectService, MANUAL_ITEM, TOGGLE_ITEM,
};
use services_timer::{Clock, ManualClock};
use sim_editor::SimEditor;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

/// Host runtime error types
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Redirect error: {0}")]
    Redirect(#[from] RedirectError),

    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The fixed configuration, as printed by `overlayd config`
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub rules: RuleConfig,
    pub tracked_extensions: Vec<&'static str>,
    pub poll_interval_ms: u64,
    pub transient_label_ms: u64,
    pub overlay_scheme: &'static str,
    pub overlay_authority: &'static str,
    pub commands: Vec<&'static str>,
}

impl EffectiveConfig {
    /// Collects the compile-time configuration
    pub fn current() -> Self {
        Self {
            rules: RuleConfig::FIXED,
            tracked_extensions: TRACKED_EXTENSIONS.to_vec(),
            poll_interval_ms: POLL_INTERVAL_MS,
            transient_label_ms: TRANSIENT_LABEL_MS,
            overlay_scheme: OVERLAY_SCHEME,
            overlay_authority: OVERLAY_AUTHORITY,
            commands: CommandId::ALL.iter().map(|c| c.as_str()).collect(),
        }
    }

    /// Renders as pretty JSON
    pub fn to_json(&self) -> Result<String, RuntimeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runtime for the one-shot commands
pub struct OverlayRuntime {
    provider: OverlayFileSystem<StyleEngine>,
    notifications: NotificationHandle,
}

impl OverlayRuntime {
    /// Creates a runtime with the built-in engine
    pub fn new() -> Self {
        let notifications = NotificationHandle::new();
        Self {
            provider: OverlayFileSystem::new(StyleEngine::new(), notifications.clone()),
            notifications,
        }
    }

    /// Returns the notification channel
    pub fn notifications(&self) -> &NotificationHandle {
        &self.notifications
    }

    /// Runs fix-on-read for `path`
    pub fn read(&self, path: &Path) -> Result<FixReport, RuntimeError> {
        let identity = PathTranslator::to_overlay(&absolute(path)?)?;
        Ok(self.provider.read_report(&identity)?)
    }

    /// Runs verify-on-write of `content` to `path`
    pub fn write(&self, path: &Path, content: &str) -> Result<(), RuntimeError> {
        let identity = PathTranslator::to_overlay(&absolute(path)?)?;
        Ok(self.provider.write(&identity, content)?)
    }

    /// Verifies `path` in place
    pub fn check(&self, path: &Path) -> Result<ValidationReport, RuntimeError> {
        let identity = PathTranslator::to_overlay(&absolute(path)?)?;
        Ok(self.provider.check(&identity)?)
    }

    /// Returns the most recent error notification's message
    pub fn last_error(&self) -> Option<String> {
        self.notifications
            .service()
            .get_recent_notifications(usize::MAX)
            .into_iter()
            .find(|n| n.level == NotificationLevel::Error)
            .map(|n| n.message.clone())
    }
}

impl Default for OverlayRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of one tab at the end of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabSummary {
    pub uri: String,
    pub active: bool,
    pub preview: bool,
    pub dirty: bool,
    pub text: String,
}

/// Outcome of a scripted session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    /// One line per executed step
    pub transcript: Vec<String>,
    pub tabs: Vec<TabSummary>,
    /// Status item id and the label it shows
    pub labels: Vec<(String, String)>,
    /// Notification level and message, oldest first
    pub notifications: Vec<(String, String)>,
    /// Logical time when the session ended
    pub elapsed_ms: u64,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== steps ==")?;
        for line in &self.transcript {
            writeln!(f, "{}", line)?;
        }
        writeln!(f, "== tabs ==")?;
        for tab in &self.tabs {
            writeln!(
                f,
                "{} {}{}{}",
                if tab.active { "*" } else { " " },
                tab.uri,
                if tab.preview { " (preview)" } else { "" },
                if tab.dirty { " (dirty)" } else { "" }
            )?;
        }
        writeln!(f, "== status ==")?;
        for (item, label) in &self.labels {
            writeln!(f, "{}: {}", item, label)?;
        }
        writeln!(f, "== notifications ==")?;
        for (level, message) in &self.notifications {
            writeln!(f, "[{}] {}", level, message.trim_end())?;
        }
        write!(f, "== elapsed {} ms ==", self.elapsed_ms)
    }
}

/// Runs scripted sessions against the simulated editor
pub struct SessionRunner {
    editor: SimEditor,
    redirect: RedirectService,
    notifications: NotificationHandle,
    clock: ManualClock,
    base_dir: PathBuf,
    transcript: Vec<String>,
}

impl SessionRunner {
    /// Creates a runner resolving relative paths against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let notifications = NotificationHandle::new();
        let provider: Rc<dyn VirtualFileProvider> = Rc::new(OverlayFileSystem::new(
            StyleEngine::new(),
            notifications.clone(),
        ));
        Self {
            editor: SimEditor::new(provider),
            redirect: RedirectService::new(notifications.clone()),
            notifications,
            clock: ManualClock::new(),
            base_dir: base_dir.into(),
            transcript: Vec::new(),
        }
    }

    /// Returns the editor
    pub fn editor(&self) -> &SimEditor {
        &self.editor
    }

    /// Runs every step, then shuts the redirect service down
    ///
    /// Failed editor operations are recorded and the session continues.
    pub fn run(mut self, script: &SessionScript) -> Result<SessionReport, RuntimeError> {
        for step in script.steps() {
            let line = match self.step(step) {
                Ok(line) => line,
                Err(err) => format!("{:?}: failed: {}", step, err),
            };
            tracing::info!(target: "overlayd::session", at_ms = self.clock.now_ms(), "{}", line);
            self.transcript.push(line);
        }
        self.redirect.shutdown()?;
        Ok(self.report())
    }

    fn step(&mut self, step: &Step) -> Result<String, RuntimeError> {
        match step {
            Step::Open(path) => {
                let path = self.resolve(path)?;
                self.editor.open_file(&path)?;
                Ok(format!("open {}", path))
            }
            Step::Toggle => {
                self.redirect
                    .execute_command(CommandId::ToggleRedirect, &mut self.editor)?;
                Ok(format!("toggle -> {}", self.label(TOGGLE_ITEM)))
            }
            Step::Redirect => {
                let outcome = self
                    .redirect
                    .execute_command(CommandId::RedirectActive, &mut self.editor)?;
                Ok(format!("redirect -> {:?}", outcome))
            }
            Step::Wait(ms) => {
                self.clock.advance(*ms);
                let outcomes = self.redirect.advance(self.clock.now_ms(), &mut self.editor);
                let redirected = outcomes.iter().filter(|o| o.is_redirected()).count();
                Ok(format!("wait {} ms ({} redirect(s))", ms, redirected))
            }
            Step::Edit(text) => {
                self.editor.edit_active(text.clone())?;
                Ok(format!("edit ({} bytes)", text.len()))
            }
            Step::Save => {
                self.editor.save_active()?;
                Ok("save".to_string())
            }
            Step::Close => {
                self.editor.close_active()?;
                Ok("close".to_string())
            }
            Step::Status => Ok(format!(
                "status {} | {}",
                self.label(TOGGLE_ITEM),
                self.label(MANUAL_ITEM)
            )),
        }
    }

    fn label(&self, item: &str) -> String {
        self.notifications.label(item).unwrap_or_default()
    }

    fn resolve(&self, path: &str) -> Result<String, RuntimeError> {
        let path = Path::new(path);
        if path.is_absolute() {
            return absolute(path);
        }
        absolute(&self.base_dir.join(path))
    }

    fn report(self) -> SessionReport {
        let active = self.editor.active_tab().map(|t| t.id);
        let tabs = self
            .editor
            .tabs()
            .iter()
            .map(|tab| TabSummary {
                uri: tab.uri.to_string(),
                active: Some(tab.id) == active,
                preview: tab.preview,
                dirty: tab.dirty,
                text: tab.text.clone(),
            })
            .collect();

        let service = self.notifications.service();
        let labels = service
            .items()
            .iter()
            .map(|item| (item.id.clone(), item.label().to_string()))
            .collect();
        let mut notifications: Vec<(String, String)> = service
            .get_recent_notifications(usize::MAX)
            .into_iter()
            .map(|n| (n.level.to_string(), n.message.clone()))
            .collect();
        notifications.reverse();

        SessionReport {
            transcript: self.transcript.clone(),
            tabs,
            labels,
            notifications,
            elapsed_ms: self.clock.now_ms(),
        }
    }
}

/// Makes `path` absolute against the working directory, as a UTF-8 string
fn absolute(path: &Path) -> Result<String, RuntimeError> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|err| RuntimeError::Io {
                path: path.display().to_string(),
                reason: err.to_string(),
            })?
            .join(path)
    };
    joined
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| RuntimeError::Io {
            path: joined.display().to_string(),
            reason: "path is not valid UTF-8".to_string(),
        })
}
