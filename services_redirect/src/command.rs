//! Command identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Commands the redirect service answers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandId {
    /// Turn automatic redirection on or off
    #[serde(rename = "toggleRedirect")]
    ToggleRedirect,
    /// Redirect the active document once
    #[serde(rename = "redirectActive")]
    RedirectActive,
}

impl CommandId {
    /// Every command, in registration order
    pub const ALL: [CommandId; 2] = [CommandId::ToggleRedirect, CommandId::RedirectActive];

    /// Returns the id the host registers
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandId::ToggleRedirect => "toggleRedirect",
            CommandId::RedirectActive => "redirectActive",
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}
