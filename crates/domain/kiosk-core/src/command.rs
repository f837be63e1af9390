use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A remote control action as carried on the broadcast channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Next,
    Prev,
    Reset,
    Skip,
}

impl Command {
    pub const ALL: [Command; 4] = [Command::Next, Command::Prev, Command::Reset, Command::Skip];

    /// The wire token for this command.
    pub fn token(self) -> &'static str {
        match self {
            Command::Next => "next",
            Command::Prev => "prev",
            Command::Reset => "reset",
            Command::Skip => "skip",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized action token {0:?}")]
pub struct CommandParseError(pub String);

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Command::Next),
            "prev" => Ok(Command::Prev),
            "reset" => Ok(Command::Reset),
            "skip" => Ok(Command::Skip),
            other => Err(CommandParseError(other.to_string())),
        }
    }
}

/// Wire form of a broadcast message: `{"action": "<token>"}`.
///
/// The token is kept as an opaque string so that relays can forward values
/// they do not understand and each display decides what to ignore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMessage {
    pub action: String,
}

impl ActionMessage {
    pub fn new(command: Command) -> Self {
        Self {
            action: command.token().to_string(),
        }
    }

    pub fn command(&self) -> Result<Command, CommandParseError> {
        self.action.parse()
    }
}

impl From<Command> for ActionMessage {
    fn from(command: Command) -> Self {
        Self::new(command)
    }
}
