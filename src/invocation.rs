//! Invocation model and the dispatch decision.
//!
//! The orchestrator starts the container as `<entrypoint> <command> [args...]`.
//! [`decide`] is a pure function from that argument list to a [`Decision`]:
//! either forward the trailing arguments to the worker, or reject the whole
//! invocation. Nothing after the command token is inspected, so flags such as
//! `--help` or a literal `--` reach the worker untouched.

use std::ffi::{OsStr, OsString};
use std::fmt;

/// Verbs the entrypoint accepts as its first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Hand off to the worker process.
    Run,
}

impl Command {
    /// Every recognized command, in help order.
    pub const ALL: [Command; 1] = [Command::Run];

    /// Token the command is spelled as on the command line.
    pub fn token(self) -> &'static str {
        match self {
            Self::Run => "run",
        }
    }

    /// Match a raw token against the closed command set (case-sensitive).
    /// Tokens that are not valid UTF-8 never match.
    pub fn from_token(token: &OsStr) -> Option<Self> {
        let token = token.to_str()?;
        Self::ALL.into_iter().find(|command| command.token() == token)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The argument list the process was started with, program name excluded.
///
/// Tokens are kept as raw OS strings so forwarded arguments reach the worker
/// byte for byte; only diagnostics render them lossily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    command: Option<OsString>,
    arguments: Vec<OsString>,
}

impl Invocation {
    /// Split a raw argument list into the command token and the rest.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut iter = args.into_iter().map(Into::into);
        let command = iter.next();
        Self {
            command,
            arguments: iter.collect(),
        }
    }

    /// First token, if any.
    pub fn command(&self) -> Option<&OsStr> {
        self.command.as_deref()
    }

    /// Tokens after the command, in their original order.
    pub fn arguments(&self) -> &[OsString] {
        &self.arguments
    }

    /// All tokens joined by single spaces, as shown in diagnostics.
    pub fn joined(&self) -> String {
        join_lossy(self.command.iter().chain(self.arguments.iter()))
    }
}

/// Outcome of inspecting an [`Invocation`]. Both variants are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Forward `arguments` to the worker.
    Dispatch {
        command: Command,
        arguments: Vec<OsString>,
    },
    /// The command token was missing or not recognized.
    Reject { invocation: Invocation },
}

#[cfg(test)]
impl Decision {
    pub(crate) fn is_dispatch(&self) -> bool {
        matches!(self, Self::Dispatch { .. })
    }
}

/// Decide what to do with an invocation.
pub fn decide(invocation: &Invocation) -> Decision {
    match invocation.command().and_then(Command::from_token) {
        Some(command) => Decision::Dispatch {
            command,
            arguments: invocation.arguments().to_vec(),
        },
        None => Decision::Reject {
            invocation: invocation.clone(),
        },
    }
}

/// Line written to stderr right before handing off to the worker.
pub fn dispatch_line(command: Command, arguments: &[OsString]) -> String {
    let line = format!("{command} -- {}", join_lossy(arguments.iter()));
    line.trim_end().to_string()
}

/// Line written to stderr when the invocation is rejected.
pub fn rejection_line(invocation: &Invocation) -> String {
    format!("'{}' is not a valid command", invocation.joined())
}

fn join_lossy<'a>(tokens: impl Iterator<Item = &'a OsString>) -> String {
    tokens
        .map(|token| token.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
