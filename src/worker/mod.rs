//! Worker command resolution and process handoff.
//!
//! [`WorkerCommand`] is the fully resolved program line for one dispatch.
//! A [`Launcher`] transfers control to it; [`ProcessLauncher`] does so either
//! by replacing the process image (`exec`) or by supervising a child and
//! propagating its exit status.

use crate::config::{HandoffMode, WorkerSpec};
use crate::error::{HandoffError, EXIT_FAILURE};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::process::{ExitCode, ExitStatus};

#[cfg(unix)]
mod exec;
mod supervise;

/// Program, argv and env additions for a single worker handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    pub program: String,
    /// Base args from config followed by the forwarded invocation args,
    /// kept as raw OS strings so nothing is re-encoded on the way through.
    pub args: Vec<OsString>,
    /// Variables to add; never contains names already set in the environment.
    pub env: BTreeMap<String, String>,
}

impl WorkerCommand {
    /// Resolve the command for `forwarded` args. `is_set` reports whether a
    /// variable already exists in the inherited environment.
    pub fn resolve<F>(spec: &WorkerSpec, forwarded: &[OsString], is_set: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let args = spec
            .args
            .iter()
            .map(OsString::from)
            .chain(forwarded.iter().cloned())
            .collect();
        let env = spec
            .env
            .iter()
            .filter(|(name, _)| !is_set(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Self {
            program: spec.program.trim().to_string(),
            args,
            env,
        }
    }
}

/// Exit code the entrypoint terminates with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome(u8);

impl ExitOutcome {
    pub const SUCCESS: ExitOutcome = ExitOutcome(0);

    pub fn code(self) -> u8 {
        self.0
    }

    /// Map a child's status the way a shell reports it: the exit code as-is,
    /// `128 + N` for death by signal `N`.
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self((code & 0xff) as u8);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self(128u8.saturating_add((signal & 0x7f) as u8));
            }
        }
        Self(EXIT_FAILURE)
    }
}

impl From<u8> for ExitOutcome {
    fn from(code: u8) -> Self {
        Self(code)
    }
}

impl From<ExitOutcome> for ExitCode {
    fn from(outcome: ExitOutcome) -> Self {
        ExitCode::from(outcome.0)
    }
}

/// Transfers control to a worker.
pub trait Launcher {
    /// Start `command`. With exec handoff a successful call never returns.
    fn launch(&self, command: &WorkerCommand) -> Result<ExitOutcome, HandoffError>;
}

/// Launches the worker as a real OS process.
#[derive(Debug, Clone, Copy)]
pub struct ProcessLauncher {
    mode: HandoffMode,
}

impl ProcessLauncher {
    pub fn new(mode: HandoffMode) -> Self {
        Self { mode }
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, command: &WorkerCommand) -> Result<ExitOutcome, HandoffError> {
        tracing::debug!(mode = %self.mode, program = %command.program, "handing off to worker");
        match self.mode {
            HandoffMode::Exec => replace_process(command),
            HandoffMode::Spawn => supervise::supervise(command),
        }
    }
}

#[cfg(unix)]
fn replace_process(command: &WorkerCommand) -> Result<ExitOutcome, HandoffError> {
    Err(exec::exec(command))
}

#[cfg(not(unix))]
fn replace_process(command: &WorkerCommand) -> Result<ExitOutcome, HandoffError> {
    tracing::warn!("exec handoff is unavailable on this platform; supervising the worker instead");
    supervise::supervise(command)
}
