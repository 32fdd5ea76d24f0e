//! Process-image replacement (Unix only).

use std::os::unix::process::CommandExt;
use std::process::Command;

use super::WorkerCommand;
use crate::error::HandoffError;

/// Replace the current process with the worker. Only returns on failure.
///
/// The inherited environment is kept as-is; `command.env` only adds
/// variables. PATH lookup follows `execvp`.
pub(super) fn exec(command: &WorkerCommand) -> HandoffError {
    let err = Command::new(&command.program)
        .args(&command.args)
        .envs(&command.env)
        .exec();
    HandoffError::from_start_failure(&command.program, err)
}
