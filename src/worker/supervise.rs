//! Supervised handoff: run the worker as a child and wait for it.
//!
//! Used where process-image replacement is unavailable or when configured
//! with `handoff = "spawn"`. Runs on a single-threaded runtime. On Unix the
//! termination signals the entrypoint receives are relayed to the child, since
//! as PID 1 in a container the entrypoint would otherwise absorb them.

use std::process::ExitStatus;
use tokio::process::{Child, Command};
use tracing::info;

use super::{ExitOutcome, WorkerCommand};
use crate::error::HandoffError;

/// Spawn `command`, wait for it, and return its exit outcome.
pub(super) fn supervise(command: &WorkerCommand) -> Result<ExitOutcome, HandoffError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(HandoffError::Runtime)?;
    runtime.block_on(run_worker(command))
}

async fn run_worker(command: &WorkerCommand) -> Result<ExitOutcome, HandoffError> {
    // Register handlers before the child exists so no signal slips through
    // with its default (fatal) disposition.
    #[cfg(unix)]
    let mut relay = relay::SignalRelay::install()?;

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .envs(&command.env)
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| HandoffError::from_start_failure(&command.program, e))?;
    let pid = child.id();
    info!(?pid, program = %command.program, "worker started");

    #[cfg(unix)]
    let status = relay.wait(&mut child, pid).await?;
    #[cfg(not(unix))]
    let status = wait(&mut child).await?;

    let outcome = ExitOutcome::from_status(status);
    info!(code = outcome.code(), "worker exited");
    Ok(outcome)
}

#[cfg(not(unix))]
async fn wait(child: &mut Child) -> Result<ExitStatus, HandoffError> {
    child.wait().await.map_err(HandoffError::Wait)
}

#[cfg(unix)]
mod relay {
    use super::*;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    use tokio::signal::unix::{signal, SignalKind};
    use tracing::warn;

    /// Signal streams relayed to the worker.
    pub(super) struct SignalRelay {
        terminate: tokio::signal::unix::Signal,
        interrupt: tokio::signal::unix::Signal,
        hangup: tokio::signal::unix::Signal,
        quit: tokio::signal::unix::Signal,
    }

    impl SignalRelay {
        pub(super) fn install() -> Result<Self, HandoffError> {
            let listen = |kind| signal(kind).map_err(HandoffError::Runtime);
            Ok(Self {
                terminate: listen(SignalKind::terminate())?,
                interrupt: listen(SignalKind::interrupt())?,
                hangup: listen(SignalKind::hangup())?,
                quit: listen(SignalKind::quit())?,
            })
        }

        /// Wait for the child, relaying signals until it exits.
        pub(super) async fn wait(
            &mut self,
            child: &mut Child,
            pid: Option<u32>,
        ) -> Result<ExitStatus, HandoffError> {
            loop {
                let received = tokio::select! {
                    status = child.wait() => return status.map_err(HandoffError::Wait),
                    _ = self.terminate.recv() => Signal::SIGTERM,
                    _ = self.interrupt.recv() => Signal::SIGINT,
                    _ = self.hangup.recv() => Signal::SIGHUP,
                    _ = self.quit.recv() => Signal::SIGQUIT,
                };
                forward(pid, received);
            }
        }
    }

    fn forward(pid: Option<u32>, sig: Signal) {
        let Some(raw) = pid.and_then(|p| i32::try_from(p).ok()) else {
            // Already reaped; the next wait() returns its status.
            return;
        };
        match kill(Pid::from_raw(raw), sig) {
            Ok(()) => info!(signal = sig.as_str(), pid = raw, "forwarded signal to worker"),
            Err(errno) => warn!(signal = sig.as_str(), pid = raw, %errno, "failed to forward signal"),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sh(script: &str) -> WorkerCommand {
        WorkerCommand {
            program: "sh".to_string(),
            args: vec!["-c".into(), script.into()],
            env: BTreeMap::new(),
        }
    }

    #[test]
    fn propagates_child_exit_code() {
        assert_eq!(supervise(&sh("exit 0")).unwrap().code(), 0);
        assert_eq!(supervise(&sh("exit 7")).unwrap().code(), 7);
    }

    #[test]
    fn child_killed_by_signal_maps_to_128_plus_signal() {
        let outcome = supervise(&sh("kill -TERM $$")).unwrap();
        assert_eq!(outcome.code(), 128 + 15);
    }

    #[test]
    fn env_additions_reach_the_child() {
        let mut command = sh("test \"$BOT_CONFIG_PREFIX\" = NORTHISBOT");
        command
            .env
            .insert("BOT_CONFIG_PREFIX".to_string(), "NORTHISBOT".to_string());
        assert_eq!(supervise(&command).unwrap().code(), 0);
    }

    #[test]
    fn missing_program_is_not_found() {
        let command = WorkerCommand {
            program: "/nonexistent/bot-entrypoint-worker".to_string(),
            args: vec![],
            env: BTreeMap::new(),
        };
        let err = supervise(&command).unwrap_err();
        assert!(matches!(err, HandoffError::NotFound { .. }), "got: {err:?}");
    }
}
