//! One-shot dispatch: decide, announce, hand off.

use std::io::Write;
use tracing::{error, info, warn};

use crate::config::WorkerSpec;
use crate::error::{DispatchError, EntrypointError};
use crate::invocation::{decide, dispatch_line, Decision, Invocation};
use crate::worker::{ExitOutcome, Launcher, WorkerCommand};

/// Routes an [`Invocation`] to the configured worker.
pub struct Dispatcher<L> {
    worker: WorkerSpec,
    launcher: L,
    is_set: fn(&str) -> bool,
}

impl<L: Launcher> Dispatcher<L> {
    pub fn new(worker: WorkerSpec, launcher: L) -> Self {
        Self {
            worker,
            launcher,
            is_set: env_var_is_set,
        }
    }

    /// Replace the check used to detect variables already in the environment.
    pub fn with_env_check(mut self, is_set: fn(&str) -> bool) -> Self {
        self.is_set = is_set;
        self
    }

    #[cfg(test)]
    pub(crate) fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Handle one invocation.
    ///
    /// On `run`, writes `run -- <args>` to `diagnostics` and hands off; with
    /// exec handoff a successful launch never returns. Anything else returns
    /// [`DispatchError::UnrecognizedCommand`] without touching the launcher.
    pub fn run<W: Write>(
        &self,
        invocation: &Invocation,
        diagnostics: &mut W,
    ) -> Result<ExitOutcome, EntrypointError> {
        let (command, arguments) = match decide(invocation) {
            Decision::Dispatch { command, arguments } => (command, arguments),
            Decision::Reject { invocation } => {
                warn!(invocation = %invocation.joined(), "rejected invocation");
                return Err(DispatchError::UnrecognizedCommand(invocation).into());
            }
        };

        info!(%command, args = arguments.len(), "dispatching to worker");
        // Best effort: a closed stderr must not block the handoff.
        let _ = writeln!(diagnostics, "{}", dispatch_line(command, &arguments));
        let _ = diagnostics.flush();

        let worker = WorkerCommand::resolve(&self.worker, &arguments, self.is_set);
        self.launcher.launch(&worker).map_err(|e| {
            error!(program = %worker.program, error = %e, "worker handoff failed");
            EntrypointError::from(e)
        })
    }
}

fn env_var_is_set(name: &str) -> bool {
    std::env::var_os(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HandoffMode;
    use crate::error::{HandoffError, EXIT_NOT_FOUND, EXIT_UNRECOGNIZED};
    use std::cell::RefCell;

    /// Records launches instead of starting processes.
    #[derive(Default)]
    struct RecordingLauncher {
        launched: RefCell<Vec<WorkerCommand>>,
        missing: bool,
    }

    impl Launcher for RecordingLauncher {
        fn launch(&self, command: &WorkerCommand) -> Result<ExitOutcome, HandoffError> {
            self.launched.borrow_mut().push(command.clone());
            if self.missing {
                return Err(HandoffError::NotFound {
                    program: command.program.clone(),
                });
            }
            Ok(ExitOutcome::SUCCESS)
        }
    }

    fn worker() -> WorkerSpec {
        WorkerSpec {
            program: "bot".to_string(),
            args: vec![],
            handoff: HandoffMode::Spawn,
            env: Default::default(),
        }
    }

    fn dispatcher() -> Dispatcher<RecordingLauncher> {
        Dispatcher::new(worker(), RecordingLauncher::default()).with_env_check(|_| false)
    }

    fn run(d: &Dispatcher<RecordingLauncher>, args: &[&str]) -> (Result<ExitOutcome, EntrypointError>, String) {
        let mut stderr = Vec::new();
        let result = d.run(&Invocation::from_args(args.iter().copied()), &mut stderr);
        (result, String::from_utf8(stderr).unwrap())
    }

    #[test]
    fn run_alone_launches_worker_with_no_arguments() {
        let d = dispatcher();
        let (result, stderr) = run(&d, &["run"]);
        assert_eq!(result.unwrap(), ExitOutcome::SUCCESS);
        assert_eq!(stderr, "run --\n");
        let launched = d.launcher().launched.borrow();
        assert_eq!(launched.len(), 1);
        assert!(launched[0].args.is_empty());
    }

    #[test]
    fn run_forwards_flag_and_value() {
        let d = dispatcher();
        let (result, stderr) = run(&d, &["run", "--flag", "value"]);
        assert!(result.is_ok());
        assert_eq!(stderr, "run -- --flag value\n");
        assert_eq!(d.launcher().launched.borrow()[0].args, vec!["--flag", "value"]);
    }

    #[test]
    fn bogus_command_is_rejected_without_launching() {
        let d = dispatcher();
        let (result, stderr) = run(&d, &["bogus"]);
        let err = result.unwrap_err();
        assert_eq!(err.exit_code(), EXIT_UNRECOGNIZED);
        assert_eq!(err.to_string(), "'bogus' is not a valid command");
        assert!(stderr.is_empty(), "dispatch line must not be written: {stderr}");
        assert!(d.launcher().launched.borrow().is_empty());
    }

    #[test]
    fn empty_invocation_is_rejected_without_launching() {
        let d = dispatcher();
        let (result, _) = run(&d, &[]);
        assert_ne!(result.unwrap_err().exit_code(), 0);
        assert!(d.launcher().launched.borrow().is_empty());
    }

    #[test]
    fn repeated_invocations_launch_identically() {
        let d = dispatcher();
        let _ = run(&d, &["run", "a", "b"]);
        let _ = run(&d, &["run", "a", "b"]);
        let launched = d.launcher().launched.borrow();
        assert_eq!(launched.len(), 2);
        assert_eq!(launched[0], launched[1]);
    }

    #[test]
    fn handoff_failure_surfaces_exit_code() {
        let d = Dispatcher::new(
            worker(),
            RecordingLauncher {
                missing: true,
                ..Default::default()
            },
        );
        let (result, stderr) = run(&d, &["run"]);
        let err = result.unwrap_err();
        assert_eq!(err.exit_code(), EXIT_NOT_FOUND);
        assert_eq!(stderr, "run --\n");
    }

    #[test]
    fn base_args_and_env_defaults_are_applied() {
        let mut spec = worker();
        spec.args = vec!["-m".into(), "welovebot".into()];
        spec.env.insert("BOT_CONFIG_PREFIX".into(), "NORTHISBOT".into());
        spec.env.insert("HOME".into(), "/nowhere".into());
        let d = Dispatcher::new(spec, RecordingLauncher::default())
            .with_env_check(|name| name == "HOME");
        let _ = run(&d, &["run", "--debug"]);
        let launched = d.launcher().launched.borrow();
        assert_eq!(launched[0].args, vec!["-m", "welovebot", "--debug"]);
        assert_eq!(launched[0].env.len(), 1);
        assert!(launched[0].env.contains_key("BOT_CONFIG_PREFIX"));
    }
}
