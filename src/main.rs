//! `entrypoint` binary: the container's ENTRYPOINT.

use bot_entrypoint::build_info;
use bot_entrypoint::config::load_config;
use bot_entrypoint::dispatcher::Dispatcher;
use bot_entrypoint::error::{DispatchError, EntrypointError, EXIT_FAILURE};
use bot_entrypoint::invocation::{decide, Decision, Invocation};
use bot_entrypoint::logging;
use bot_entrypoint::worker::ProcessLauncher;
use std::process::ExitCode;
use tracing::{debug, info};

fn main() -> ExitCode {
    let invocation = Invocation::from_args(std::env::args_os().skip(1));

    // Rejection depends only on the arguments, never on configuration.
    if let Decision::Reject { invocation } = decide(&invocation) {
        let err = DispatchError::UnrecognizedCommand(invocation);
        eprintln!("{err}");
        return ExitCode::from(err.exit_code());
    }

    let loaded = match load_config() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", EntrypointError::from(e));
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    logging::init(&loaded.config.logging);
    info!(version = %build_info::startup_metadata_line(), "entrypoint starting");
    debug!(source = %loaded.source, "configuration loaded");

    let worker = loaded.config.worker;
    let launcher = ProcessLauncher::new(worker.handoff);
    let dispatcher = Dispatcher::new(worker, launcher);

    match dispatcher.run(&invocation, &mut std::io::stderr()) {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
