//! bot-entrypoint — container entrypoint for the chat-bot worker.
//!
//! The orchestrator starts the image as `entrypoint run [args...]`. The only
//! recognized command is `run`: its trailing arguments are forwarded verbatim
//! to the worker (by default `python -m welovebot`), which either replaces
//! the entrypoint process or runs as a supervised child. Anything else is
//! rejected with `'<args>' is not a valid command` and a non-zero exit.
//!
//! # Quick start
//!
//! ```no_run
//! use bot_entrypoint::config::load_config;
//! use bot_entrypoint::dispatcher::Dispatcher;
//! use bot_entrypoint::invocation::Invocation;
//! use bot_entrypoint::worker::ProcessLauncher;
//!
//! let config = load_config().unwrap().config;
//! let launcher = ProcessLauncher::new(config.worker.handoff);
//! let dispatcher = Dispatcher::new(config.worker, launcher);
//! let invocation = Invocation::from_args(["run", "--verbose"]);
//! let outcome = dispatcher.run(&invocation, &mut std::io::stderr());
//! ```

pub mod build_info;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod invocation;
pub mod logging;
pub mod worker;
