//! Error types for the entrypoint.

use crate::invocation::{rejection_line, Invocation};
use std::fmt;
use std::io;

/// Exit code for an unrecognized command (`EX_USAGE`).
pub const EXIT_UNRECOGNIZED: u8 = 64;
/// Exit code when the worker program exists but cannot be executed.
pub const EXIT_NOT_EXECUTABLE: u8 = 126;
/// Exit code when the worker program cannot be found.
pub const EXIT_NOT_FOUND: u8 = 127;
/// Exit code for config and generic handoff failures.
pub const EXIT_FAILURE: u8 = 1;

// ---------------------------------------------------------------------------
// DispatchError
// ---------------------------------------------------------------------------

/// Errors raised while interpreting the invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The first argument is absent or not a recognized command.
    UnrecognizedCommand(Invocation),
}

impl DispatchError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::UnrecognizedCommand(_) => EXIT_UNRECOGNIZED,
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedCommand(invocation) => f.write_str(&rejection_line(invocation)),
        }
    }
}

impl std::error::Error for DispatchError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// HandoffError
// ---------------------------------------------------------------------------

/// Errors transferring control to the worker process.
#[derive(Debug)]
pub enum HandoffError {
    /// The worker program does not exist on PATH.
    NotFound { program: String },
    /// The worker program exists but may not be executed.
    PermissionDenied { program: String },
    /// Any other failure starting the worker.
    Spawn { program: String, source: io::Error },
    /// Waiting on a supervised worker failed.
    Wait(io::Error),
    /// The supervising runtime or its signal handlers could not be set up.
    Runtime(io::Error),
}

impl HandoffError {
    /// Classify an exec/spawn failure by its io error kind. A file the kernel
    /// cannot load as an executable (`ENOEXEC`) counts as not executable.
    pub fn from_start_failure(program: &str, err: io::Error) -> Self {
        let program = program.to_string();
        if is_exec_format_error(&err) {
            return Self::PermissionDenied { program };
        }
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { program },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { program },
            _ => Self::Spawn {
                program,
                source: err,
            },
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NotFound { .. } => EXIT_NOT_FOUND,
            Self::PermissionDenied { .. } => EXIT_NOT_EXECUTABLE,
            Self::Spawn { .. } | Self::Wait(_) | Self::Runtime(_) => EXIT_FAILURE,
        }
    }
}

#[cfg(unix)]
fn is_exec_format_error(err: &io::Error) -> bool {
    err.raw_os_error() == Some(nix::errno::Errno::ENOEXEC as i32)
}

#[cfg(not(unix))]
fn is_exec_format_error(_err: &io::Error) -> bool {
    false
}

impl fmt::Display for HandoffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { program } => write!(f, "worker program '{program}' not found"),
            Self::PermissionDenied { program } => {
                write!(f, "worker program '{program}' is not executable")
            }
            Self::Spawn { program, source } => {
                write!(f, "failed to start worker program '{program}': {source}")
            }
            Self::Wait(e) => write!(f, "failed waiting on worker: {e}"),
            Self::Runtime(e) => write!(f, "failed to set up worker supervision: {e}"),
        }
    }
}

impl std::error::Error for HandoffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Wait(e) | Self::Runtime(e) => Some(e),
            Self::NotFound { .. } | Self::PermissionDenied { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// EntrypointError — top-level
// ---------------------------------------------------------------------------

/// Top-level error type for one entrypoint run.
#[derive(Debug)]
pub enum EntrypointError {
    Dispatch(DispatchError),
    Config(ConfigError),
    Handoff(HandoffError),
}

impl EntrypointError {
    /// Process exit code this failure terminates with.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Dispatch(e) => e.exit_code(),
            Self::Config(_) => EXIT_FAILURE,
            Self::Handoff(e) => e.exit_code(),
        }
    }
}

impl fmt::Display for EntrypointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Printed bare: `'<args>' is not a valid command`.
            Self::Dispatch(e) => write!(f, "{e}"),
            Self::Config(e) => write!(f, "error: config: {e}"),
            Self::Handoff(e) => write!(f, "error: {e}"),
        }
    }
}

impl std::error::Error for EntrypointError {}

impl From<DispatchError> for EntrypointError {
    fn from(e: DispatchError) -> Self {
        Self::Dispatch(e)
    }
}

impl From<ConfigError> for EntrypointError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<HandoffError> for EntrypointError {
    fn from(e: HandoffError) -> Self {
        Self::Handoff(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_command_display_matches_rejection_line() {
        let err = DispatchError::UnrecognizedCommand(Invocation::from_args(["bogus"]));
        assert_eq!(err.to_string(), "'bogus' is not a valid command");
        assert_eq!(err.exit_code(), EXIT_UNRECOGNIZED);
    }

    #[test]
    fn config_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let e = ConfigError::from(io_err);
        let s = e.to_string();
        assert!(s.starts_with("io:"), "got: {s}");
        assert!(s.contains("file not found"));
    }

    #[test]
    fn config_error_from_toml() {
        let toml_err: toml::de::Error = toml::from_str::<toml::Value>("x = [unclosed").unwrap_err();
        let e = ConfigError::from(toml_err);
        assert!(e.to_string().starts_with("toml:"));
    }

    #[test]
    fn config_error_invalid_message() {
        let e = ConfigError::Invalid("worker.program must not be empty".into());
        assert_eq!(
            e.to_string(),
            "invalid config: worker.program must not be empty"
        );
    }

    #[test]
    fn start_failures_map_to_shell_exit_codes() {
        let missing = HandoffError::from_start_failure(
            "python",
            io::Error::new(io::ErrorKind::NotFound, "nope"),
        );
        assert_eq!(missing.exit_code(), EXIT_NOT_FOUND);
        assert_eq!(missing.to_string(), "worker program 'python' not found");

        let denied = HandoffError::from_start_failure(
            "./bot",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(denied.exit_code(), EXIT_NOT_EXECUTABLE);

        let other = HandoffError::from_start_failure(
            "./bot",
            io::Error::new(io::ErrorKind::Other, "boom"),
        );
        assert_eq!(other.exit_code(), EXIT_FAILURE);
        assert!(other.to_string().contains("boom"), "got: {other}");
    }

    #[cfg(unix)]
    #[test]
    fn exec_format_error_maps_to_not_executable() {
        let err = HandoffError::from_start_failure(
            "./bot.bin",
            io::Error::from_raw_os_error(nix::errno::Errno::ENOEXEC as i32),
        );
        assert!(matches!(err, HandoffError::PermissionDenied { .. }), "got: {err:?}");
        assert_eq!(err.exit_code(), EXIT_NOT_EXECUTABLE);
        assert_eq!(err.to_string(), "worker program './bot.bin' is not executable");
    }

    #[test]
    fn entrypoint_error_exit_codes_and_display() {
        let rejected = EntrypointError::from(DispatchError::UnrecognizedCommand(
            Invocation::from_args(Vec::<String>::new()),
        ));
        assert_eq!(rejected.exit_code(), EXIT_UNRECOGNIZED);
        assert_eq!(rejected.to_string(), "'' is not a valid command");

        let config = EntrypointError::from(ConfigError::Invalid("bad".into()));
        assert_eq!(config.exit_code(), EXIT_FAILURE);
        assert_eq!(config.to_string(), "error: config: invalid config: bad");

        let handoff = EntrypointError::from(HandoffError::NotFound {
            program: "python".into(),
        });
        assert_eq!(handoff.exit_code(), EXIT_NOT_FOUND);
        assert_eq!(handoff.to_string(), "error: worker program 'python' not found");
    }
}
