//! Configuration data model.
//!
//! Struct/enum definitions plus default values. Source resolution and
//! env layering live in `config::mod` and `config::env`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::defaults::{default_worker_args, DEFAULT_LOG_LEVEL, DEFAULT_WORKER_PROGRAM};

/// How control is transferred to the worker.
///
/// TOML and `ENTRYPOINT_HANDOFF` share one parser, so spelling rules
/// (case, surrounding whitespace) are the same for both.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String")]
pub enum HandoffMode {
    /// Replace the entrypoint's process image with the worker.
    Exec,
    /// Run the worker as a child, forward signals, propagate its exit code.
    Spawn,
}

impl Default for HandoffMode {
    fn default() -> Self {
        if cfg!(unix) {
            Self::Exec
        } else {
            Self::Spawn
        }
    }
}

impl HandoffMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exec => "exec",
            Self::Spawn => "spawn",
        }
    }
}

impl fmt::Display for HandoffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandoffMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exec" => Ok(Self::Exec),
            "spawn" => Ok(Self::Spawn),
            other => Err(format!("unknown handoff mode `{other}` (expected exec or spawn)")),
        }
    }
}

impl TryFrom<String> for HandoffMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub worker: WorkerSpec,
    pub logging: LoggingConfig,
}

/// The worker process the `run` command hands off to.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerSpec {
    /// Executable name or path; looked up on PATH when bare.
    pub program: String,
    /// Arguments placed before the forwarded invocation arguments.
    pub args: Vec<String>,
    pub handoff: HandoffMode,
    /// Variables set for the worker only when absent from the environment.
    pub env: BTreeMap<String, String>,
}

impl Default for WorkerSpec {
    fn default() -> Self {
        Self {
            program: DEFAULT_WORKER_PROGRAM.to_string(),
            args: default_worker_args(),
            handoff: HandoffMode::default(),
            env: BTreeMap::new(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path named by `ENTRYPOINT_CONFIG`.
    Explicit(std::path::PathBuf),
    /// `./entrypoint.toml`.
    Local,
    /// `<config root>/entrypoint/entrypoint.toml`.
    Global(std::path::PathBuf),
    BuiltInDefaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(path) | Self::Global(path) => write!(f, "{}", path.display()),
            Self::Local => f.write_str("./entrypoint.toml"),
            Self::BuiltInDefaults => f.write_str("built-in defaults"),
        }
    }
}

/// Config plus the source it was read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}
