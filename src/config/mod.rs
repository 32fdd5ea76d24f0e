//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`ENTRYPOINT_WORKER`, `ENTRYPOINT_WORKER_ARGS`,
//!    `ENTRYPOINT_HANDOFF`, `ENTRYPOINT_LOG`)
//! 2. TOML file named by `ENTRYPOINT_CONFIG` (must exist)
//! 3. ./entrypoint.toml in the current directory
//! 4. $XDG_CONFIG_HOME/entrypoint/entrypoint.toml (or
//!    ~/.config/entrypoint/entrypoint.toml)
//! 5. Built-in defaults
//!
//! None of this touches the bot's own configuration variables; those pass
//! through to the worker untouched.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

mod defaults;
mod env;
mod types;

pub use defaults::DEFAULT_CONFIG_TEMPLATE;
pub use env::{ENV_CONFIG_PATH, ENV_HANDOFF, ENV_LOG, ENV_WORKER, ENV_WORKER_ARGS};
pub use types::{
    Config, ConfigSource, HandoffMode, LoadedConfig, LoggingConfig, WorkerSpec,
};

use defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use env::apply_runtime_env_overrides;

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load configuration from disk and the process environment.
pub fn load_config() -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

fn load_config_from_sources<FRead, FEnv, FRoot>(
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let path_override = env_lookup(ENV_CONFIG_PATH)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());
    let (text, source) = read_config_text(path_override.as_deref(), &read_file, &config_root)?;
    let mut config = parse_config(&text)?;
    apply_runtime_env_overrides(&mut config, &env_lookup)?;
    validate(&config)?;
    Ok(LoadedConfig { config, source })
}

fn read_config_text<FRead, FRoot>(
    path_override: Option<&str>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<(String, ConfigSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    if let Some(p) = path_override {
        let path = PathBuf::from(p);
        let text = read_file(&path).map_err(|e| {
            ConfigError::Invalid(format!(
                "failed to read {ENV_CONFIG_PATH} `{}`: {e}",
                path.display()
            ))
        })?;
        return Ok((text, ConfigSource::Explicit(path)));
    }

    if let Ok(text) = read_file(Path::new(CONFIG_FILE_NAME)) {
        return Ok((text, ConfigSource::Local));
    }
    if let Some(dir) = config_root() {
        let global = dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        if let Ok(text) = read_file(&global) {
            return Ok((text, ConfigSource::Global(global)));
        }
    }

    Ok((String::new(), ConfigSource::BuiltInDefaults))
}

/// Parse a TOML document; missing sections and keys take their defaults.
pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(text)?)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.worker.program.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "worker.program must not be empty".to_string(),
        ));
    }
    if let Some(name) = config
        .worker
        .env
        .keys()
        .find(|name| name.is_empty() || name.contains('=') || name.contains('\0'))
    {
        return Err(ConfigError::Invalid(format!(
            "worker.env has an invalid variable name `{name}`"
        )));
    }
    Ok(())
}

/// Resolve the user config root (`$XDG_CONFIG_HOME` or `~/.config`).
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
