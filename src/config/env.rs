//! Environment overrides.
//!
//! `ENTRYPOINT_*` variables win over any file setting. The bot's own
//! `PREFIX__SECTION__KEY` variables are never read here.

use crate::error::ConfigError;

use super::{Config, HandoffMode};

/// Names the explicit config file path.
pub const ENV_CONFIG_PATH: &str = "ENTRYPOINT_CONFIG";
pub const ENV_WORKER: &str = "ENTRYPOINT_WORKER";
pub const ENV_WORKER_ARGS: &str = "ENTRYPOINT_WORKER_ARGS";
pub const ENV_HANDOFF: &str = "ENTRYPOINT_HANDOFF";
pub const ENV_LOG: &str = "ENTRYPOINT_LOG";

pub(super) fn apply_runtime_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(program) = env_lookup(ENV_WORKER) {
        config.worker.program = program.trim().to_string();
    }
    // Present-but-empty clears the base args.
    if let Some(args) = env_lookup(ENV_WORKER_ARGS) {
        config.worker.args = args.split_whitespace().map(str::to_string).collect();
    }
    if let Some(mode) = env_lookup(ENV_HANDOFF) {
        config.worker.handoff = mode
            .parse::<HandoffMode>()
            .map_err(|msg| ConfigError::Invalid(format!("{ENV_HANDOFF}: {msg}")))?;
    }
    if let Some(level) = non_blank(env_lookup(ENV_LOG)) {
        config.logging.level = level;
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
