//! Default configuration constants.

/// Embedded default `entrypoint.toml`, shipped alongside the image.
pub const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../templates/entrypoint.toml");
/// Config file name looked up in the working directory and config root.
pub(super) const CONFIG_FILE_NAME: &str = "entrypoint.toml";
/// Directory under the config root holding the per-user config file.
pub(super) const CONFIG_DIR_NAME: &str = "entrypoint";
/// Default worker program.
pub(super) const DEFAULT_WORKER_PROGRAM: &str = "python";
/// Default worker base args (module entry point).
pub(super) const DEFAULT_WORKER_ARGS: [&str; 2] = ["-m", "welovebot"];
/// Default log filter. Keeps stderr limited to the dispatch diagnostics.
pub(super) const DEFAULT_LOG_LEVEL: &str = "warn";

pub(super) fn default_worker_args() -> Vec<String> {
    DEFAULT_WORKER_ARGS.iter().map(|s| s.to_string()).collect()
}
