//! Compile-time build metadata surfaced in the startup log.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short commit id read from `.git` at build time, or `unknown`.
pub const GIT_COMMIT: &str = env!("ENTRYPOINT_BUILD_GIT_HASH");

/// Build time from `SOURCE_DATE_EPOCH` (UTC, RFC 3339), or `unknown`.
pub const BUILD_TIMESTAMP: &str = env!("ENTRYPOINT_BUILD_TIMESTAMP");

/// Render the metadata attached to the `entrypoint starting` event.
pub fn startup_metadata_line() -> String {
    format!("v{VERSION} ({GIT_COMMIT}, built {BUILD_TIMESTAMP})")
}
