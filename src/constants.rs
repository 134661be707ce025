//! App-wide constants.
//!
//! Centralises the tool name, the reference marker and logging defaults
//! so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "ssmenv";

/// Version string reported by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix marking an environment value as a Parameter Store reference.
pub const SSM_PREFIX: &str = "ssm://";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";
