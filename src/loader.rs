//! Environment loading.
//!
//! Produces the ordered list of raw `KEY=VALUE` assignments that the
//! resolver works on, either from the current process or from an env file.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::env::Env;

/// Errors while loading the environment.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read env file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Where the environment comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnvSource {
    /// The environment of the current process.
    #[default]
    Process,
    /// A plain-text file with one assignment per line.
    File(PathBuf),
}

/// Load the raw environment entries from `source`.
///
/// `env` is only consulted for [`EnvSource::Process`].
pub async fn load_environment(source: &EnvSource, env: &Env) -> Result<Vec<String>, LoadError> {
    match source {
        EnvSource::Process => Ok(env.entries()),
        EnvSource::File(path) => load_env_file(path).await,
    }
}

/// Read and filter an env file.
pub async fn load_env_file(path: &Path) -> Result<Vec<String>, LoadError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LoadError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
    let entries = parse_env_file(&content);
    tracing::debug!(path = %path.display(), entries = entries.len(), "loaded env file");
    Ok(entries)
}

/// Filter env file content into assignment lines.
///
/// Lines are trimmed; blank lines and `#` comments are dropped. Everything
/// else is kept verbatim, whether or not it contains `=`.
pub fn parse_env_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}
