//! Per-invocation run configuration.
//!
//! Built once from the parsed command line and passed explicitly to the
//! loader and launcher.

use std::path::PathBuf;

use crate::loader::EnvSource;

/// Settings for one `run` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Where the environment to resolve comes from.
    pub source: EnvSource,
    /// Program followed by its arguments.
    pub command: Vec<String>,
}

impl RunConfig {
    /// Reads from `env_file` when given, otherwise from the process environment.
    pub fn new(env_file: Option<PathBuf>, command: Vec<String>) -> Self {
        let source = match env_file {
            Some(path) => EnvSource::File(path),
            None => EnvSource::Process,
        };
        Self { source, command }
    }
}
