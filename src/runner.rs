//! The `run` sequence: load the environment, resolve references, launch.
//!
//! The binary only adds client construction and the Ctrl-C listener on top.

use thiserror::Error;

use crate::cancel::CancellationToken;
use crate::config::RunConfig;
use crate::env::Env;
use crate::launcher::{self, LaunchError};
use crate::loader::{self, EnvSource, LoadError};
use crate::resolver::{self, ResolutionErrors};
use crate::store::ParameterStore;

/// Errors that stop a run before or while the child runs.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("loading environment")]
    Load(#[source] LoadError),

    #[error("{count} parameter reference(s) could not be resolved")]
    Resolve {
        count: usize,
        source: ResolutionErrors,
    },

    #[error("interrupted before the command was started")]
    Cancelled,

    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// Resolve the configured environment and run the command with it.
///
/// Returns the exit code to report. The command is never started when any
/// reference fails to resolve or when `cancel` fired before launch.
pub async fn run(
    config: &RunConfig,
    env: &Env,
    store: &dyn ParameterStore,
    cancel: &CancellationToken,
) -> Result<i32, RunError> {
    let environ = loader::load_environment(&config.source, env)
        .await
        .map_err(RunError::Load)?;

    let entries = resolver::resolve(&environ, store, cancel)
        .await
        .into_result()
        .map_err(|errors| RunError::Resolve {
            count: errors.0.len(),
            source: errors,
        })?;

    let opaque = match config.source {
        EnvSource::Process => env.opaque_vars(),
        EnvSource::File(_) => Vec::new(),
    };

    if cancel.is_cancelled() {
        return Err(RunError::Cancelled);
    }

    let status = launcher::launch(&entries, &opaque, &config.command).await?;
    Ok(launcher::exit_code(status))
}
