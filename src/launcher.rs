//! Child process launch.
//!
//! Runs the requested command with exactly the resolved environment and the
//! parent's stdio streams, then waits for it. Uses `tokio::process::Command`.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;

/// Errors while running the child command.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("no command given")]
    EmptyCommand,

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("failed to wait for {program}: {source}")]
    Wait {
        program: String,
        source: std::io::Error,
    },
}

/// Split resolved entries into `(key, value)` pairs for the child.
///
/// Entries without `=` have no variable form and are left out.
pub fn child_env(entries: &[String]) -> Vec<(&str, &str)> {
    entries
        .iter()
        .filter_map(|entry| {
            let pair = entry.split_once('=');
            if pair.is_none() {
                tracing::debug!(entry = %entry, "skipping environment entry without '='");
            }
            pair
        })
        .collect()
}

/// Run `command` (program followed by its arguments) with `entries` plus the
/// untouched `opaque` variables as its entire environment, and wait for it
/// to exit.
pub async fn launch(
    entries: &[String],
    opaque: &[(OsString, OsString)],
    command: &[String],
) -> Result<ExitStatus, LaunchError> {
    let (program, args) = command.split_first().ok_or(LaunchError::EmptyCommand)?;

    // Look the program up on our own PATH: the child's environment may not have one.
    let executable = which::which(program).unwrap_or_else(|_| PathBuf::from(program));

    tracing::debug!(program = %executable.display(), args = args.len(), "starting child process");
    let mut child = tokio::process::Command::new(&executable)
        .args(args)
        .env_clear()
        .envs(child_env(entries))
        .envs(opaque.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| LaunchError::Spawn {
            program: program.clone(),
            source: e,
        })?;

    let status = child.wait().await.map_err(|e| LaunchError::Wait {
        program: program.clone(),
        source: e,
    })?;
    tracing::debug!(%status, "child process exited");
    Ok(status)
}

/// Exit code to report for a finished child.
///
/// On Unix a child killed by a signal maps to `128 + signal`, as shells do.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
