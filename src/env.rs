//! Process environment abstraction for testability.
//!
//! Production code uses [`Env::real()`] which reads [`std::env::vars_os`].
//! Tests use [`Env::mock()`] backed by an ordered list of pairs, so no test
//! has to mutate the real process environment with `unsafe`
//! [`std::env::set_var`] calls.

use std::ffi::OsString;

/// Process environment reader.
#[derive(Clone, Debug)]
pub struct Env {
    overrides: Option<Vec<(OsString, OsString)>>,
}

impl Env {
    /// Create an `Env` that reads from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Create an `Env` backed by explicit key-value pairs, kept in order.
    pub fn mock(
        vars: impl IntoIterator<Item = (impl Into<OsString>, impl Into<OsString>)>,
    ) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn vars(&self) -> Vec<(OsString, OsString)> {
        match &self.overrides {
            Some(vars) => vars.clone(),
            None => std::env::vars_os().collect(),
        }
    }

    /// Variables with a UTF-8 name and value as `KEY=VALUE` strings, in the
    /// order the source yields them.
    pub fn entries(&self) -> Vec<String> {
        self.vars()
            .into_iter()
            .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
                (Ok(k), Ok(v)) => Some(format!("{k}={v}")),
                _ => None,
            })
            .collect()
    }

    /// Variables whose name or value is not valid UTF-8.
    ///
    /// These cannot hold an `ssm://` reference in string form and are handed
    /// to the child untouched.
    pub fn opaque_vars(&self) -> Vec<(OsString, OsString)> {
        self.vars()
            .into_iter()
            .filter(|(key, value)| key.to_str().is_none() || value.to_str().is_none())
            .inspect(|(key, _)| {
                tracing::debug!(
                    key = %key.to_string_lossy(),
                    "passing through environment variable that is not valid UTF-8"
                );
            })
            .collect()
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::real()
    }
}
