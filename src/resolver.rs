//! Resolution of `ssm://` references in an environment list.
//!
//! Every entry whose value starts with [`SSM_PREFIX`] is replaced by the
//! parameter's live value. Failed lookups are collected rather than
//! aborting the pass, so a single run reports every broken reference.

use std::fmt;

use thiserror::Error;

use crate::cancel::CancellationToken;
use crate::constants::SSM_PREFIX;
use crate::store::{ParameterStore, StoreError};

/// A single failed lookup.
#[derive(Error, Debug)]
#[error("resolving {value}: {source}")]
pub struct ResolveError {
    /// The original `ssm://...` value.
    pub value: String,
    pub source: StoreError,
}

/// Every failed lookup of one resolution pass.
#[derive(Debug)]
pub struct ResolutionErrors(pub Vec<ResolveError>);

impl fmt::Display for ResolutionErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ResolutionErrors {}

/// Outcome of [`resolve`].
#[derive(Debug, Default)]
pub struct Resolution {
    /// Resolved entries in input order. Entries whose lookup failed are absent.
    pub entries: Vec<String>,
    /// One error per failed lookup, in input order.
    pub errors: Vec<ResolveError>,
}

impl Resolution {
    /// `Ok` with the entries if every lookup succeeded.
    pub fn into_result(self) -> Result<Vec<String>, ResolutionErrors> {
        if self.errors.is_empty() {
            Ok(self.entries)
        } else {
            Err(ResolutionErrors(self.errors))
        }
    }
}

/// The parameter name referenced by `value`, if it carries the marker prefix.
pub fn parameter_name(value: &str) -> Option<&str> {
    value.strip_prefix(SSM_PREFIX)
}

/// Resolve all `ssm://` references in `entries`, one lookup at a time.
///
/// Entries without `=` pass through unchanged. Lookups request decryption.
/// Once `cancel` fires, the in-flight lookup and every later one fail with
/// [`StoreError::Cancelled`].
pub async fn resolve<S>(entries: &[String], store: &S, cancel: &CancellationToken) -> Resolution
where
    S: ParameterStore + ?Sized,
{
    let mut resolution = Resolution {
        entries: Vec::with_capacity(entries.len()),
        errors: Vec::new(),
    };

    for entry in entries {
        let Some((key, value)) = entry.split_once('=') else {
            resolution.entries.push(entry.clone());
            continue;
        };

        let Some(name) = parameter_name(value) else {
            resolution.entries.push(entry.clone());
            continue;
        };

        tracing::debug!(key, parameter = name, "resolving parameter");
        match lookup(store, name, cancel).await {
            Ok(resolved) => resolution.entries.push(format!("{key}={resolved}")),
            Err(source) => {
                tracing::debug!(key, parameter = name, error = %source, "lookup failed");
                resolution.errors.push(ResolveError {
                    value: value.to_string(),
                    source,
                });
            }
        }
    }

    resolution
}

async fn lookup<S>(store: &S, name: &str, cancel: &CancellationToken) -> Result<String, StoreError>
where
    S: ParameterStore + ?Sized,
{
    if cancel.is_cancelled() {
        return Err(StoreError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StoreError::Cancelled),
        result = store.get_parameter(name, true) => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store; names missing from the map fail with `NotFound`.
    #[derive(Default)]
    struct MapStore {
        values: HashMap<String, String>,
        calls: Mutex<Vec<(String, bool)>>,
    }

    impl MapStore {
        fn with(values: &[(&str, &str)]) -> Self {
            Self {
                values: values
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: Mutex::default(),
            }
        }

        fn calls(&self) -> Vec<(String, bool)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ParameterStore for MapStore {
        async fn get_parameter(&self, name: &str, with_decryption: bool) -> Result<String, StoreError> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), with_decryption));
            self.values
                .get(name)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(name.to_string()))
        }
    }

    /// Store whose lookups never complete.
    struct PendingStore;

    #[async_trait]
    impl ParameterStore for PendingStore {
        async fn get_parameter(&self, _name: &str, _with_decryption: bool) -> Result<String, StoreError> {
            std::future::pending().await
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn partial_failure_scenario() {
        let store = MapStore::with(&[("db/pass", "secret")]);
        let input = strings(&["A=1", "B=ssm://db/pass", "C=ssm://missing"]);

        let resolution = resolve(&input, &store, &CancellationToken::new()).await;
        assert_eq!(resolution.entries, vec!["A=1", "B=secret"]);
        assert_eq!(resolution.errors.len(), 1);

        let err = resolution.into_result().unwrap_err().to_string();
        assert!(err.contains("ssm://missing"), "got: {err}");
        assert!(err.contains("not found"), "got: {err}");
    }

    #[tokio::test]
    async fn no_markers_pass_through() {
        let store = MapStore::default();
        let input = strings(&["FOO=bar"]);

        let entries = resolve(&input, &store, &CancellationToken::new())
            .await
            .into_result()
            .unwrap();
        assert_eq!(entries, vec!["FOO=bar"]);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn entries_without_equals_keep_position() {
        let store = MapStore::with(&[("x", "1")]);
        let input = strings(&["FIRST", "A=ssm://x", "MIDDLE", "B=2", "LAST"]);

        let entries = resolve(&input, &store, &CancellationToken::new())
            .await
            .into_result()
            .unwrap();
        assert_eq!(entries, vec!["FIRST", "A=1", "MIDDLE", "B=2", "LAST"]);
    }

    #[tokio::test]
    async fn unmarked_values_are_bit_identical() {
        let store = MapStore::default();
        let input = strings(&[
            "EMPTY=",
            "=leading",
            "EQ=a=b=c",
            "SPACES= padded ",
            "ALMOST=ssm:/x",
            "UPPER=SSM://x",
            "INNER=x ssm://y",
        ]);

        let entries = resolve(&input, &store, &CancellationToken::new())
            .await
            .into_result()
            .unwrap();
        assert_eq!(entries, input);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn lookups_request_decryption_with_stripped_name() {
        let store = MapStore::with(&[("/prod/api/key", "k"), ("a=b", "v")]);
        let input = strings(&["KEY=ssm:///prod/api/key", "ODD=ssm://a=b"]);

        let entries = resolve(&input, &store, &CancellationToken::new())
            .await
            .into_result()
            .unwrap();
        assert_eq!(entries, vec!["KEY=k", "ODD=v"]);
        assert_eq!(
            store.calls(),
            vec![("/prod/api/key".to_string(), true), ("a=b".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn resolved_value_may_contain_equals_and_newlines() {
        let store = MapStore::with(&[("cert", "line1\nline2=x")]);
        let input = strings(&["CERT=ssm://cert"]);

        let entries = resolve(&input, &store, &CancellationToken::new())
            .await
            .into_result()
            .unwrap();
        assert_eq!(entries, vec!["CERT=line1\nline2=x"]);
    }

    #[tokio::test]
    async fn every_failure_is_reported() {
        let store = MapStore::with(&[("ok", "fine")]);
        let input = strings(&["A=ssm://one", "B=ssm://ok", "C=ssm://two"]);

        let resolution = resolve(&input, &store, &CancellationToken::new()).await;
        assert_eq!(resolution.entries, vec!["B=fine"]);

        let values: Vec<_> = resolution.errors.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["ssm://one", "ssm://two"]);

        let message = resolution.into_result().unwrap_err().to_string();
        assert_eq!(
            message,
            "resolving ssm://one: parameter not found: one\n\
             resolving ssm://two: parameter not found: two"
        );
    }

    #[tokio::test]
    async fn duplicate_keys_pass_through() {
        let store = MapStore::with(&[("x", "resolved")]);
        let input = strings(&["K=1", "K=ssm://x"]);

        let entries = resolve(&input, &store, &CancellationToken::new())
            .await
            .into_result()
            .unwrap();
        assert_eq!(entries, vec!["K=1", "K=resolved"]);
    }

    #[tokio::test]
    async fn cancelled_token_fails_marked_entries_only() {
        let store = MapStore::with(&[("x", "1")]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let input = strings(&["A=plain", "B=ssm://x"]);

        let resolution = resolve(&input, &store, &cancel).await;
        assert_eq!(resolution.entries, vec!["A=plain"]);
        assert_eq!(resolution.errors.len(), 1);
        assert!(matches!(resolution.errors[0].source, StoreError::Cancelled));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn cancel_interrupts_in_flight_lookup() {
        let cancel = CancellationToken::new();
        let input = strings(&["A=ssm://slow", "B=ssm://never"]);

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                cancel.cancel();
            })
        };

        let resolution = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            resolve(&input, &PendingStore, &cancel),
        )
        .await
        .expect("resolution should stop after cancel");
        canceller.await.unwrap();

        assert!(resolution.entries.is_empty());
        assert_eq!(resolution.errors.len(), 2);
        assert!(
            resolution
                .errors
                .iter()
                .all(|e| matches!(e.source, StoreError::Cancelled))
        );
    }

    #[test]
    fn parameter_name_strips_prefix() {
        assert_eq!(parameter_name("ssm://db/pass"), Some("db/pass"));
        assert_eq!(parameter_name("ssm://"), Some(""));
        assert_eq!(parameter_name("plain"), None);
    }

    #[test]
    fn empty_resolution_is_ok() {
        assert!(Resolution::default().into_result().unwrap().is_empty());
    }
}
