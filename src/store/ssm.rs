//! AWS Systems Manager Parameter Store client.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_ssm::Client;
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use super::{ParameterStore, StoreError};

/// Error code returned by SSM when the named parameter does not exist.
const PARAMETER_NOT_FOUND: &str = "ParameterNotFound";

/// [`ParameterStore`] backed by `aws-sdk-ssm`.
#[derive(Clone, Debug)]
pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    /// Build a client from the SDK's default discovery chain
    /// (environment, shared config/credentials files, instance metadata).
    pub async fn load() -> Result<Self, StoreError> {
        let shared_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::from_sdk_config(&shared_config)
    }

    /// Build a client from an already loaded SDK config.
    ///
    /// Fails when no region could be discovered, since every request would
    /// fail the same way.
    pub fn from_sdk_config(config: &SdkConfig) -> Result<Self, StoreError> {
        let Some(region) = config.region() else {
            return Err(StoreError::NotConfigured(
                "no AWS region found; set AWS_REGION or configure a profile".to_string(),
            ));
        };
        tracing::debug!(%region, "initialised SSM client");

        Ok(Self {
            client: Client::new(config),
        })
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_parameter(&self, name: &str, with_decryption: bool) -> Result<String, StoreError> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(with_decryption)
            .send()
            .await
            .map_err(|err| {
                if is_not_found(&err) {
                    StoreError::NotFound(name.to_string())
                } else {
                    StoreError::Api(DisplayErrorContext(&err).to_string())
                }
            })?;

        output
            .parameter()
            .and_then(|p| p.value())
            .map(String::from)
            .ok_or_else(|| StoreError::MissingValue(name.to_string()))
    }
}

fn is_not_found<E>(err: &SdkError<E>) -> bool
where
    E: ProvideErrorMetadata,
{
    if let SdkError::ServiceError(context) = err {
        return context.err().code() == Some(PARAMETER_NOT_FOUND);
    }
    false
}
