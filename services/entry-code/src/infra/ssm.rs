use anyhow::{Context as _, anyhow};
use aws_sdk_ssm::Client;

use crate::domain::repository::SecretPort;
use crate::error::EntryCodeServiceError;

/// Resolves `SecureString` parameters from SSM Parameter Store.
#[derive(Clone)]
pub struct SsmSecretPort {
    pub client: Client,
}

impl SecretPort for SsmSecretPort {
    async fn resolve(&self, name: &str) -> Result<String, EntryCodeServiceError> {
        let response = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .with_context(|| format!("get parameter {name}"))
            .map_err(EntryCodeServiceError::SecretUnavailable)?;
        response
            .parameter
            .and_then(|p| p.value)
            .ok_or_else(|| {
                EntryCodeServiceError::SecretUnavailable(anyhow!("parameter {name} has no value"))
            })
    }
}
