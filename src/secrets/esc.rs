//! ESC-backed [`SecretsClient`].
//!
//! Reads resolve properties of an opened environment. Pushes are a read-merge-write of the whole
//! environment document: the current document is fetched, the new value is merged in at its
//! (possibly dotted) key, and the result replaces the definition.
//!
//! Pushes are not atomic. Two concurrent pushes to the same environment can lose an update, so
//! callers must serialize them.

use async_trait::async_trait;
use tracing::{debug, info, warn, Instrument};

use super::client::{
    PushRemoteRef, PushSecretData, RemoteRef, Secret, SecretFind, SecretMap, SecretsClient,
    ValidationResult,
};
use super::error::{Result, SecretsError, UnsupportedOperation};
use crate::config::EscProviderConfig;
use crate::esc::{
    merge_maps, unwrap_one_layer, EnvironmentApi, EnvironmentDefinition, EnvironmentRef,
    HttpEnvironmentApi, PropertyMap, PropertyValue,
};

/// Secrets provider backed by one ESC environment.
#[derive(Debug, Clone)]
pub struct EscSecretsClient<A = HttpEnvironmentApi> {
    api: A,
    environment: EnvironmentRef,
}

impl<A: EnvironmentApi> EscSecretsClient<A> {
    pub fn new(api: A, environment: EnvironmentRef) -> Self {
        Self { api, environment }
    }

    pub fn environment(&self) -> &EnvironmentRef {
        &self.environment
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Convert one member of a map-valued property.
    ///
    /// Members arrive wrapped, so the bytes of the member are decoded as a wrapper and the inner
    /// payload is converted.
    fn member_bytes(key: &str, member: &PropertyValue) -> Result<Vec<u8>> {
        let member_error = |source| SecretsError::MemberValue { key: key.to_string(), source };
        let encoded = member.to_bytes().map_err(member_error)?;
        let inner = unwrap_one_layer(&encoded).map_err(member_error)?;
        inner.value.to_bytes().map_err(member_error)
    }
}

impl EscSecretsClient<HttpEnvironmentApi> {
    /// Build a provider talking to the ESC REST API.
    pub fn from_config(config: &EscProviderConfig) -> Result<Self> {
        config.validate()?;
        let api = HttpEnvironmentApi::from_config(config)?;
        let environment = config.environment_ref();

        info!(
            api_url = %config.api_url,
            environment = %environment,
            timeout_seconds = config.timeout_seconds,
            "Initialized ESC secrets provider"
        );

        Ok(Self::new(api, environment))
    }
}

#[async_trait]
impl<A: EnvironmentApi> SecretsClient for EscSecretsClient<A> {
    async fn get_secret(&self, remote_ref: &RemoteRef) -> Result<Vec<u8>> {
        let span = crate::secrets_span!("get_secret", &self.environment);

        async {
            let opened = self.api.open_environment(&self.environment).await?;
            let value = self
                .api
                .read_environment_property(&self.environment, &opened.id, &remote_ref.key)
                .await?;

            let bytes = value.value.to_bytes()?;
            debug!(key = %remote_ref.key, kind = value.value.kind(), "Read secret");
            Ok::<_, SecretsError>(bytes)
        }
        .instrument(span)
        .await
    }

    async fn get_secret_map(&self, remote_ref: &RemoteRef) -> Result<SecretMap> {
        let span = crate::secrets_span!("get_secret_map", &self.environment);

        async {
            let opened = self.api.open_environment(&self.environment).await?;
            let value = self
                .api
                .read_environment_property(&self.environment, &opened.id, &remote_ref.key)
                .await?;

            let members = value.value.as_map().ok_or_else(|| SecretsError::InvalidShape {
                key: remote_ref.key.clone(),
                found: value.value.kind(),
            })?;

            let secrets = members
                .iter()
                .map(|(key, member)| Self::member_bytes(key, member).map(|bytes| (key.clone(), bytes)))
                .collect::<Result<SecretMap>>()?;

            debug!(key = %remote_ref.key, members = secrets.len(), "Read secret map");
            Ok::<_, SecretsError>(secrets)
        }
        .instrument(span)
        .await
    }

    async fn get_all_secrets(&self, _find: &SecretFind) -> Result<SecretMap> {
        Err(SecretsError::unsupported(UnsupportedOperation::GetAllSecrets))
    }

    async fn push_secret(&self, secret: &Secret, data: &PushSecretData) -> Result<()> {
        let span = crate::secrets_span!("push_secret", &self.environment);

        async {
            let raw = secret
                .data
                .get(&data.secret_key)
                .ok_or_else(|| SecretsError::missing_secret_key(&secret.name, &data.secret_key))?;
            let value = std::str::from_utf8(raw).map_err(|_| {
                SecretsError::invalid_value(format!(
                    "data key '{}' of secret '{}' is not valid UTF-8",
                    data.secret_key, secret.name
                ))
            })?;

            let (_, document) = self
                .api
                .open_and_read_environment(&self.environment)
                .await
                .map_err(SecretsError::ReadEnvironment)?;

            let overlay = PropertyMap::from([(data.remote_key.clone(), PropertyValue::from(value))]);
            let merged = merge_maps(&document, &overlay);

            let diagnostics = self
                .api
                .update_environment(&self.environment, &EnvironmentDefinition::new(merged))
                .await
                .map_err(SecretsError::PushSecret)?;

            for diagnostic in &diagnostics.diagnostics {
                warn!(
                    summary = %diagnostic.summary,
                    path = diagnostic.path.as_deref().unwrap_or(""),
                    "ESC reported a diagnostic for the updated environment"
                );
            }

            info!(remote_key = %data.remote_key, secret = %secret.name, "Pushed secret");
            Ok::<_, SecretsError>(())
        }
        .instrument(span)
        .await
    }

    async fn secret_exists(&self, _remote_ref: &PushRemoteRef) -> Result<bool> {
        Err(SecretsError::unsupported(UnsupportedOperation::SecretExists))
    }

    async fn delete_secret(&self, _remote_ref: &PushRemoteRef) -> Result<()> {
        Err(SecretsError::unsupported(UnsupportedOperation::DeleteSecret))
    }

    fn validate(&self) -> Result<ValidationResult> {
        Ok(ValidationResult::Ready)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
