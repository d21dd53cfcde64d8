//! HTTP client for the ESC REST API.
//!
//! ## Endpoints
//!
//! - `POST   {base}/environments/{org}/{env}/open?duration=2h` opens an environment
//! - `GET    {base}/environments/{org}/{env}/open/{id}?property={key}` reads one property
//! - `GET    {base}/environments/{org}/{env}/open/{id}` reads the whole environment
//! - `PATCH  {base}/environments/{org}/{env}` replaces the definition (YAML body)
//!
//! Every request carries `Authorization: token <access token>`.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::api::{
    EnvironmentApi, EnvironmentDefinition, EnvironmentDiagnostics, EnvironmentRef, OpenEnvironment,
};
use super::error::ApiError;
use super::value::{EscValue, PropertyMap, PropertyValue};
use crate::config::EscProviderConfig;
use crate::errors::{Error, Result};
use crate::secrets::SecretString;

/// Default ESC API base URL.
pub const DEFAULT_API_URL: &str = "https://api.pulumi.com/api/esc";

/// Lifetime requested for open sessions.
const OPEN_DURATION: &str = "2h";

const YAML_CONTENT_TYPE: &str = "application/x-yaml";

/// Response of reading a whole open environment.
#[derive(Debug, Deserialize)]
struct OpenedEnvironment {
    #[serde(default)]
    properties: BTreeMap<String, EscValue>,
}

/// Error body returned by the ESC API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// [`EnvironmentApi`] backed by the ESC REST API.
#[derive(Debug, Clone)]
pub struct HttpEnvironmentApi {
    client: Client,
    base_url: Url,
    access_token: SecretString,
}

impl HttpEnvironmentApi {
    /// Create a client for `base_url` authenticating with `access_token`.
    pub fn new(base_url: &str, access_token: SecretString, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::config(format!("Invalid ESC API URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!("ESC API URL '{}' cannot be a base URL", base_url)));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url, access_token })
    }

    /// Create a client from provider configuration.
    pub fn from_config(config: &EscProviderConfig) -> Result<Self> {
        Self::new(&config.api_url, config.access_token.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/environments/{org}/{env}/{tail...}` with every segment percent-encoded.
    fn environment_url(&self, env: &EnvironmentRef, tail: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects URLs that cannot be a base, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("environments")
                .push(&env.organization)
                .push(&env.environment)
                .extend(tail);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(method = %method, url = %url, "ESC API request");
        self.client
            .request(method, url)
            .header(AUTHORIZATION, format!("token {}", self.access_token.expose_secret()))
            .header(ACCEPT, "application/json")
    }

    /// Map non-success responses to [`ApiError`].
    async fn check_status(response: Response, resource: &str) -> std::result::Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), resource, "ESC API request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ApiError::Unauthorized { status: status.as_u16() }
            }
            StatusCode::NOT_FOUND => ApiError::not_found(resource),
            _ => {
                let message = serde_json::from_str::<ErrorBody>(&body)
                    .map(|e| e.message)
                    .unwrap_or(body);
                ApiError::Status { status: status.as_u16(), message }
            }
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> std::result::Result<T, ApiError> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(ApiError::Decode)
    }
}

#[async_trait]
impl EnvironmentApi for HttpEnvironmentApi {
    async fn open_environment(
        &self,
        env: &EnvironmentRef,
    ) -> std::result::Result<OpenEnvironment, ApiError> {
        let mut url = self.environment_url(env, &["open"]);
        url.query_pairs_mut().append_pair("duration", OPEN_DURATION);

        let response = self.request(Method::POST, url).send().await?;
        let response = Self::check_status(response, &env.to_string()).await?;
        let opened: OpenEnvironment = Self::decode(response).await?;

        debug!(environment = %env, diagnostics = opened.diagnostics.len(), "Opened ESC environment");
        Ok(opened)
    }

    async fn read_environment_property(
        &self,
        env: &EnvironmentRef,
        open_id: &str,
        property: &str,
    ) -> std::result::Result<EscValue, ApiError> {
        let mut url = self.environment_url(env, &["open", open_id]);
        url.query_pairs_mut().append_pair("property", property);

        let response = self.request(Method::GET, url).send().await?;
        let response = Self::check_status(response, &format!("{}/{}", env, property)).await?;
        Self::decode(response).await
    }

    async fn open_and_read_environment(
        &self,
        env: &EnvironmentRef,
    ) -> std::result::Result<(OpenEnvironment, PropertyMap), ApiError> {
        let opened = self.open_environment(env).await?;
        let url = self.environment_url(env, &["open", &opened.id]);

        let response = self.request(Method::GET, url).send().await?;
        let response = Self::check_status(response, &env.to_string()).await?;
        let environment: OpenedEnvironment = Self::decode(response).await?;

        let document = environment
            .properties
            .into_iter()
            .map(|(key, value)| (key, PropertyValue::from(value).into_plain()))
            .collect::<PropertyMap>();

        debug!(environment = %env, properties = document.len(), "Read ESC environment");
        Ok((opened, document))
    }

    async fn update_environment(
        &self,
        env: &EnvironmentRef,
        definition: &EnvironmentDefinition,
    ) -> std::result::Result<EnvironmentDiagnostics, ApiError> {
        let body = serde_yaml::to_string(definition).map_err(ApiError::Encode)?;
        let url = self.environment_url(env, &[]);

        let response = self
            .request(Method::PATCH, url)
            .header(CONTENT_TYPE, YAML_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        let response = Self::check_status(response, &env.to_string()).await?;

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(EnvironmentDiagnostics::default());
        }
        serde_json::from_slice(&body).map_err(ApiError::Decode)
    }
}
