// ABOUTME: HTTP client for the external provisioning service.
// ABOUTME: Sends the normalized key, validates the verdict, and fills upstream defaults.

use crate::config::{PluginConfig, UpstreamDefaults};
use crate::error::{ConfigError, ProvisionError, Result};
use crate::protocol::{ProvisionRequest, ProvisionResponse, UpstreamSpec};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Upper bound on one provisioning round trip.
pub const PROVISION_TIMEOUT: Duration = Duration::from_secs(20);

/// Successful outcome of one provisioning call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    /// Upstream with defaults applied; host, user and private key are non-empty.
    pub upstream: UpstreamSpec,
    /// Welcome banner to show once, if the service sent one.
    pub banner: Option<String>,
}

/// Client for the provisioning endpoint.
#[derive(Clone)]
pub struct ProvisionClient {
    http: reqwest::Client,
    endpoint: Url,
    token: String,
    defaults: UpstreamDefaults,
}

impl ProvisionClient {
    pub fn new(config: &PluginConfig) -> std::result::Result<Self, ConfigError> {
        Self::with_timeout(config, PROVISION_TIMEOUT)
    }

    /// Like [`ProvisionClient::new`] with a custom bound on each round trip.
    pub fn with_timeout(
        config: &PluginConfig,
        timeout: Duration,
    ) -> std::result::Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
            defaults: config.defaults.clone(),
        })
    }

    /// Ask the service for an upstream account matching this public key.
    ///
    /// `raw_public_key` is the SSH wire encoding presented by the client.
    /// Failures are never retried here.
    pub async fn provision(&self, raw_public_key: &[u8]) -> Result<Provisioned> {
        let public_key = piper_ssh::normalize_public_key(raw_public_key)?;

        let body = serde_json::to_vec(&ProvisionRequest { public_key })
            .map_err(ProvisionError::Encode)?;

        let resp = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.token)
            .body(body)
            .send()
            .await
            .map_err(ProvisionError::Transport)?;

        let status = resp.status();
        let payload = resp.bytes().await.map_err(ProvisionError::Transport)?;
        debug!(status = status.as_u16(), bytes = payload.len(), "Provision response received");

        // Decoded before the status check: a non-JSON error page is a decode failure.
        let response = serde_json::from_slice::<Option<ProvisionResponse>>(&payload)
            .map_err(ProvisionError::Decode)?
            .unwrap_or_default();

        evaluate(status.as_u16(), response, &self.defaults)
    }
}

/// Turn a decoded response into a verdict.
fn evaluate(
    status: u16,
    response: ProvisionResponse,
    defaults: &UpstreamDefaults,
) -> Result<Provisioned> {
    if status != 200 || !response.success {
        let message = if response.error.is_empty() {
            format!("provision failed with status {status}")
        } else {
            response.error
        };
        return Err(ProvisionError::Denied { status, message });
    }

    let upstream = apply_defaults(response.upstream, defaults);

    let missing = missing_fields(&upstream);
    if !missing.is_empty() {
        return Err(ProvisionError::IncompleteUpstream { missing });
    }

    let banner = Some(response.banner).filter(|b| !b.is_empty());
    Ok(Provisioned { upstream, banner })
}

/// Fill empty host/user and zero port. The private key has no default.
fn apply_defaults(mut upstream: UpstreamSpec, defaults: &UpstreamDefaults) -> UpstreamSpec {
    if upstream.host.is_empty() {
        upstream.host = defaults.host.clone();
    }
    if upstream.port == 0 {
        upstream.port = defaults.port;
    }
    if upstream.user.is_empty() {
        upstream.user = defaults.user.clone();
    }
    upstream
}

fn missing_fields(upstream: &UpstreamSpec) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if upstream.host.is_empty() {
        missing.push("host");
    }
    if upstream.user.is_empty() {
        missing.push("user");
    }
    if upstream.private_key.is_empty() {
        missing.push("private_key");
    }
    missing
}
