// ABOUTME: Wire types for the provisioning HTTP contract.
// ABOUTME: Request carries the normalized key; response carries verdict, banner, and upstream.

use serde::{Deserialize, Deserializer, Serialize};

/// Body of the POST sent to the provisioning endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProvisionRequest {
    /// Canonical authorized-key line, e.g. `ssh-ed25519 AAAA...`.
    pub public_key: String,
}

/// The provisioning service's verdict for one public key.
///
/// All fields are optional on the wire; absent or `null` values decode as empty.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProvisionResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub error: String,
    #[serde(deserialize_with = "null_as_default")]
    pub banner: String,
    #[serde(deserialize_with = "null_as_default")]
    pub upstream: UpstreamSpec,
}

/// Destination account the proxy should present to.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UpstreamSpec {
    #[serde(deserialize_with = "null_as_default")]
    pub host: String,
    /// Zero means "use the configured default".
    #[serde(deserialize_with = "null_as_default")]
    pub port: u16,
    #[serde(deserialize_with = "null_as_default")]
    pub user: String,
    /// Opaque private key blob (usually OpenSSH PEM text).
    #[serde(deserialize_with = "null_as_default")]
    pub private_key: String,
}

impl std::fmt::Debug for UpstreamSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamSpec")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field(
                "private_key",
                &(!self.private_key.is_empty()).then_some("[REDACTED]"),
            )
            .finish()
    }
}

/// Treat an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
