// ABOUTME: Error types for the piper provisioning plugin.
// ABOUTME: Classifies key, transport, decode, denial, and incomplete-upstream failures.

use thiserror::Error;

/// Reasons a single public-key provisioning attempt can fail.
///
/// Every variant is terminal for the attempt: the host treats it as
/// "this key failed" and moves on to the client's next key.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The client's public key could not be parsed.
    #[error(transparent)]
    Key(#[from] piper_ssh::SshError),

    /// The provisioning request could not be serialized.
    #[error("failed to encode provision request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The provisioning service could not be reached or timed out.
    #[error("provisioning service unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    /// The provisioning response body was not valid JSON of the expected shape.
    #[error("malformed provision response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The service refused to provision an account for this key.
    #[error("{message}")]
    Denied { status: u16, message: String },

    /// The service accepted the key but required upstream fields are missing.
    #[error("missing upstream parameters in provision response: {}", missing.join(", "))]
    IncompleteUpstream { missing: Vec<&'static str> },
}

/// Reasons the process configuration can be rejected at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid provisioning endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("provisioning endpoint must use http or https, got {0:?}")]
    UnsupportedScheme(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_denied_displays_service_message_verbatim() {
        let err = ProvisionError::Denied {
            status: 200,
            message: "quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn test_incomplete_upstream_lists_fields() {
        let err = ProvisionError::IncompleteUpstream {
            missing: vec!["user", "private_key"],
        };
        let display = err.to_string();
        assert!(display.contains("missing upstream parameters"));
        assert!(display.contains("user, private_key"));
    }

    #[test]
    fn test_key_error_is_transparent() {
        let err = ProvisionError::from(piper_ssh::SshError::UnsupportedKeyType(
            "ssh-foo".to_string(),
        ));
        assert!(err.to_string().contains("unsupported key type: ssh-foo"));
    }

    #[test]
    fn test_decode_error_has_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ProvisionError::Decode(json_err);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("malformed provision response"));
    }

    #[test]
    fn test_config_empty_display() {
        assert_eq!(ConfigError::Empty("token").to_string(), "token must not be empty");
    }
}
