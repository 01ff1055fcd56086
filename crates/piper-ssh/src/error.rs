// ABOUTME: Error types for public key operations using thiserror.
// ABOUTME: Provides typed errors for key decoding, algorithm checks, and serialization.

use thiserror::Error;

/// Errors that can occur while handling client public keys.
#[derive(Error, Debug)]
pub enum SshError {
    /// The presented bytes are not a well-formed public key.
    #[error("failed to parse public key: {0}")]
    ParsePublicKey(#[source] ssh_key::Error),

    /// The key decoded, but its algorithm is not one we accept.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// Failed to serialize a key.
    #[error("failed to serialize key: {0}")]
    SerializeKey(#[source] ssh_key::Error),
}

/// Result type alias using SshError.
pub type Result<T> = std::result::Result<T, SshError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_parse_public_key_error_display() {
        let err = SshError::ParsePublicKey(ssh_key::Error::AlgorithmUnknown);
        let display = format!("{}", err);
        assert!(display.contains("failed to parse public key"));
    }

    #[test]
    fn test_unsupported_key_type_error_display() {
        let err = SshError::UnsupportedKeyType("ssh-foo@example.com".to_string());
        let display = format!("{}", err);
        assert!(display.contains("unsupported key type"));
        assert!(display.contains("ssh-foo@example.com"));
    }

    #[test]
    fn test_serialize_key_error_display() {
        let err = SshError::SerializeKey(ssh_key::Error::AlgorithmUnknown);
        assert!(format!("{}", err).contains("failed to serialize key"));
    }

    #[test]
    fn test_error_source_parse_public_key() {
        let err = SshError::ParsePublicKey(ssh_key::Error::AlgorithmUnknown);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_no_source_unsupported_key_type() {
        let err = SshError::UnsupportedKeyType("rsa".to_string());
        assert!(err.source().is_none());
    }
}
