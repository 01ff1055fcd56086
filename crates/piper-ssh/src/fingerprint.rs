// ABOUTME: SSH public key fingerprint computation.
// ABOUTME: Produces OpenSSH-style SHA256 fingerprints for identifying keys in logs.

use crate::error::{Result, SshError};
use base64::Engine;
use sha2::{Digest, Sha256};
use ssh_key::PublicKey;

/// Compute the OpenSSH SHA256 fingerprint of a public key.
///
/// Hashes the key's SSH wire encoding and renders it the way `ssh-keygen -l`
/// does: `SHA256:` followed by unpadded base64.
///
/// # Errors
/// Returns `SshError::SerializeKey` if the key cannot be encoded.
pub fn compute_fingerprint(public_key: &PublicKey) -> Result<String> {
    let wire_data = public_key.to_bytes().map_err(SshError::SerializeKey)?;

    let mut hasher = Sha256::new();
    hasher.update(&wire_data);
    let hash = hasher.finalize();

    Ok(format!(
        "SHA256:{}",
        base64::engine::general_purpose::STANDARD_NO_PAD.encode(hash)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::parse_authorized_key;
    use crate::key::tests::{ED25519_BARE, ED25519_LINE};

    #[test]
    fn test_known_key_fingerprint() {
        // Matches `ssh-keygen -lf` for the fixture key.
        let key = parse_authorized_key(ED25519_LINE).expect("should parse");
        let fp = compute_fingerprint(&key).expect("should compute fingerprint");
        assert_eq!(fp, "SHA256:rIEMUI4q/gnGLeIlXOzdiQkLNUSAPFburK9JqjXJa4o");
    }

    #[test]
    fn test_fingerprint_ignores_comment() {
        let with_comment = parse_authorized_key(ED25519_LINE).expect("should parse");
        let bare = parse_authorized_key(ED25519_BARE).expect("should parse");

        assert_eq!(
            compute_fingerprint(&with_comment).unwrap(),
            compute_fingerprint(&bare).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_format() {
        let key = parse_authorized_key(ED25519_BARE).expect("should parse");
        let fp = compute_fingerprint(&key).expect("should compute fingerprint");

        assert!(fp.starts_with("SHA256:"));
        // 32-byte digest, unpadded base64
        assert_eq!(fp.len(), "SHA256:".len() + 43);
        assert!(!fp.ends_with('='));
    }
}
