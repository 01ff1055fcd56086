// ABOUTME: Public key decoding and normalization utilities.
// ABOUTME: Turns raw SSH wire-format key blobs into canonical authorized-key lines.

use crate::error::{Result, SshError};
use ssh_key::public::KeyData;
use ssh_key::{Certificate, PublicKey};

/// Algorithm name suffix shared by every OpenSSH certificate type.
const CERT_SUFFIX: &str = "-cert-v01@openssh.com";

/// Decode a public key from its SSH wire encoding.
///
/// The blob is the `string algorithm || key material` encoding a client sends
/// during `publickey` authentication. Trailing bytes are rejected, as are
/// algorithms the ssh-key crate only carries as opaque data.
///
/// # Errors
/// Returns `SshError::ParsePublicKey` for malformed input and
/// `SshError::UnsupportedKeyType` for unknown algorithms.
pub fn decode_public_key(raw: &[u8]) -> Result<PublicKey> {
    let key = PublicKey::from_bytes(raw).map_err(SshError::ParsePublicKey)?;

    if let KeyData::Other(_) = key.key_data() {
        return Err(SshError::UnsupportedKeyType(
            key.algorithm().as_str().to_string(),
        ));
    }

    Ok(key)
}

/// Parse a textual authorized-key line (`<algorithm> <base64> [comment]`).
///
/// # Errors
/// Returns `SshError::ParsePublicKey` if the line is not a valid OpenSSH public key.
pub fn parse_authorized_key(line: &str) -> Result<PublicKey> {
    PublicKey::from_openssh(line.trim()).map_err(SshError::ParsePublicKey)
}

/// Render a key as a single authorized-key line without its comment.
///
/// # Errors
/// Returns `SshError::SerializeKey` if the key cannot be encoded.
pub fn authorized_key_line(key: &PublicKey) -> Result<String> {
    // Comments are client-local decoration, not part of the key identity.
    let bare = PublicKey::new(key.key_data().clone(), "");
    let line = bare.to_openssh().map_err(SshError::SerializeKey)?;
    Ok(line.trim().to_string())
}

/// Whether a wire-format blob names an OpenSSH certificate algorithm.
pub fn is_certificate(raw: &[u8]) -> bool {
    wire_algorithm(raw).is_some_and(|name| name.ends_with(CERT_SUFFIX))
}

/// Decode the key that identifies the client: the key itself, or the
/// certified key for an OpenSSH certificate.
///
/// # Errors
/// Same as [`decode_public_key`]; malformed certificates are `ParsePublicKey`.
pub fn decode_subject_key(raw: &[u8]) -> Result<PublicKey> {
    if is_certificate(raw) {
        let cert = Certificate::from_bytes(raw).map_err(SshError::ParsePublicKey)?;
        return Ok(PublicKey::new(cert.public_key().clone(), ""));
    }
    decode_public_key(raw)
}

/// Normalize a raw wire-format public key into its canonical authorized-key line.
///
/// Semantically identical keys always normalize to the same string, so the
/// provisioning service can use the result as a stable identity. Certificates
/// are kept whole and rendered as `<cert-algorithm> <base64>`.
///
/// # Errors
/// Propagates decoding errors from [`decode_public_key`].
pub fn normalize_public_key(raw: &[u8]) -> Result<String> {
    if is_certificate(raw) {
        // The signature is not checked here; trusting the CA is the service's call.
        let cert = Certificate::from_bytes(raw).map_err(SshError::ParsePublicKey)?;
        let line = cert.to_openssh().map_err(SshError::SerializeKey)?;
        return Ok(line.trim().to_string());
    }

    let key = decode_public_key(raw)?;
    authorized_key_line(&key)
}

/// Leading `string algorithm` of an SSH wire blob.
fn wire_algorithm(raw: &[u8]) -> Option<&str> {
    let len = u32::from_be_bytes(raw.get(..4)?.try_into().ok()?) as usize;
    let end = len.checked_add(4)?;
    std::str::from_utf8(raw.get(4..end)?).ok()
}
