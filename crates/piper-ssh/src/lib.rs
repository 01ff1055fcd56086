// ABOUTME: Library root for piper-ssh.
// ABOUTME: Exports key normalization, fingerprinting, and error types.

pub mod error;
pub mod fingerprint;
pub mod key;

pub use error::{Result, SshError};
pub use fingerprint::compute_fingerprint;
pub use key::{
    authorized_key_line, decode_public_key, decode_subject_key, is_certificate,
    normalize_public_key, parse_authorized_key,
};
