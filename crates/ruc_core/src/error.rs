//! Unified error types for ruc_core.
//!
//! Every fallible operation in the library reports one of the variants
//! below; no other error classes cross the API boundary. Length checks
//! are performed at API entry before any key-dependent work happens, and
//! padding/authentication failures never release partial plaintext.

use core::fmt;

/// Unified cipher error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RucError {
    /// Master key is not exactly 64 bytes.
    InvalidKeyLength,
    /// IV is not exactly 32 bytes.
    InvalidIvLength,
    /// Nonce is not exactly 16 bytes.
    InvalidNonceLength,
    /// Envelope shorter than its header plus one block (plus tag for AEAD),
    /// or its body is not a multiple of the block size.
    InvalidCiphertextLength,
    /// PKCS#7 pad byte out of range or pad bytes inconsistent.
    InvalidPadding,
    /// AEAD tag mismatch; detected before any plaintext is returned.
    AuthenticationFailed,
    /// S-box generation exhausted its retry budget for this key.
    SBoxGenerationFailed,
}

impl fmt::Display for RucError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RucError::InvalidKeyLength => write!(f, "master key must be exactly 64 bytes"),
            RucError::InvalidIvLength => write!(f, "IV must be exactly 32 bytes"),
            RucError::InvalidNonceLength => write!(f, "nonce must be exactly 16 bytes"),
            RucError::InvalidCiphertextLength => {
                write!(f, "ciphertext envelope has an invalid length")
            }
            RucError::InvalidPadding => write!(f, "padding bytes are inconsistent"),
            RucError::AuthenticationFailed => write!(f, "authentication tag verification failed"),
            RucError::SBoxGenerationFailed => {
                write!(f, "S-box generation exhausted its retry budget")
            }
        }
    }
}

impl std::error::Error for RucError {}

/// Result type using the unified [`RucError`].
pub type RucResult<T> = Result<T, RucError>;
