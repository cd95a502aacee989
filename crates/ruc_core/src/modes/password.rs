//! Password-bundled authenticated envelopes.
//!
//! Wraps the AEAD with an Argon2id-derived master key and carries the
//! salt in front of the AEAD envelope:
//! `salt (16) || nonce (16) || ciphertext || tag (16)`.
//! Salt and nonce come from the operating system RNG; everything after
//! key derivation is the deterministic AEAD path.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::engine::BLOCK_BYTES;
use crate::error::{RucError, RucResult};
use crate::kdf::{derive_master_key, Argon2Profile, SALT_BYTES};
use crate::sbox::{SboxCriteria, SBOX_RETRY_LIMIT};

use super::aead::{RucAead, TAG_BYTES};
use super::NONCE_BYTES;

/// Encrypt under a password with the normative strict S-box thresholds
/// and the recommended Argon2id profile.
pub fn seal(password: &[u8], aad: &[u8], plaintext: &[u8]) -> RucResult<Vec<u8>> {
    seal_with(
        password,
        aad,
        plaintext,
        Argon2Profile::Recommended,
        &SboxCriteria::STRICT,
        SBOX_RETRY_LIMIT,
    )
}

/// Encrypt under a password with explicit profile, criteria and retry
/// budget.
pub fn seal_with(
    password: &[u8],
    aad: &[u8],
    plaintext: &[u8],
    profile: Argon2Profile,
    criteria: &SboxCriteria,
    max_retries: u16,
) -> RucResult<Vec<u8>> {
    let mut salt = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut salt);
    let mut nonce = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut nonce);

    let mut master = derive_master_key(password, &salt, profile);
    let cipher = RucAead::new_with(&master, criteria, max_retries);
    master.zeroize();
    let cipher = cipher?;

    let inner = cipher.seal(&nonce, aad, plaintext)?;
    let mut envelope = Vec::with_capacity(SALT_BYTES + inner.len());
    envelope.extend_from_slice(&salt);
    envelope.extend_from_slice(&inner);
    Ok(envelope)
}

/// Decrypt a password-bundled envelope with the strict thresholds and
/// recommended profile.
pub fn open(password: &[u8], aad: &[u8], envelope: &[u8]) -> RucResult<Vec<u8>> {
    open_with(
        password,
        aad,
        envelope,
        Argon2Profile::Recommended,
        &SboxCriteria::STRICT,
        SBOX_RETRY_LIMIT,
    )
}

/// Decrypt a password-bundled envelope with explicit profile, criteria
/// and retry budget. The profile must match the sealing side; a
/// mismatch derives a different key and fails authentication.
pub fn open_with(
    password: &[u8],
    aad: &[u8],
    envelope: &[u8],
    profile: Argon2Profile,
    criteria: &SboxCriteria,
    max_retries: u16,
) -> RucResult<Vec<u8>> {
    if envelope.len() < SALT_BYTES + NONCE_BYTES + BLOCK_BYTES + TAG_BYTES {
        return Err(RucError::InvalidCiphertextLength);
    }
    let (salt, inner) = envelope.split_at(SALT_BYTES);
    let salt: &[u8; SALT_BYTES] = salt.try_into().expect("split length is fixed");

    let mut master = derive_master_key(password, salt, profile);
    let cipher = RucAead::new_with(&master, criteria, max_retries);
    master.zeroize();
    cipher?.open(aad, inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(password: &[u8], aad: &[u8], plaintext: &[u8]) -> RucResult<Vec<u8>> {
        let envelope = seal_with(
            password,
            aad,
            plaintext,
            Argon2Profile::Interactive,
            &SboxCriteria::RELAXED,
            SBOX_RETRY_LIMIT,
        )?;
        open_with(
            password,
            aad,
            &envelope,
            Argon2Profile::Interactive,
            &SboxCriteria::RELAXED,
            SBOX_RETRY_LIMIT,
        )
    }

    #[test]
    fn test_password_roundtrip() {
        assert_eq!(
            roundtrip(b"hunter2", b"ctx", b"the cargo lands at midnight").unwrap(),
            b"the cargo lands at midnight"
        );
    }

    #[test]
    fn test_wrong_password_fails_auth() {
        let envelope = seal_with(
            b"right",
            b"",
            b"data",
            Argon2Profile::Interactive,
            &SboxCriteria::RELAXED,
            SBOX_RETRY_LIMIT,
        )
        .unwrap();
        assert_eq!(
            open_with(
                b"wrong",
                b"",
                &envelope,
                Argon2Profile::Interactive,
                &SboxCriteria::RELAXED,
                SBOX_RETRY_LIMIT,
            )
            .unwrap_err(),
            RucError::AuthenticationFailed
        );
    }

    #[test]
    fn test_envelope_carries_salt_and_framing() {
        let envelope = seal_with(
            b"pw",
            b"",
            b"",
            Argon2Profile::Interactive,
            &SboxCriteria::RELAXED,
            SBOX_RETRY_LIMIT,
        )
        .unwrap();
        assert_eq!(
            envelope.len(),
            SALT_BYTES + NONCE_BYTES + BLOCK_BYTES + TAG_BYTES
        );
    }

    #[test]
    fn test_short_envelope_is_rejected() {
        assert_eq!(
            open(b"pw", b"", &[0u8; SALT_BYTES]).unwrap_err(),
            RucError::InvalidCiphertextLength
        );
    }
}
