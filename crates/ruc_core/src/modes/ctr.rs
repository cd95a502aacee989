//! Counter mode.
//!
//! The caller supplies a 16-byte nonce; the 32-byte message IV is
//! derived from it with SHAKE256. Every block starts from a fresh clone
//! of the message-initial state with the block counter folded into
//! register 0, so blocks are independent of each other and the
//! ciphertext feedback path stays unused. The envelope is
//! `nonce (16) || ciphertext (multiple of 32)`.

use crate::engine::{keystream_block, BLOCK_BYTES};
use crate::error::{RucError, RucResult};
use crate::register::Register512;
use crate::schedule::KeyMaterial;
use crate::shake::{shake256, TAG_CTR_FOLD, TAG_CTR_IV};
use crate::state::CipherState;

use super::{pkcs7_pad, pkcs7_unpad, NONCE_BYTES};

/// Encrypt `plaintext` under `material` with the given nonce.
///
/// The nonce must be unique per key. Output is the CTR envelope.
///
/// # Errors
///
/// `InvalidNonceLength` if the nonce is not 16 bytes.
pub fn encrypt(material: &KeyMaterial, nonce: &[u8], plaintext: &[u8]) -> RucResult<Vec<u8>> {
    let nonce: &[u8; NONCE_BYTES] = nonce
        .try_into()
        .map_err(|_| RucError::InvalidNonceLength)?;

    let padded = pkcs7_pad(plaintext);
    let mut envelope = Vec::with_capacity(NONCE_BYTES + padded.len());
    envelope.extend_from_slice(nonce);
    envelope.extend_from_slice(&apply_body(material, nonce, &padded)?);
    Ok(envelope)
}

/// Decrypt a CTR envelope produced by [`encrypt`].
///
/// # Errors
///
/// `InvalidCiphertextLength` if the envelope is shorter than the nonce
/// plus one block or its body is not block-aligned; `InvalidPadding` if
/// the recovered padding is inconsistent.
pub fn decrypt(material: &KeyMaterial, envelope: &[u8]) -> RucResult<Vec<u8>> {
    if envelope.len() < NONCE_BYTES + BLOCK_BYTES
        || (envelope.len() - NONCE_BYTES) % BLOCK_BYTES != 0
    {
        return Err(RucError::InvalidCiphertextLength);
    }
    let (nonce, body) = envelope.split_at(NONCE_BYTES);
    let nonce: &[u8; NONCE_BYTES] = nonce.try_into().expect("split length is fixed");

    let mut plaintext = apply_body(material, nonce, body)?;
    pkcs7_unpad(&mut plaintext)?;
    Ok(plaintext)
}

/// XOR the CTR keystream over block-aligned `data`.
///
/// Shared by encryption, decryption and the AEAD payload path; the
/// transform is its own inverse.
pub(crate) fn apply_body(
    material: &KeyMaterial,
    nonce: &[u8; NONCE_BYTES],
    data: &[u8],
) -> RucResult<Vec<u8>> {
    debug_assert_eq!(data.len() % BLOCK_BYTES, 0);

    let iv: [u8; 32] = shake256(&[nonce, TAG_CTR_IV]);
    let initial = material.mix_iv(&iv)?;

    let mut out = Vec::with_capacity(data.len());
    for (n, chunk) in data.chunks_exact(BLOCK_BYTES).enumerate() {
        let n = n as u64;
        let mut state = initial.clone();
        fold_counter(&mut state, n);
        let keystream = keystream_block(&mut state, n, material);
        for (i, &byte) in chunk.iter().enumerate() {
            out.push(byte ^ keystream[i]);
        }
    }
    Ok(out)
}

/// Fold the block counter into register 0.
///
/// The fold tag is the bare string `CTR` (not `RUC-` prefixed);
/// bit-compatibility pins it.
fn fold_counter(state: &mut CipherState, n: u64) {
    let fold: [u8; 64] = shake256(&[&n.to_be_bytes(), TAG_CTR_FOLD]);
    state.registers_mut()[0] ^= &Register512::from_be_bytes(&fold);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbox::{SboxCriteria, SBOX_RETRY_LIMIT};
    use crate::schedule::expand_key_with;

    fn material() -> KeyMaterial {
        expand_key_with(&[0x42u8; 64], &SboxCriteria::RELAXED, SBOX_RETRY_LIMIT).unwrap()
    }

    #[test]
    fn test_roundtrip_various_lengths() {
        let km = material();
        let nonce = [7u8; NONCE_BYTES];
        for len in [0usize, 1, 13, 31, 32, 33, 64, 100] {
            let plaintext: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let envelope = encrypt(&km, &nonce, &plaintext).unwrap();
            assert_eq!(envelope.len(), NONCE_BYTES + (len / 32 + 1) * 32);
            assert_eq!(decrypt(&km, &envelope).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_nonce_length_is_enforced() {
        let km = material();
        assert_eq!(
            encrypt(&km, &[0u8; 12], b"data").unwrap_err(),
            RucError::InvalidNonceLength
        );
    }

    #[test]
    fn test_short_envelope_is_rejected() {
        let km = material();
        assert_eq!(
            decrypt(&km, &[0u8; NONCE_BYTES]).unwrap_err(),
            RucError::InvalidCiphertextLength
        );
        assert_eq!(
            decrypt(&km, &[0u8; NONCE_BYTES + 31]).unwrap_err(),
            RucError::InvalidCiphertextLength
        );
    }

    #[test]
    fn test_distinct_nonces_distinct_ciphertexts() {
        let km = material();
        let plaintext = b"attack at dawn";
        let a = encrypt(&km, &[1u8; NONCE_BYTES], plaintext).unwrap();
        let b = encrypt(&km, &[2u8; NONCE_BYTES], plaintext).unwrap();
        assert_ne!(a[NONCE_BYTES..], b[NONCE_BYTES..]);
    }

    #[test]
    fn test_blocks_are_independent_of_message_tail() {
        // The first ciphertext block must not depend on later plaintext.
        let km = material();
        let nonce = [9u8; NONCE_BYTES];
        let long = encrypt(&km, &nonce, &[0xAAu8; 96]).unwrap();
        let longer = encrypt(&km, &nonce, &[0xAAu8; 128]).unwrap();
        assert_eq!(
            long[NONCE_BYTES..NONCE_BYTES + 64],
            longer[NONCE_BYTES..NONCE_BYTES + 64]
        );
    }
}
