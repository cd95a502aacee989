//! Cipher block chaining.
//!
//! The caller supplies the 32-byte IV. Plaintext blocks are XOR-ed with
//! the previous ciphertext block (the IV for block 0) before entering
//! the engine, and the engine's ciphertext feedback keeps mutating one
//! working state across the whole message, which makes the mode
//! inherently sequential. The envelope is `IV (32) || ciphertext`.

use crate::engine::{decrypt_block, encrypt_block, BLOCK_BYTES};
use crate::error::{RucError, RucResult};
use crate::schedule::KeyMaterial;
use crate::state::IV_BYTES;

use super::{pkcs7_pad, pkcs7_unpad};

/// Encrypt `plaintext` under `material` with the given 32-byte IV.
///
/// # Errors
///
/// `InvalidIvLength` if the IV is not 32 bytes.
pub fn encrypt(material: &KeyMaterial, iv: &[u8], plaintext: &[u8]) -> RucResult<Vec<u8>> {
    let mut state = material.mix_iv(iv)?;
    let iv: [u8; IV_BYTES] = iv.try_into().expect("length checked by mix_iv");

    let padded = pkcs7_pad(plaintext);
    let mut envelope = Vec::with_capacity(IV_BYTES + padded.len());
    envelope.extend_from_slice(&iv);

    let mut previous = iv;
    for (n, chunk) in padded.chunks_exact(BLOCK_BYTES).enumerate() {
        let mut input = [0u8; BLOCK_BYTES];
        for i in 0..BLOCK_BYTES {
            input[i] = chunk[i] ^ previous[i];
        }
        let ciphertext = encrypt_block(&input, n as u64, &mut state, material);
        envelope.extend_from_slice(&ciphertext);
        previous = ciphertext;
    }
    Ok(envelope)
}

/// Decrypt a CBC envelope produced by [`encrypt`].
///
/// # Errors
///
/// `InvalidCiphertextLength` for a short or misaligned envelope;
/// `InvalidPadding` if the recovered padding is inconsistent.
pub fn decrypt(material: &KeyMaterial, envelope: &[u8]) -> RucResult<Vec<u8>> {
    if envelope.len() < IV_BYTES + BLOCK_BYTES || (envelope.len() - IV_BYTES) % BLOCK_BYTES != 0 {
        return Err(RucError::InvalidCiphertextLength);
    }
    let (iv, body) = envelope.split_at(IV_BYTES);
    let mut state = material.mix_iv(iv)?;

    let mut previous: [u8; BLOCK_BYTES] = iv.try_into().expect("split length is fixed");
    let mut plaintext = Vec::with_capacity(body.len());
    for (n, chunk) in body.chunks_exact(BLOCK_BYTES).enumerate() {
        let ciphertext: [u8; BLOCK_BYTES] = chunk.try_into().expect("chunks are exact");
        let unchained = decrypt_block(&ciphertext, n as u64, &mut state, material);
        for i in 0..BLOCK_BYTES {
            plaintext.push(unchained[i] ^ previous[i]);
        }
        previous = ciphertext;
    }

    pkcs7_unpad(&mut plaintext)?;
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbox::{SboxCriteria, SBOX_RETRY_LIMIT};
    use crate::schedule::expand_key_with;

    fn material() -> KeyMaterial {
        expand_key_with(&[0x55u8; 64], &SboxCriteria::RELAXED, SBOX_RETRY_LIMIT).unwrap()
    }

    #[test]
    fn test_roundtrip_various_lengths() {
        let km = material();
        let iv = [3u8; IV_BYTES];
        for len in [0usize, 1, 17, 32, 63, 64, 96, 321] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
            let envelope = encrypt(&km, &iv, &plaintext).unwrap();
            assert_eq!(envelope.len(), IV_BYTES + (len / 32 + 1) * 32);
            assert_eq!(decrypt(&km, &envelope).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_iv_length_is_enforced() {
        let km = material();
        assert_eq!(
            encrypt(&km, &[0u8; 16], b"data").unwrap_err(),
            RucError::InvalidIvLength
        );
    }

    #[test]
    fn test_short_envelope_is_rejected() {
        let km = material();
        assert_eq!(
            decrypt(&km, &[0u8; IV_BYTES + 16]).unwrap_err(),
            RucError::InvalidCiphertextLength
        );
    }

    #[test]
    fn test_chaining_propagates_across_blocks() {
        // Changing the first plaintext block must change every
        // ciphertext block after it.
        let km = material();
        let iv = [8u8; IV_BYTES];
        let p1 = vec![0u8; 96];
        let p2 = {
            let mut p = p1.clone();
            p[0] ^= 1;
            p
        };
        let c1 = encrypt(&km, &iv, &p1).unwrap();
        let c2 = encrypt(&km, &iv, &p2).unwrap();
        for block in 0..3 {
            let at = IV_BYTES + block * BLOCK_BYTES;
            assert_ne!(
                c1[at..at + BLOCK_BYTES],
                c2[at..at + BLOCK_BYTES],
                "block {block} unchanged"
            );
        }
    }
}
