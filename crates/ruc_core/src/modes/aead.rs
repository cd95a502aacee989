//! GCM-style authenticated encryption.
//!
//! Two sub-keys come off the master key: a 64-byte encryption key (the
//! payload runs through CTR under it) and a 32-byte authentication key
//! whose first 16 bytes act as the GHASH key H over GF(2^128)
//! (polynomial x^128 + x^7 + x^2 + x + 1, standard GCM bit order). The
//! tag authenticates `pad16(aad) || pad16(ct) || u64be(bits(aad)) ||
//! u64be(bits(ct))` and is masked with a zero-counter keystream block
//! whose IV is derived under its own domain tag, keeping the mask off
//! the payload keystream path.
//!
//! Envelope: `nonce (16) || ciphertext (multiple of 32) || tag (16)`.
//! On decrypt the tag is recomputed and compared in constant time
//! before any payload work happens.

use zeroize::Zeroize;

use crate::ct;
use crate::engine::{keystream_block, BLOCK_BYTES};
use crate::error::{RucError, RucResult};
use crate::sbox::{SboxCriteria, SBOX_RETRY_LIMIT};
use crate::schedule::{expand_key_with, KeyMaterial, MASTER_KEY_BYTES};
use crate::shake::{shake256, TAG_GCM_AUTH, TAG_GCM_ENC, TAG_GCM_IV};

use super::{ctr, pkcs7_pad, pkcs7_unpad, NONCE_BYTES};

/// Authentication tag length in bytes.
pub const TAG_BYTES: usize = 16;

/// Authenticated cipher bound to one master key.
///
/// Construction derives and vets the encryption sub-key's full key
/// material once; `seal`/`open` are then pure per-message operations.
pub struct RucAead {
    enc: KeyMaterial,
    h: [u8; 16],
}

impl RucAead {
    /// Bind to a 64-byte master key with the normative strict S-box
    /// thresholds.
    pub fn new(master: &[u8]) -> RucResult<Self> {
        Self::new_with(master, &SboxCriteria::STRICT, SBOX_RETRY_LIMIT)
    }

    /// Bind to a master key with explicit S-box criteria and retry
    /// budget (relaxed criteria are for test suites).
    pub fn new_with(
        master: &[u8],
        criteria: &SboxCriteria,
        max_retries: u16,
    ) -> RucResult<Self> {
        if master.len() != MASTER_KEY_BYTES {
            return Err(RucError::InvalidKeyLength);
        }

        let mut enc_key: [u8; 64] = shake256(&[master, TAG_GCM_ENC]);
        let enc = expand_key_with(&enc_key, criteria, max_retries);
        enc_key.zeroize();
        let enc = enc?;

        let mut auth_key: [u8; 32] = shake256(&[master, TAG_GCM_AUTH]);
        let mut h = [0u8; 16];
        h.copy_from_slice(&auth_key[..16]);
        auth_key.zeroize();

        Ok(Self { enc, h })
    }

    /// Encrypt and authenticate `plaintext` with associated data.
    ///
    /// The nonce must be unique per master key.
    ///
    /// # Errors
    ///
    /// `InvalidNonceLength` if the nonce is not 16 bytes.
    pub fn seal(&self, nonce: &[u8], aad: &[u8], plaintext: &[u8]) -> RucResult<Vec<u8>> {
        let nonce: &[u8; NONCE_BYTES] = nonce
            .try_into()
            .map_err(|_| RucError::InvalidNonceLength)?;

        let padded = pkcs7_pad(plaintext);
        let body = ctr::apply_body(&self.enc, nonce, &padded)?;
        let tag = self.tag(nonce, aad, &body)?;

        let mut envelope = Vec::with_capacity(NONCE_BYTES + body.len() + TAG_BYTES);
        envelope.extend_from_slice(nonce);
        envelope.extend_from_slice(&body);
        envelope.extend_from_slice(&tag);
        Ok(envelope)
    }

    /// Verify and decrypt an envelope produced by [`RucAead::seal`].
    ///
    /// # Errors
    ///
    /// `InvalidCiphertextLength` for a malformed envelope;
    /// `AuthenticationFailed` on tag mismatch, raised before any
    /// plaintext is produced; `InvalidPadding` if the authenticated
    /// payload unpads inconsistently (only possible for envelopes not
    /// produced by `seal`).
    pub fn open(&self, aad: &[u8], envelope: &[u8]) -> RucResult<Vec<u8>> {
        if envelope.len() < NONCE_BYTES + BLOCK_BYTES + TAG_BYTES
            || (envelope.len() - NONCE_BYTES - TAG_BYTES) % BLOCK_BYTES != 0
        {
            return Err(RucError::InvalidCiphertextLength);
        }
        let (head, tag) = envelope.split_at(envelope.len() - TAG_BYTES);
        let (nonce, body) = head.split_at(NONCE_BYTES);
        let nonce: &[u8; NONCE_BYTES] = nonce.try_into().expect("split length is fixed");

        let expected = self.tag(nonce, aad, body)?;
        if !ct::ct_eq(&expected, tag) {
            return Err(RucError::AuthenticationFailed);
        }

        let mut plaintext = ctr::apply_body(&self.enc, nonce, body)?;
        pkcs7_unpad(&mut plaintext)?;
        Ok(plaintext)
    }

    /// Compute the masked authentication tag.
    fn tag(&self, nonce: &[u8; NONCE_BYTES], aad: &[u8], body: &[u8]) -> RucResult<[u8; 16]> {
        let mut tag = ghash(&self.h, aad, body);
        let mask_iv: [u8; 32] = shake256(&[nonce, TAG_GCM_IV]);
        let mut state = self.enc.mix_iv(&mask_iv)?;
        let mask = keystream_block(&mut state, 0, &self.enc);
        for i in 0..16 {
            tag[i] ^= mask[i];
        }
        Ok(tag)
    }
}

impl core::fmt::Debug for RucAead {
    /// Redacted: holds the hash key and expanded encryption material.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RucAead").finish_non_exhaustive()
    }
}

impl Drop for RucAead {
    fn drop(&mut self) {
        self.h.zeroize();
    }
}

/// GHASH over the associated data, ciphertext and their bit lengths.
fn ghash(h: &[u8; 16], aad: &[u8], ciphertext: &[u8]) -> [u8; 16] {
    let mut y = [0u8; 16];
    for chunk in aad.chunks(16) {
        absorb(&mut y, h, chunk);
    }
    for chunk in ciphertext.chunks(16) {
        absorb(&mut y, h, chunk);
    }
    let mut lengths = [0u8; 16];
    lengths[..8].copy_from_slice(&((aad.len() as u64) * 8).to_be_bytes());
    lengths[8..].copy_from_slice(&((ciphertext.len() as u64) * 8).to_be_bytes());
    absorb(&mut y, h, &lengths);
    y
}

/// XOR a (zero-padded) 16-byte chunk into the GHASH state and multiply
/// by H.
fn absorb(y: &mut [u8; 16], h: &[u8; 16], chunk: &[u8]) {
    for (i, &byte) in chunk.iter().enumerate() {
        y[i] ^= byte;
    }
    *y = gf128_mul(y, h);
}

/// Multiply in GF(2^128) with the GCM reduction polynomial.
///
/// Bit 0 is the most significant bit of byte 0 (GCM convention). The
/// conditional XORs are mask-based so the multiply does not branch on
/// the secret hash key.
fn gf128_mul(x: &[u8; 16], y: &[u8; 16]) -> [u8; 16] {
    let mut z = [0u8; 16];
    let mut v = *y;
    for bit in 0..128 {
        let select = ((x[bit / 8] >> (7 - bit % 8)) & 1).wrapping_neg();
        for j in 0..16 {
            z[j] ^= v[j] & select;
        }

        let reduce = (v[15] & 1).wrapping_neg();
        let mut carry = 0u8;
        for byte in v.iter_mut() {
            let next = *byte & 1;
            *byte = (*byte >> 1) | (carry << 7);
            carry = next;
        }
        v[0] ^= 0xE1 & reduce;
    }
    z
}
