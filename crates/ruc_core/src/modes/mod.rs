//! Block modes and the authenticated envelope formats.
//!
//! All modes speak the same PKCS#7 padding (block size 32, full pad
//! block on exact multiples) and reject malformed envelopes at entry,
//! before any key-dependent work.

pub mod aead;
pub mod cbc;
pub mod ctr;
pub mod password;

use zeroize::Zeroize;

use crate::engine::BLOCK_BYTES;
use crate::error::{RucError, RucResult};

/// Nonce length for CTR and AEAD envelopes.
pub const NONCE_BYTES: usize = 16;

/// Append PKCS#7 padding up to the 32-byte block size.
///
/// A full pad block is appended when the input length is already a
/// multiple of 32, so padding is always removable.
pub(crate) fn pkcs7_pad(data: &[u8]) -> Vec<u8> {
    let pad = BLOCK_BYTES - (data.len() % BLOCK_BYTES);
    let mut out = Vec::with_capacity(data.len() + pad);
    out.extend_from_slice(data);
    out.extend(std::iter::repeat(pad as u8).take(pad));
    out
}

/// Strip PKCS#7 padding in place.
///
/// On inconsistent padding the buffer is zeroized before the error is
/// returned so no decrypted bytes escape.
pub(crate) fn pkcs7_unpad(data: &mut Vec<u8>) -> RucResult<()> {
    let pad = usize::from(*data.last().ok_or(RucError::InvalidPadding)?);
    if pad == 0 || pad > BLOCK_BYTES || pad > data.len() {
        data.zeroize();
        return Err(RucError::InvalidPadding);
    }
    if data[data.len() - pad..].iter().any(|&b| b != pad as u8) {
        data.zeroize();
        return Err(RucError::InvalidPadding);
    }
    data.truncate(data.len() - pad);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_lengths() {
        assert_eq!(pkcs7_pad(&[]).len(), 32);
        assert_eq!(pkcs7_pad(&[0u8; 13]).len(), 32);
        assert_eq!(pkcs7_pad(&[0u8; 31]).len(), 32);
        // Exact multiples still gain a full pad block.
        assert_eq!(pkcs7_pad(&[0u8; 32]).len(), 64);
    }

    #[test]
    fn test_pad_roundtrip() {
        for len in 0..100 {
            let data: Vec<u8> = (0..len as u8).collect();
            let mut padded = pkcs7_pad(&data);
            pkcs7_unpad(&mut padded).unwrap();
            assert_eq!(padded, data);
        }
    }

    #[test]
    fn test_unpad_rejects_out_of_range_byte() {
        let mut buf = vec![1u8; 31];
        buf.push(33); // beyond block size
        assert_eq!(pkcs7_unpad(&mut buf).unwrap_err(), RucError::InvalidPadding);
        assert!(buf.iter().all(|&b| b == 0), "buffer must be wiped");

        let mut buf = vec![1u8; 31];
        buf.push(0);
        assert_eq!(pkcs7_unpad(&mut buf).unwrap_err(), RucError::InvalidPadding);
    }

    #[test]
    fn test_unpad_rejects_inconsistent_fill() {
        let mut buf = vec![4u8; 32];
        buf[30] = 9; // inside the claimed pad region
        assert_eq!(pkcs7_unpad(&mut buf).unwrap_err(), RucError::InvalidPadding);
    }
}
