//! SHAKE256 adapter and domain-separation tags.
//!
//! Every piece of key, state and keystream material in the cipher is
//! derived from the FIPS-202 SHAKE256 XOF over a tagged input. Inputs
//! are plain concatenations (no length framing); the tags below are the
//! exact ASCII strings the wire format depends on, so changing any of
//! them breaks bit-compatibility.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;

/// Tag for state-register expansion (`K || tag || byte(i)`).
pub const TAG_REG: &[u8] = b"RUC-REG";
/// Tag for selector derivation (`K || tag || u16be(j)`).
pub const TAG_SEL: &[u8] = b"RUC-SEL";
/// Tag for the selector-permutation ChaCha key (`K || tag`).
pub const TAG_PERM: &[u8] = b"RUC-PERM";
/// Tag for round-key derivation (`K || tag || u16be(r)`).
pub const TAG_RK: &[u8] = b"RUC-RK";
/// Tag for S-box shuffle bytes (`K || tag || u16be(r) [|| u16be(retry)]`).
pub const TAG_SBOX: &[u8] = b"RUC-SBOX";
/// Tag for per-selector key constants (`K || tag || u16be(sel)`).
pub const TAG_CONST: &[u8] = b"RUC-CONST";
/// Tag for IV expansion (`IV || tag`).
pub const TAG_IV_EXPAND: &[u8] = b"RUC-IV-EXPAND";
/// Tag for the per-block priority seed (`K || IV || u64be(n) || tag`).
pub const TAG_PRIO: &[u8] = b"RUC-PRIO";
/// Tag closing the keystream input (`acc || regs || tag || u64be(n)`).
pub const TAG_KS: &[u8] = b"RUC-KS";
/// Tag for the AEAD encryption sub-key (`K || tag`).
pub const TAG_GCM_ENC: &[u8] = b"RUC-GCM-ENC";
/// Tag for the AEAD authentication sub-key (`K || tag`).
pub const TAG_GCM_AUTH: &[u8] = b"RUC-GCM-AUTH";
/// Tag for the AEAD tag-mask IV (`nonce || tag`).
pub const TAG_GCM_IV: &[u8] = b"RUC-GCM-IV";
/// Tag for the CTR message IV (`nonce || tag`).
pub const TAG_CTR_IV: &[u8] = b"RUC-CTR-IV";
/// Counter-fold tag. Deliberately not `RUC-` prefixed; the wire format
/// inherited the bare string and bit-compatibility pins it.
pub const TAG_CTR_FOLD: &[u8] = b"CTR";

/// Compute SHAKE256 over the concatenation of `parts`, filling `out`.
pub fn shake256_into(parts: &[&[u8]], out: &mut [u8]) {
    let mut hasher = Shake256::default();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize_xof().read(out);
}

/// Compute SHAKE256 over the concatenation of `parts` with a fixed-size
/// output.
pub fn shake256<const N: usize>(parts: &[&[u8]]) -> [u8; N] {
    let mut out = [0u8; N];
    shake256_into(parts, &mut out);
    out
}
