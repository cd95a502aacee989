//! Key schedule.
//!
//! Expands a 64-byte master key into everything the round engine needs:
//! seven 512-bit state registers, a key-dependent number of odd 16-bit
//! selectors (with their precomputed key constants), 24 round keys and
//! 24 vetted S-boxes. Expansion is a pure function of the key; all of
//! the material is immutable afterwards and wiped on drop.

use zeroize::Zeroize;

use crate::chacha::ChaChaStream;
use crate::error::{RucError, RucResult};
use crate::register::Register512;
use crate::sbox::{SBox, SboxCriteria, SBOX_RETRY_LIMIT};
use crate::shake::{shake256, TAG_CONST, TAG_PERM, TAG_REG, TAG_RK, TAG_SEL};

/// Master key length in bytes.
pub const MASTER_KEY_BYTES: usize = 64;

/// Number of rounds per block.
pub const ROUNDS: usize = 24;

/// Number of 512-bit state registers.
pub const REGISTER_COUNT: usize = 7;

/// Smallest possible selector count (largest is 31).
pub const MIN_SELECTORS: usize = 16;

/// One routing selector: an odd 16-bit value plus its precomputed key
/// constant (first byte of `SHAKE256(K || "RUC-CONST" || u16be(sel), 1)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Zeroize)]
pub struct Selector {
    /// The odd, non-zero selector value.
    pub value: u16,
    /// Key constant XOR-ed into the round's GF product.
    pub key_const: u8,
}

/// All per-key material: registers, selectors, round keys, S-boxes.
///
/// Created once per session by [`expand_key`] and shared read-only by
/// any number of encryption tasks.
pub struct KeyMaterial {
    key: [u8; MASTER_KEY_BYTES],
    registers: [Register512; REGISTER_COUNT],
    selectors: Vec<Selector>,
    round_keys: [Register512; ROUNDS],
    sboxes: Vec<SBox>,
}

/// Expand a master key with the normative strict S-box thresholds.
///
/// # Errors
///
/// `InvalidKeyLength` if `key` is not 64 bytes; `SBoxGenerationFailed`
/// if any round's S-box exhausts its retry budget under
/// [`SboxCriteria::STRICT`].
pub fn expand_key(key: &[u8]) -> RucResult<KeyMaterial> {
    expand_key_with(key, &SboxCriteria::STRICT, SBOX_RETRY_LIMIT)
}

/// Expand a master key with explicit S-box criteria and retry budget.
///
/// The retry cap is the only tunable meant for production use; relaxed
/// criteria exist for randomised test suites.
pub fn expand_key_with(
    key: &[u8],
    criteria: &SboxCriteria,
    max_retries: u16,
) -> RucResult<KeyMaterial> {
    let key: &[u8; MASTER_KEY_BYTES] = key
        .try_into()
        .map_err(|_| RucError::InvalidKeyLength)?;

    let registers = derive_registers(key);
    let selectors = derive_selectors(key);
    let round_keys = derive_round_keys(key);

    let mut sboxes = Vec::with_capacity(ROUNDS);
    for round in 0..ROUNDS {
        sboxes.push(SBox::generate(key, round as u16, criteria, max_retries)?);
    }

    Ok(KeyMaterial {
        key: *key,
        registers,
        selectors,
        round_keys,
        sboxes,
    })
}

fn derive_registers(key: &[u8; MASTER_KEY_BYTES]) -> [Register512; REGISTER_COUNT] {
    let mut registers = [Register512::ZERO; REGISTER_COUNT];
    for (i, reg) in registers.iter_mut().enumerate() {
        let bytes: [u8; 64] = shake256(&[key, TAG_REG, &[i as u8]]);
        *reg = Register512::from_be_bytes(&bytes);
    }
    registers
}

fn derive_selectors(key: &[u8; MASTER_KEY_BYTES]) -> Vec<Selector> {
    let count = MIN_SELECTORS + (key[1] % 16) as usize;

    let mut values = Vec::with_capacity(count);
    for j in 0..count as u16 {
        let word: [u8; 2] = shake256(&[key, TAG_SEL, &j.to_be_bytes()]);
        let mut s = u16::from_be_bytes(word);
        // Force odd; this also maps zero to one.
        if s % 2 == 0 {
            s += 1;
        }
        values.push(s);
    }

    // Permute with a ChaCha20 stream keyed from the master key.
    let perm_key: [u8; 32] = shake256(&[key, TAG_PERM]);
    let mut stream = ChaChaStream::new(&perm_key);
    for i in (1..count).rev() {
        let j = (stream.next_u32_be() as usize) % (i + 1);
        values.swap(i, j);
    }

    values
        .into_iter()
        .map(|value| Selector {
            value,
            key_const: shake256::<1>(&[key, TAG_CONST, &value.to_be_bytes()])[0],
        })
        .collect()
}

fn derive_round_keys(key: &[u8; MASTER_KEY_BYTES]) -> [Register512; ROUNDS] {
    let mut round_keys = [Register512::ZERO; ROUNDS];
    for (r, rk) in round_keys.iter_mut().enumerate() {
        let bytes: [u8; 64] = shake256(&[key, TAG_RK, &(r as u16).to_be_bytes()]);
        *rk = Register512::from_be_bytes(&bytes);
    }
    round_keys
}

impl KeyMaterial {
    /// The master key, for per-block seed and sub-key derivation.
    pub(crate) fn key(&self) -> &[u8; MASTER_KEY_BYTES] {
        &self.key
    }

    /// The key-expanded (pre-IV) state registers.
    pub(crate) fn registers(&self) -> &[Register512; REGISTER_COUNT] {
        &self.registers
    }

    /// The shuffled selector sequence.
    pub(crate) fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// Round key for round `r`.
    pub(crate) fn round_key(&self, r: usize) -> &Register512 {
        &self.round_keys[r]
    }

    /// S-box for round `r`.
    pub(crate) fn sbox(&self, r: usize) -> &SBox {
        &self.sboxes[r]
    }

    /// Number of selectors derived for this key (16..=31).
    pub fn selector_count(&self) -> usize {
        self.selectors.len()
    }
}

impl core::fmt::Debug for KeyMaterial {
    /// Redacted: key material never reaches logs.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("selectors", &self.selectors.len())
            .finish_non_exhaustive()
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.key.zeroize();
        for reg in self.registers.iter_mut() {
            reg.zeroize();
        }
        for rk in self.round_keys.iter_mut() {
            rk.zeroize();
        }
        for sel in self.selectors.iter_mut() {
            sel.zeroize();
        }
        for sbox in self.sboxes.iter_mut() {
            sbox.zeroize();
        }
    }
}
