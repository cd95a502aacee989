//! Cipher state and IV absorption.
//!
//! A message's state starts from the key-expanded registers, absorbs a
//! SHAKE-expanded IV at seven different rotations, and is stirred by
//! three cross-diffusion rounds. The result is the per-message
//! `initial` state; block processing works on clones of it.

use zeroize::Zeroize;

use crate::error::{RucError, RucResult};
use crate::register::Register512;
use crate::schedule::{KeyMaterial, REGISTER_COUNT};
use crate::shake::{shake256, TAG_IV_EXPAND};

/// IV length in bytes.
pub const IV_BYTES: usize = 32;

/// The seven 512-bit working registers of one message or block, plus
/// the IV they were mixed with (the per-block priority seed re-absorbs
/// it).
#[derive(Clone, Zeroize)]
pub struct CipherState {
    registers: [Register512; REGISTER_COUNT],
    iv: [u8; IV_BYTES],
}

impl CipherState {
    pub(crate) fn registers(&self) -> &[Register512; REGISTER_COUNT] {
        &self.registers
    }

    pub(crate) fn registers_mut(&mut self) -> &mut [Register512; REGISTER_COUNT] {
        &mut self.registers
    }

    pub(crate) fn iv(&self) -> &[u8; IV_BYTES] {
        &self.iv
    }
}

impl core::fmt::Debug for CipherState {
    /// Redacted: working state is secret-dependent.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CipherState").finish_non_exhaustive()
    }
}

impl KeyMaterial {
    /// Produce the per-message initial state by absorbing a 32-byte IV.
    ///
    /// The IV is expanded to 512 bits with SHAKE256, XOR-ed into every
    /// register at rotation `(i * 73) mod 512`, and the registers are
    /// then cross-diffused three times. The mixed state differs from the
    /// key-expanded registers with overwhelming probability.
    ///
    /// # Errors
    ///
    /// `InvalidIvLength` if `iv` is not exactly 32 bytes.
    pub fn mix_iv(&self, iv: &[u8]) -> RucResult<CipherState> {
        if iv.len() != IV_BYTES {
            return Err(RucError::InvalidIvLength);
        }

        let expanded: [u8; 64] = shake256(&[iv, TAG_IV_EXPAND]);
        let iv_register = Register512::from_be_bytes(&expanded);

        let mut registers = *self.registers();
        for (i, reg) in registers.iter_mut().enumerate() {
            *reg ^= &iv_register.rotate_left((i as u32 * 73) % 512);
        }

        for _ in 0..3 {
            for i in 0..REGISTER_COUNT {
                let a = registers[(i + 1) % REGISTER_COUNT].rotate_left(17);
                let b = registers[(i + 3) % REGISTER_COUNT].rotate_left(41);
                registers[i] ^= &a;
                registers[i] ^= &b;
            }
        }

        let mut iv_copy = [0u8; IV_BYTES];
        iv_copy.copy_from_slice(iv);
        Ok(CipherState {
            registers,
            iv: iv_copy,
        })
    }
}
