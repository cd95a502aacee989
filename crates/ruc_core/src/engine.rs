//! The 24-round block engine.
//!
//! For every 32-byte block the engine orders the selectors by a
//! block-specific ChaCha20 priority draw, walks them through 24 rounds
//! of key-driven routing (GF multiplication, S-box substitution,
//! rotation, register mixing), accumulates the round bytes into a
//! 1024-bit modular sum, and squeezes the keystream from the final
//! state with SHAKE256. Encryption and decryption share the transform;
//! the keystream XOR is self-inverse.
//!
//! S-box reads on secret bytes go through the constant-time table scan;
//! `gf_mul` is branchless by construction.

use crate::chacha::ChaChaStream;
use crate::gf256::{gf_mul, gf_mul_register};
use crate::register::{Accumulator, Register512};
use crate::schedule::{KeyMaterial, Selector, REGISTER_COUNT, ROUNDS};
use crate::shake::{shake256, TAG_KS, TAG_PRIO};
use crate::state::CipherState;

/// Cipher block size in bytes.
pub const BLOCK_BYTES: usize = 32;

/// Encrypt one 32-byte block at index `n`.
///
/// Runs the round transform on `state` (mutating it), XORs the emitted
/// keystream into the plaintext, and folds the resulting ciphertext
/// back into the state. CTR-style callers hand in a throwaway clone of
/// the message-initial state; chained modes keep the state alive so the
/// feedback carries across blocks.
pub fn encrypt_block(
    plaintext: &[u8; BLOCK_BYTES],
    n: u64,
    state: &mut CipherState,
    material: &KeyMaterial,
) -> [u8; BLOCK_BYTES] {
    let keystream = keystream_block(state, n, material);
    let mut ciphertext = [0u8; BLOCK_BYTES];
    for i in 0..BLOCK_BYTES {
        ciphertext[i] = plaintext[i] ^ keystream[i];
    }
    apply_feedback(state, &ciphertext);
    ciphertext
}

/// Decrypt one 32-byte block at index `n`.
///
/// The keystream depends only on state, key and block index, so this is
/// the same transform; the feedback folds the received ciphertext so
/// the state trajectory matches the encrypting side.
pub fn decrypt_block(
    ciphertext: &[u8; BLOCK_BYTES],
    n: u64,
    state: &mut CipherState,
    material: &KeyMaterial,
) -> [u8; BLOCK_BYTES] {
    let keystream = keystream_block(state, n, material);
    let mut plaintext = [0u8; BLOCK_BYTES];
    for i in 0..BLOCK_BYTES {
        plaintext[i] = ciphertext[i] ^ keystream[i];
    }
    apply_feedback(state, ciphertext);
    plaintext
}

/// Run the 24 rounds on `state` and squeeze the block keystream.
pub(crate) fn keystream_block(
    state: &mut CipherState,
    n: u64,
    material: &KeyMaterial,
) -> [u8; BLOCK_BYTES] {
    let ordered = ordered_selectors(state, n, material);
    let mut acc = Accumulator::new();

    for round in 0..ROUNDS {
        let sbox = material.sbox(round);
        let rk_low = material.round_key(round).low_u32();
        let regs = state.registers_mut();

        for sel in &ordered {
            let place = ((regs[0].low_u32() ^ u32::from(sel.value) ^ rk_low) % 7) as usize;

            let temp = sel.value.wrapping_mul(2);
            let state_byte = regs[place].top_byte();
            let gf_result = gf_mul(temp as u8, state_byte) ^ sel.key_const;
            let result = sbox.lookup_ct(gf_result);

            regs[place] = gf_mul_register(&regs[place], result);
            regs[place].xor_byte_shifted(result, u32::from(sel.value % 16));
            let low = regs[place].low_u8();
            regs[place].xor_byte_shifted(sbox.lookup_ct(low), 0);
            regs[place] = regs[place].rotate_left(1);
            let neighbour = regs[(place + 1) % REGISTER_COUNT];
            regs[place] ^= &neighbour;

            acc.add_byte(result);
        }

        // Inter-round diffusion; reads are snapshots so all seven
        // registers update simultaneously.
        let snapshot = *regs;
        for i in 0..REGISTER_COUNT {
            regs[i] ^= &snapshot[(i + 1) % REGISTER_COUNT];
            regs[i] ^= &snapshot[(i + 2) % REGISTER_COUNT];
        }
    }

    let acc_bytes = acc.to_be_bytes();
    let reg_bytes: Vec<[u8; 64]> = state
        .registers()
        .iter()
        .map(|r| r.to_be_bytes())
        .collect();
    let n_be = n.to_be_bytes();

    let mut parts: Vec<&[u8]> = Vec::with_capacity(REGISTER_COUNT + 3);
    parts.push(&acc_bytes);
    for bytes in reg_bytes.iter() {
        parts.push(bytes);
    }
    parts.push(TAG_KS);
    parts.push(&n_be);
    shake256(&parts)
}

/// Fold a ciphertext block into the state (Step E).
///
/// Each register XORs the 256-bit ciphertext shifted left by
/// `(i * 37) mod 256` bits.
pub(crate) fn apply_feedback(state: &mut CipherState, ciphertext: &[u8; BLOCK_BYTES]) {
    let lifted = Register512::from_low_be_bytes(ciphertext);
    for (i, reg) in state.registers_mut().iter_mut().enumerate() {
        *reg ^= &lifted.shift_left((i as u32 * 37) % 256);
    }
}

/// Order the selectors for block `n`.
///
/// A ChaCha20 stream seeded from `SHAKE256(K || IV || u64be(n) ||
/// "RUC-PRIO", 32)` assigns each selector slot a priority in 0..7; a
/// stable sort by priority (ties keep schedule order) yields the
/// per-block walk order.
fn ordered_selectors(state: &CipherState, n: u64, material: &KeyMaterial) -> Vec<Selector> {
    let seed: [u8; 32] = shake256(&[
        material.key(),
        state.iv(),
        &n.to_be_bytes(),
        TAG_PRIO,
    ]);
    let mut stream = ChaChaStream::new(&seed);

    let mut slots: Vec<(u32, Selector)> = material
        .selectors()
        .iter()
        .map(|&sel| (stream.next_u32_be() % 7, sel))
        .collect();
    slots.sort_by_key(|&(priority, _)| priority);
    slots.into_iter().map(|(_, sel)| sel).collect()
}
