//! # ruc_core
//!
//! Reference implementation of the Random Universe Cipher (RUC): a
//! symmetric, fully key-derived block cipher with a 512-bit master key,
//! 256-bit blocks and a 3,584-bit internal state, plus the block modes
//! and GCM-style authenticated encryption built on top of it.
//!
//! Everything the cipher uses (state registers, routing selectors,
//! round keys, S-boxes) is derived from the master key through
//! domain-separated SHAKE256, and every derived S-box has to clear
//! non-linearity, differential-uniformity and algebraic-degree gates
//! before it is accepted. This crate is the normative slow path: it is
//! a synchronous, deterministic, bit-reproducible computation, and any
//! accelerated backend must agree with it byte for byte.
//!
//! ## Architecture
//!
//! ```text
//! gf256 / register      (byte field math, 512-bit limb arithmetic)
//!     ↕
//! shake / chacha        (domain-separated XOF, deterministic PRNG)
//!     ↕
//! sbox → schedule       (vetted permutations, per-key material)
//!     ↕
//! state → engine        (IV mixing, 24-round keystream per block)
//!     ↕
//! modes                 (CTR, CBC, AEAD, password envelopes)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use ruc_core::{expand_key, modes::ctr};
//!
//! let material = expand_key(&[0x42u8; 64])?;
//! let envelope = ctr::encrypt(&material, &[7u8; 16], b"Hello, World!")?;
//! assert_eq!(ctr::decrypt(&material, &envelope)?, b"Hello, World!");
//! # Ok::<(), ruc_core::RucError>(())
//! ```
//!
//! Key material wipes itself on drop; working state is owned per task
//! and never shared. CTR/AEAD blocks are independent of each other, CBC
//! is sequential by construction.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all)]

/// Unified error types.
pub mod error;

/// GF(2^8) field arithmetic.
pub mod gf256;

/// 512-bit registers and the 1024-bit accumulator as limb arrays.
pub mod register;

/// SHAKE256 adapter and the domain-separation tags.
pub mod shake;

/// ChaCha20 keystream reader used as a deterministic PRNG.
pub mod chacha;

/// Constant-time comparison and table lookup.
pub mod ct;

/// S-box generation and cryptographic quality checks.
pub mod sbox;

/// Key schedule: registers, selectors, round keys, S-boxes.
pub mod schedule;

/// Cipher state and IV absorption.
pub mod state;

/// The 24-round block engine.
pub mod engine;

/// Block modes: CTR, CBC, AEAD and password-bundled envelopes.
pub mod modes;

/// Argon2id password-to-master-key derivation.
pub mod kdf;

pub use engine::{decrypt_block, encrypt_block, BLOCK_BYTES};
pub use error::{RucError, RucResult};
pub use schedule::{expand_key, expand_key_with, KeyMaterial, MASTER_KEY_BYTES};
pub use state::{CipherState, IV_BYTES};

/// Prelude with commonly used types.
pub mod prelude {
    pub use crate::error::{RucError, RucResult};

    pub use crate::engine::{decrypt_block, encrypt_block, BLOCK_BYTES};
    pub use crate::schedule::{expand_key, expand_key_with, KeyMaterial, MASTER_KEY_BYTES};
    pub use crate::state::{CipherState, IV_BYTES};

    pub use crate::modes::aead::{RucAead, TAG_BYTES};
    pub use crate::modes::{cbc, ctr, password, NONCE_BYTES};

    pub use crate::kdf::{derive_master_key, Argon2Profile, SALT_BYTES};
    pub use crate::sbox::{SBox, SboxCriteria, SBOX_RETRY_LIMIT};
}
