//! Key-derived S-box generation with cryptographic quality checks.
//!
//! Each round owns a bijective permutation of {0..255} derived from the
//! master key by a Fisher–Yates shuffle over SHAKE256 output. A candidate
//! permutation is only accepted if it clears three quality gates:
//!
//! - **Non-linearity**, via the fast Walsh–Hadamard transform over all
//!   255 non-zero output masks: `128 - max|WHT| / 2`.
//! - **Differential uniformity**: the largest entry of the difference
//!   distribution table over non-zero input differences.
//! - **Algebraic degree**: the minimum over the eight output-bit
//!   components of the maximal ANF monomial weight (Möbius transform).
//!
//! Rejected candidates are retried with a two-byte retry counter
//! appended to the SHAKE input; the budget is bounded, and exhausting it
//! surfaces [`RucError::SBoxGenerationFailed`] rather than weakening the
//! thresholds.

use zeroize::Zeroize;

use crate::ct;
use crate::error::{RucError, RucResult};
use crate::shake::{shake256, TAG_SBOX};

/// Default retry budget for one round's S-box.
pub const SBOX_RETRY_LIMIT: u16 = 100;

/// Acceptance thresholds for a candidate permutation.
///
/// [`SboxCriteria::STRICT`] is the normative production predicate.
/// Random shuffles clear it only rarely, which is the intended
/// behaviour: the generator reports failure instead of shipping a weak
/// permutation. [`SboxCriteria::RELAXED`] is what randomised test suites
/// run with, where a few retries practically always succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SboxCriteria {
    /// Lower bound on non-linearity.
    pub min_nonlinearity: u32,
    /// Upper bound on differential uniformity.
    pub max_differential_uniformity: u32,
    /// Lower bound on the per-component algebraic degree.
    pub min_algebraic_degree: u32,
}

impl SboxCriteria {
    /// Normative production thresholds.
    pub const STRICT: Self = Self {
        min_nonlinearity: 100,
        max_differential_uniformity: 4,
        min_algebraic_degree: 7,
    };

    /// Bounds for randomised self-tests.
    pub const RELAXED: Self = Self {
        min_nonlinearity: 90,
        max_differential_uniformity: 16,
        min_algebraic_degree: 6,
    };
}

/// A bijective permutation of {0..255}.
#[derive(Clone, Zeroize)]
pub struct SBox {
    table: [u8; 256],
}

impl core::fmt::Debug for SBox {
    /// Redacted: the permutation table is key-derived.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SBox").finish_non_exhaustive()
    }
}

impl SBox {
    /// Derive the round-`round` S-box for `key`.
    ///
    /// Attempt 0 shuffles over `SHAKE256(K || "RUC-SBOX" || u16be(round), 512)`;
    /// retry r appends `u16be(r)` for r in 1..=`max_retries`.
    pub fn generate(
        key: &[u8; 64],
        round: u16,
        criteria: &SboxCriteria,
        max_retries: u16,
    ) -> RucResult<Self> {
        let round_be = round.to_be_bytes();
        for retry in 0..=max_retries {
            let stream: [u8; 512] = if retry == 0 {
                shake256(&[key, TAG_SBOX, &round_be])
            } else {
                shake256(&[key, TAG_SBOX, &round_be, &retry.to_be_bytes()])
            };
            let candidate = Self::from_shuffle_stream(&stream);
            if candidate.satisfies(criteria) {
                return Ok(candidate);
            }
        }
        Err(RucError::SBoxGenerationFailed)
    }

    /// Shuffle the identity permutation with 2-byte big-endian draws.
    ///
    /// Fisher–Yates from i = 255 down to 1; the draw for position i
    /// starts at stream offset `2 * (255 - i)`.
    fn from_shuffle_stream(stream: &[u8; 512]) -> Self {
        let mut table = [0u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = i as u8;
        }
        for i in (1..=255usize).rev() {
            let offset = 2 * (255 - i);
            let draw = u16::from_be_bytes([stream[offset], stream[offset + 1]]);
            let j = (draw as usize) % (i + 1);
            table.swap(i, j);
        }
        Self { table }
    }

    /// Wrap an existing table. Intended for analysis and tests; the
    /// cipher only uses key-derived permutations.
    pub fn from_table(table: [u8; 256]) -> Self {
        Self { table }
    }

    /// Plain lookup. Only for derivation-time analysis; in-round reads
    /// go through [`SBox::lookup_ct`].
    #[inline]
    pub fn apply(&self, x: u8) -> u8 {
        self.table[x as usize]
    }

    /// Constant-time lookup for use on secret indices.
    #[inline]
    pub fn lookup_ct(&self, x: u8) -> u8 {
        ct::ct_lookup(&self.table, x)
    }

    /// Whether the permutation clears all gates of `criteria`.
    pub fn satisfies(&self, criteria: &SboxCriteria) -> bool {
        self.is_bijective()
            && self.nonlinearity() >= criteria.min_nonlinearity
            && self.differential_uniformity() <= criteria.max_differential_uniformity
            && self.algebraic_degree() >= criteria.min_algebraic_degree
    }

    /// Every value in 0..=255 appears exactly once.
    pub fn is_bijective(&self) -> bool {
        let mut seen = [false; 256];
        for &v in self.table.iter() {
            if seen[v as usize] {
                return false;
            }
            seen[v as usize] = true;
        }
        true
    }

    /// Non-linearity over all non-zero output masks.
    pub fn nonlinearity(&self) -> u32 {
        let mut max_abs = 0i32;
        for mask in 1..=255u8 {
            let mut spectrum = [0i32; 256];
            for x in 0..256 {
                let bit = (self.table[x] & mask).count_ones() & 1;
                spectrum[x] = 1 - 2 * bit as i32;
            }
            fwht(&mut spectrum);
            for &w in spectrum.iter() {
                max_abs = max_abs.max(w.abs());
            }
        }
        (128 - max_abs / 2) as u32
    }

    /// Largest difference-distribution count over non-zero input
    /// differences.
    pub fn differential_uniformity(&self) -> u32 {
        let mut max = 0u32;
        for a in 1..=255u8 {
            let mut counts = [0u32; 256];
            for x in 0..=255u8 {
                let d = self.table[x as usize] ^ self.table[(x ^ a) as usize];
                counts[d as usize] += 1;
                max = max.max(counts[d as usize]);
            }
        }
        max
    }

    /// Minimum algebraic degree over the eight output-bit components.
    pub fn algebraic_degree(&self) -> u32 {
        let mut min_degree = 8u32;
        for bit in 0..8 {
            let mut anf = [0u8; 256];
            for x in 0..256 {
                anf[x] = (self.table[x] >> bit) & 1;
            }
            moebius(&mut anf);
            let mut degree = 0u32;
            for (idx, &coeff) in anf.iter().enumerate() {
                if coeff != 0 {
                    degree = degree.max((idx as u32).count_ones());
                }
            }
            min_degree = min_degree.min(degree);
        }
        min_degree
    }
}

/// In-place fast Walsh–Hadamard transform on 256 entries.
fn fwht(data: &mut [i32; 256]) {
    let mut len = 1;
    while len < 256 {
        let mut i = 0;
        while i < 256 {
            for j in i..i + len {
                let a = data[j];
                let b = data[j + len];
                data[j] = a + b;
                data[j + len] = a - b;
            }
            i += len * 2;
        }
        len *= 2;
    }
}

/// In-place Möbius transform (truth table -> ANF coefficients).
fn moebius(data: &mut [u8; 256]) {
    let mut len = 1;
    while len < 256 {
        let mut i = 0;
        while i < 256 {
            for j in i..i + len {
                data[j + len] ^= data[j];
            }
            i += len * 2;
        }
        len *= 2;
    }
}
