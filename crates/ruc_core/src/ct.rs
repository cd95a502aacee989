//! Constant-time operations.
//!
//! Tag comparison and in-round S-box reads must not branch or index
//! memory on secret data. Both are built on the `subtle` crate's
//! constant-time primitives; the table read is a full-table masked scan
//! so every entry is touched regardless of the target index.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Constant-time equality comparison for byte slices.
///
/// The comparison time depends only on the length, never on where the
/// first difference occurs. Lengths are public information.
#[inline]
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Constant-time lookup of `table[index]`.
///
/// Scans the whole table, selecting the matching entry with a mask, so
/// the access pattern is independent of `index`.
#[inline]
pub fn ct_lookup(table: &[u8; 256], index: u8) -> u8 {
    let mut result = 0u8;
    for (i, entry) in table.iter().enumerate() {
        let hit = Choice::from((i as u8 == index) as u8);
        result = u8::conditional_select(&result, entry, hit);
    }
    result
}
