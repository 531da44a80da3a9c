//! Constant-time cryptographic operations.
//!
//! Provides timing-safe comparison to prevent side-channel attacks.
//! Execution time depends only on the lengths of the inputs, never on
//! their contents.

use subtle::{Choice, ConstantTimeEq};

/// Constant-time comparison of byte slices.
///
/// Returns `true` if slices are equal, `false` otherwise. Slices of unequal
/// length compare as unequal, but the common prefix is still scanned in full
/// so that a length mismatch does not short-circuit the comparison.
#[must_use]
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    let n = a.len().min(b.len());
    let len_eq = Choice::from(u8::from(a.len() == b.len()));
    let data_eq = a[..n].ct_eq(&b[..n]);
    (len_eq & data_eq).into()
}

/// Timing-safe tag verification.
///
/// Convenience wrapper around [`ct_eq`]; kept out-of-line so the comparison
/// is not specialized away at call sites.
#[must_use]
#[inline(never)]
pub fn verify_tag(computed: &[u8], provided: &[u8]) -> bool {
    ct_eq(computed, provided)
}

/// XOR `src` into `dst` byte-wise.
///
/// # Panics
///
/// Panics if `src.len()` != `dst.len()`.
pub fn xor_into(dst: &mut [u8], src: &[u8]) {
    assert_eq!(dst.len(), src.len());

    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= *s;
    }
}
