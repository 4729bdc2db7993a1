//! Arithmetic in ℤ_q, and the lossy compression of field elements.

use crate::params::Q;

/// FieldElement is an integer modulo q, an element of ℤ_q. It is always reduced.
pub(crate) type FieldElement = u16;

/// Reduce a value `a < 2q`.
pub(crate) fn fe_reduce_once(a: u16) -> FieldElement {
    let x = a.wrapping_sub(Q);
    x.wrapping_add((x >> 15).wrapping_mul(Q))
}

pub(crate) fn fe_add(a: FieldElement, b: FieldElement) -> FieldElement {
    fe_reduce_once(a.wrapping_add(b))
}

pub(crate) fn fe_sub(a: FieldElement, b: FieldElement) -> FieldElement {
    fe_reduce_once(a.wrapping_sub(b).wrapping_add(Q))
}

const BARRETT_MULTIPLIER: u64 = 5039; // 4¹² / q
const BARRETT_SHIFT: usize = 24; // log₂(4¹²)

/// Reduce a value `a < q²` using Barrett reduction, to avoid potentially variable-time division.
pub(crate) fn fe_reduce(a: u32) -> FieldElement {
    let quotient = ((a as u64).wrapping_mul(BARRETT_MULTIPLIER) >> BARRETT_SHIFT) as u32;
    fe_reduce_once(a.wrapping_sub(quotient.wrapping_mul(Q as u32)) as u16)
}

pub(crate) fn fe_mul(a: FieldElement, b: FieldElement) -> FieldElement {
    fe_reduce((a as u32).wrapping_mul(b as u32))
}

/// Returns 1 if `a < q` and 0 otherwise, without branching on `a`.
pub(crate) fn fe_is_reduced(a: u16) -> u8 {
    // a - q underflows, setting the top bit, exactly when a < q.
    ((a as u32).wrapping_sub(Q as u32) >> 31) as u8
}

/// Maps a field element uniformly to the range 0 to 2ᵈ-1, according to FIPS 203, Definition 4.7.
pub(crate) fn compress(x: FieldElement, d: u8) -> u16 {
    // We want to compute (x * 2ᵈ) / q, rounded to nearest integer, with 1/2
    // rounding up (see FIPS 203, Section 2.3).

    // Barrett reduction produces a quotient and a remainder in the range [0, 2q),
    // such that dividend = quotient * q + remainder.
    let dividend = (x as u32) << d; // x * 2ᵈ
    let mut quotient =
        (((dividend as u64).wrapping_mul(BARRETT_MULTIPLIER)) >> BARRETT_SHIFT) as u32;
    let remainder = dividend.wrapping_sub(quotient.wrapping_mul(Q as u32));

    // Since the remainder is in the range [0, 2q), not [0, q), we need to
    // portion it into three spans for rounding.
    //
    //     [ 0,       q/2     ) -> round to 0
    //     [ q/2,     q + q/2 ) -> round to 1
    //     [ q + q/2, 2q      ) -> round to 2
    //
    // If remainder > x, then x - remainder underflows and the top bit of the
    // difference is set.
    quotient = quotient.wrapping_add((Q as u32 / 2).wrapping_sub(remainder) >> 31 & 1);
    quotient += (Q as u32 + (Q as u32) / 2).wrapping_sub(remainder) >> 31 & 1;

    // quotient might have overflowed at this point, so reduce it by masking.
    let mask = (1u32 << d) - 1;
    (quotient & mask) as u16
}

/// Maps a number between 0 and 2ᵈ-1 uniformly to the full range of field elements, according to
/// FIPS 203, Definition 4.8.
pub(crate) fn decompress(y: u16, d: u8) -> FieldElement {
    // (y * q) / 2ᵈ, rounded to nearest integer, with 1/2 rounding up.
    let dividend = (y as u32).wrapping_mul(Q as u32);
    let mut quotient = dividend >> d;

    // The d'th least-significant bit of the dividend is 1 for the top half of
    // the values that divide to the same quotient, which are the ones that
    // round up.
    quotient = quotient.wrapping_add((dividend >> (d - 1)) & 1);

    // quotient is at most (2¹¹-1) * q / 2¹¹ + 1 = 3328, so it didn't overflow.
    quotient as u16
}
