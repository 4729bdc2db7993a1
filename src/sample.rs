//! Deterministic sampling of ring elements from seeds.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Shake128, Shake256};
use zeroize::Zeroizing;

use crate::field::fe_sub;
use crate::params::{K, N, Q};
use crate::poly::{NttElement, NttMatrix, RingElement};

/// Draws a uniformly random NttElement from a stream of uniformly random bytes generated by the XOF
/// function, according to FIPS 203, Algorithm 7.
pub(crate) fn sample_ntt(rho: &[u8; 32], ii: u8, jj: u8) -> NttElement {
    let mut xof = Shake128::default().chain(rho).chain([ii, jj]).finalize_xof();

    // SampleNTT essentially draws 12 bits at a time from r, interprets them in
    // little-endian, and rejects values higher than q, until it drew 256
    // values. (The rejection rate is approximately 19%.)
    //
    // To do this from a bytes stream, it draws three bytes at a time, and
    // splits the second one between the high-order bits of the first value and
    // the low-order bits of the second values.
    //
    //               r₀              r₁              r₂
    //       |- - - - - - - -|- - - - - - - -|- - - - - - - -|
    //
    //                   d₁                      d₂
    //       |- - - - - - - - - - - -|- - - - - - - - - - - -|
    //
    //                         r₁%16   r₁>>4
    //                       |- - - -|- - - -|
    //
    // Note that in little-endian, a modulo operation keeps the "leftmost"
    // least-significant bits, while a right-shift keeps the "rightmost"
    // most-significant bits.
    //
    // The matrix is public, so the data-dependent loop leaks nothing.

    let mut a = [0; N];
    let mut b = [0u8; 3];
    let mut j = 0;
    while j < N {
        xof.read(&mut b);
        let d = (b[0] as u32) | (b[1] as u32) << 8 | (b[2] as u32) << 16;
        const MASK12: u32 = 0b1111_1111_1111;

        let d1 = d & MASK12;
        if d1 < Q as u32 {
            a[j] = d1 as u16;
            j += 1;
        }

        let d2 = d >> 12;
        if j < N && d2 < Q as u32 {
            a[j] = d2 as u16;
            j += 1;
        }
    }
    NttElement::from_coefficients(a)
}

/// Expands the public seed `rho` into the matrix Â, or into Âᵀ if `transpose` is set.
pub(crate) fn sample_matrix(rho: &[u8; 32], transpose: bool) -> NttMatrix {
    let mut a = [NttElement::ZERO; K * K];
    for i in 0..K {
        for j in 0..K {
            // Entry (i, j) of Â is drawn from XOF(ρ, j, i), as in FIPS 203, Algorithm 13.
            let (ii, jj) = if transpose { (i as u8, j as u8) } else { (j as u8, i as u8) };
            a[i * K + j] = sample_ntt(rho, ii, jj);
        }
    }
    a
}

/// Draws a RingElement from the special Dη distribution given a stream of random bytes generated by
/// the PRF function, according to FIPS 203, Algorithm 8 and Section 4.1.
///
/// The PRF output is 64·η bytes of SHAKE256(s ‖ b). Every coefficient consumes 2η bits: the sum
/// of the first η minus the sum of the last η.
pub(crate) fn sample_poly_cbd<const ETA: usize>(s: &[u8; 32], b: u8) -> RingElement {
    debug_assert!(ETA == 2 || ETA == 3);

    let mut prf = Zeroizing::new([0u8; 3 * 64]);
    let prf = &mut prf[..64 * ETA];
    Shake256::default().chain(s).chain([b]).finalize_xof_into(prf);

    let mut f = Zeroizing::new([0; N]);
    let mut bits = BitReader::new(prf);
    for f in f.iter_mut() {
        let (mut x, mut y) = (0u16, 0u16);
        for _ in 0..ETA {
            x += bits.read_bit() as u16;
        }
        for _ in 0..ETA {
            y += bits.read_bit() as u16;
        }
        *f = fe_sub(x, y);
    }
    RingElement::from_coefficients(*f)
}

/// Reads bits from a byte string, least-significant bit first.
struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        BitReader { bytes, pos: 0 }
    }

    fn read_bit(&mut self) -> u8 {
        let bit = self.bytes[self.pos / 8] >> (self.pos % 8) & 1;
        self.pos += 1;
        bit
    }
}
