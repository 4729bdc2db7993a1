//! Polynomials of R_q = ℤ_q[X]/(X²⁵⁶+1), tagged with the domain they are represented in.
//!
//! A [`Poly<Normal>`] holds the coefficients of a ring element, a [`Poly<Ntt>`] holds its NTT
//! representation (an element of T_q). The two never mix: addition and subtraction are only
//! defined between operands of the same domain, multiplication only between NTT elements, and
//! moving between domains goes through [`ntt`] and [`inverse_ntt`].

use core::marker::PhantomData;
use core::ops::{Add, Sub};

use zeroize::{Zeroize, Zeroizing};

use crate::field::{fe_add, fe_mul, fe_sub, FieldElement};
use crate::params::{K, N};

/// The domain a polynomial is represented in.
pub(crate) trait Domain: Copy {}

/// Coefficient representation, as in FIPS 203, Section 2.4.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Normal;

/// NTT representation, as in FIPS 203, Section 4.3.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ntt;

impl Domain for Normal {}
impl Domain for Ntt {}

/// An array of N field elements in domain `D`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct Poly<D: Domain> {
    pub(crate) f: [FieldElement; N],
    domain: PhantomData<D>,
}

/// RingElement is a polynomial, an element of R_q.
pub(crate) type RingElement = Poly<Normal>;

/// NttElement is an NTT representation, an element of T_q.
pub(crate) type NttElement = Poly<Ntt>;

/// A vector of K polynomials in the same domain.
pub(crate) type PolyVec<D> = [Poly<D>; K];

/// A K×K matrix of NTT elements, stored row-major.
pub(crate) type NttMatrix = [NttElement; K * K];

impl<D: Domain> Poly<D> {
    pub(crate) const ZERO: Self = Self::from_coefficients([0; N]);

    /// Wraps coefficients that are already reduced modulo q.
    pub(crate) const fn from_coefficients(f: [FieldElement; N]) -> Self {
        Poly { f, domain: PhantomData }
    }
}

impl<D: Domain> core::fmt::Debug for Poly<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Poly").field("f[..4]", &&self.f[..4]).finish_non_exhaustive()
    }
}

impl<D: Domain> Zeroize for Poly<D> {
    fn zeroize(&mut self) {
        self.f.zeroize();
    }
}

impl<D: Domain> Add for Poly<D> {
    type Output = Poly<D>;

    fn add(self, rhs: Self) -> Self::Output {
        let mut out = Self::ZERO;
        for ((o, a), b) in out.f.iter_mut().zip(self.f).zip(rhs.f) {
            *o = fe_add(a, b);
        }
        out
    }
}

impl<D: Domain> Sub for Poly<D> {
    type Output = Poly<D>;

    fn sub(self, rhs: Self) -> Self::Output {
        let mut out = Self::ZERO;
        for ((o, a), b) in out.f.iter_mut().zip(self.f).zip(rhs.f) {
            *o = fe_sub(a, b);
        }
        out
    }
}

/// GAMMAS are the values ζ^2BitRev7(i)+1 mod q for each index i.
const GAMMAS: [u16; 128] = [
    17, 3312, 2761, 568, 583, 2746, 2649, 680, 1637, 1692, 723, 2606, 2288, 1041, 1100, 2229, 1409,
    1920, 2662, 667, 3281, 48, 233, 3096, 756, 2573, 2156, 1173, 3015, 314, 3050, 279, 1703, 1626,
    1651, 1678, 2789, 540, 1789, 1540, 1847, 1482, 952, 2377, 1461, 1868, 2687, 642, 939, 2390,
    2308, 1021, 2437, 892, 2388, 941, 733, 2596, 2337, 992, 268, 3061, 641, 2688, 1584, 1745, 2298,
    1031, 2037, 1292, 3220, 109, 375, 2954, 2549, 780, 2090, 1239, 1645, 1684, 1063, 2266, 319,
    3010, 2773, 556, 757, 2572, 2099, 1230, 561, 2768, 2466, 863, 2594, 735, 2804, 525, 1092, 2237,
    403, 2926, 1026, 2303, 1143, 2186, 2150, 1179, 2775, 554, 886, 2443, 1722, 1607, 1212, 2117,
    1874, 1455, 1029, 2300, 2110, 1219, 2935, 394, 885, 2444, 2154, 1175,
];

/// Multiplies two NttElements.
///
/// It implements MultiplyNTTs, according to FIPS 203, Algorithm 11: 128 products of degree-one
/// polynomials modulo X² − γᵢ.
pub(crate) fn ntt_mul(f: &NttElement, g: &NttElement) -> NttElement {
    let mut h = NttElement::ZERO;
    for i in 0..128 {
        let (a0, a1) = (f.f[2 * i], f.f[2 * i + 1]);
        let (b0, b1) = (g.f[2 * i], g.f[2 * i + 1]);
        h.f[2 * i] = fe_add(fe_mul(a0, b0), fe_mul(fe_mul(a1, b1), GAMMAS[i]));
        h.f[2 * i + 1] = fe_add(fe_mul(a0, b1), fe_mul(a1, b0));
    }
    h
}

/// Returns the inner product of two vectors of NttElements.
pub(crate) fn ntt_dot(a: &PolyVec<Ntt>, b: &PolyVec<Ntt>) -> NttElement {
    a.iter().zip(b).fold(NttElement::ZERO, |acc, (a, b)| acc + ntt_mul(a, b))
}

/// Returns the matrix-vector product `M ◦ v`.
pub(crate) fn ntt_matrix_mul(m: &NttMatrix, v: &PolyVec<Ntt>) -> PolyVec<Ntt> {
    let mut out = [NttElement::ZERO; K];
    for (out, row) in out.iter_mut().zip(m.chunks_exact(K)) {
        for (m_ij, v) in row.iter().zip(v) {
            *out = *out + ntt_mul(m_ij, v);
        }
    }
    out
}

/// ZETAS are the values ζ^BitRev7(k) mod q for each index k.
const ZETAS: [u16; 128] = [
    1, 1729, 2580, 3289, 2642, 630, 1897, 848, 1062, 1919, 193, 797, 2786, 3260, 569, 1746, 296,
    2447, 1339, 1476, 3046, 56, 2240, 1333, 1426, 2094, 535, 2882, 2393, 2879, 1974, 821, 289, 331,
    3253, 1756, 1197, 2304, 2277, 2055, 650, 1977, 2513, 632, 2865, 33, 1320, 1915, 2319, 1435,
    807, 452, 1438, 2868, 1534, 2402, 2647, 2617, 1481, 648, 2474, 3110, 1227, 910, 17, 2761, 583,
    2649, 1637, 723, 2288, 1100, 1409, 2662, 3281, 233, 756, 2156, 3015, 3050, 1703, 1651, 2789,
    1789, 1847, 952, 1461, 2687, 939, 2308, 2437, 2388, 733, 2337, 268, 641, 1584, 2298, 2037,
    3220, 375, 2549, 2090, 1645, 1063, 319, 2773, 757, 2099, 561, 2466, 2594, 2804, 1092, 403,
    1026, 1143, 2150, 2775, 886, 1722, 1212, 1874, 1029, 2110, 2935, 885, 2154,
];

/// 128⁻¹ mod q, the scaling factor of the inverse transform.
const INVERSE_128: u16 = 3303;

/// Maps a RingElement to its NttElement representation.
///
/// It implements NTT, according to FIPS 203, Algorithm 9.
pub(crate) fn ntt(f: &RingElement) -> NttElement {
    let mut f = Zeroizing::new(f.f);
    let mut k = 1;
    let mut len = 128;
    while len >= 2 {
        for start in (0..N).step_by(2 * len) {
            let zeta = ZETAS[k];
            k += 1;
            for j in start..(start + len) {
                let t = fe_mul(zeta, f[j + len]);
                f[j + len] = fe_sub(f[j], t);
                f[j] = fe_add(f[j], t);
            }
        }
        len /= 2;
    }
    NttElement::from_coefficients(*f)
}

/// Maps an NttElement back to the RingElement it represents.
///
/// It implements NTT⁻¹, according to FIPS 203, Algorithm 10.
pub(crate) fn inverse_ntt(f: &NttElement) -> RingElement {
    let mut f = Zeroizing::new(f.f);
    let mut k = 127;
    let mut len = 2;
    while len <= 128 {
        for start in (0..N).step_by(2 * len) {
            let zeta = ZETAS[k];
            k -= 1;
            for j in start..(start + len) {
                let t = f[j];
                f[j] = fe_add(t, f[j + len]);
                f[j + len] = fe_mul(zeta, fe_sub(f[j + len], t));
            }
        }
        len *= 2;
    }

    for f in f.iter_mut() {
        *f = fe_mul(*f, INVERSE_128);
    }

    RingElement::from_coefficients(*f)
}
