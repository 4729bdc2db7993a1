//! K-PKE, the CPA-secure public-key encryption scheme underlying ML-KEM.
//!
//! It has no integrity check of its own: the KEM transform in the crate root re-encrypts and
//! compares to catch tampered ciphertexts.

use sha3::digest::{FixedOutput, Update};
use sha3::Sha3_512;
use zeroize::Zeroizing;

use crate::encode::{
    poly_byte_decode, poly_byte_encode, ring_compress_and_encode1, ring_compress_and_encode10,
    ring_compress_and_encode4, ring_decode_and_decompress1, ring_decode_and_decompress10,
    ring_decode_and_decompress4,
};
use crate::params::{
    CIPHERTEXT_LEN, ENCAPSULATION_KEY_LEN, ETA1, ETA2, K, PKE_DECRYPTION_KEY_LEN, POLY_BYTES,
    POLY_COMPRESSED_DU_BYTES, POLY_COMPRESSED_DV_BYTES,
};
use crate::poly::{
    inverse_ntt, ntt, ntt_dot, ntt_matrix_mul, Ntt, NttElement, PolyVec, RingElement,
};
use crate::sample::{sample_matrix, sample_poly_cbd};

/// Generates a key pair for the underlying PKE from a 32-byte random seed.
///
/// It implements K-PKE.KeyGen according to FIPS 203, Algorithm 13.
pub(crate) fn key_gen(
    d: &[u8; 32],
) -> ([u8; ENCAPSULATION_KEY_LEN], Zeroizing<[u8; PKE_DECRYPTION_KEY_LEN]>) {
    // (ρ, σ) = G(d ‖ k), the rank byte separating the parameter sets.
    let mut g = Zeroizing::new([0u8; 64]);
    Sha3_512::default().chain(d).chain([K as u8]).finalize_into((&mut *g).into());
    let rho: &[u8; 32] = g[..32].try_into().expect("should be 32 bytes");
    let sigma: &[u8; 32] = g[32..].try_into().expect("should be 32 bytes");

    let a = sample_matrix(rho, false);

    let mut n = 0u8;
    let mut s = Zeroizing::new([NttElement::ZERO; K]);
    for s in s.iter_mut() {
        *s = ntt(&Zeroizing::new(sample_poly_cbd::<ETA1>(sigma, n)));
        n += 1;
    }
    let mut e = Zeroizing::new([NttElement::ZERO; K]);
    for e in e.iter_mut() {
        *e = ntt(&Zeroizing::new(sample_poly_cbd::<ETA1>(sigma, n)));
        n += 1;
    }

    let mut t = ntt_matrix_mul(&a, &s); // Â ◦ ŝ + ê
    for (t, e) in t.iter_mut().zip(e.iter()) {
        *t = *t + *e;
    }

    let mut ek = [0; ENCAPSULATION_KEY_LEN];
    {
        let mut ek = ek.chunks_exact_mut(POLY_BYTES);
        for (ek, t) in ek.by_ref().zip(&t) {
            ek.copy_from_slice(&poly_byte_encode(t));
        }
        ek.into_remainder().copy_from_slice(rho);
    }

    let mut dk = Zeroizing::new([0; PKE_DECRYPTION_KEY_LEN]);
    for (dk, s) in dk.chunks_exact_mut(POLY_BYTES).zip(s.iter()) {
        dk.copy_from_slice(&poly_byte_encode(s));
    }

    (ek, dk)
}

/// Encrypts a plaintext message with the randomness `rnd`.
///
/// It implements K-PKE.Encrypt according to FIPS 203, Algorithm 14. The encapsulation key must
/// have passed the modulus check.
pub(crate) fn encrypt(
    ek: &[u8; ENCAPSULATION_KEY_LEN],
    m: &[u8; 32],
    rnd: &[u8; 32],
) -> [u8; CIPHERTEXT_LEN] {
    let (t_bytes, rho) = ek.split_at(K * POLY_BYTES);
    let rho: &[u8; 32] = rho.try_into().expect("should be 32 bytes");
    let mut t: PolyVec<Ntt> = [NttElement::ZERO; K];
    for (t, b) in t.iter_mut().zip(t_bytes.chunks_exact(POLY_BYTES)) {
        *t = poly_byte_decode(b.try_into().expect("should be 384 bytes"));
    }

    let at = sample_matrix(rho, true);

    let mut n = 0u8;
    let mut r = Zeroizing::new([NttElement::ZERO; K]);
    for r in r.iter_mut() {
        *r = ntt(&Zeroizing::new(sample_poly_cbd::<ETA1>(rnd, n)));
        n += 1;
    }
    let mut e1 = Zeroizing::new([RingElement::ZERO; K]);
    for e1 in e1.iter_mut() {
        *e1 = sample_poly_cbd::<ETA2>(rnd, n);
        n += 1;
    }
    let e2 = Zeroizing::new(sample_poly_cbd::<ETA2>(rnd, n));

    // u = NTT⁻¹(Âᵀ ◦ r̂) + e₁
    let at_r = Zeroizing::new(ntt_matrix_mul(&at, &r));
    let mut u = [RingElement::ZERO; K];
    for ((u, at_r), e1) in u.iter_mut().zip(at_r.iter()).zip(e1.iter()) {
        *u = *Zeroizing::new(inverse_ntt(at_r)) + *e1;
    }

    // v = NTT⁻¹(t̂ᵀ ◦ r̂) + e₂ + μ
    let mu = Zeroizing::new(ring_decode_and_decompress1(m));
    let t_r = Zeroizing::new(inverse_ntt(&Zeroizing::new(ntt_dot(&t, &r))));
    let v = Zeroizing::new(*t_r + *e2 + *mu);

    let mut c = [0; CIPHERTEXT_LEN];
    {
        let mut c = c.chunks_exact_mut(POLY_COMPRESSED_DU_BYTES);
        for (c, u) in c.by_ref().zip(&u) {
            c.copy_from_slice(&ring_compress_and_encode10(u));
        }
        c.into_remainder().copy_from_slice(&ring_compress_and_encode4(&v));
    }
    c
}

/// Decrypts a ciphertext.
///
/// It implements K-PKE.Decrypt according to FIPS 203, Algorithm 15.
pub(crate) fn decrypt(
    dk: &[u8; PKE_DECRYPTION_KEY_LEN],
    c: &[u8; CIPHERTEXT_LEN],
) -> Zeroizing<[u8; 32]> {
    let (c1, c2) = c.split_at(K * POLY_COMPRESSED_DU_BYTES);
    let mut u = [NttElement::ZERO; K];
    for (u, c) in u.iter_mut().zip(c1.chunks_exact(POLY_COMPRESSED_DU_BYTES)) {
        *u = ntt(&ring_decode_and_decompress10(c.try_into().expect("should be 320 bytes")));
    }
    let c2: &[u8; POLY_COMPRESSED_DV_BYTES] = c2.try_into().expect("should be 128 bytes");
    let v = ring_decode_and_decompress4(c2);

    let mut s = Zeroizing::new([NttElement::ZERO; K]);
    for (s, dk) in s.iter_mut().zip(dk.chunks_exact(POLY_BYTES)) {
        *s = poly_byte_decode(dk.try_into().expect("should be 384 bytes"));
    }

    // w = v − NTT⁻¹(ŝᵀ ◦ NTT(u))
    let s_u = Zeroizing::new(inverse_ntt(&Zeroizing::new(ntt_dot(&s, &u))));
    let w = Zeroizing::new(v - *s_u);

    Zeroizing::new(ring_compress_and_encode1(&w))
}
