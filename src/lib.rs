//! An implementation of the `ML-KEM-768` post-quantum key encapsulation mechanism, as specified in
//! FIPS 203.
//!
//! A receiver generates a key pair and publishes the encapsulation key. A sender encapsulates
//! against it, obtaining a ciphertext to send back and a 32-byte shared secret. The receiver
//! decapsulates the ciphertext with its decapsulation key and obtains the same shared secret.
//!
//! ```
//! let mut rng = rand_core::OsRng;
//!
//! let kp = mlkem_core::key_gen(&mut rng)?;
//! let (ct, ss) = mlkem_core::encapsulate(kp.encapsulation_key(), &mut rng)?;
//! assert_eq!(mlkem_core::decapsulate(kp.decapsulation_key(), &ct), ss);
//! # Ok::<(), mlkem_core::Error>(())
//! ```
//!
//! Decapsulation of a tampered ciphertext does not fail: it returns a pseudorandom secret derived
//! from the ciphertext and the key's implicit rejection value, which will not match the sender's.

#![cfg_attr(not(feature = "std"), no_std)]

use cmov::{Cmov, CmovEq};
use rand_core::CryptoRngCore;
use sha3::digest::{ExtendableOutput, FixedOutput, Update};
use sha3::{Sha3_512, Shake256};
use zeroize::Zeroizing;

pub use crate::error::{Error, ErrorKind};
pub use crate::params::{
    CIPHERTEXT_LEN, DECAPSULATION_KEY_LEN, ENCAPSULATION_KEY_LEN, SHARED_SECRET_LEN,
};
pub use crate::types::{Ciphertext, DecapsulationKey, EncapsulationKey, KeyPair, SharedSecret};

#[cfg(feature = "kem")]
pub use crate::traits::{MlKem768, U1088};

mod encode;
mod error;
mod field;
mod params;
mod pke;
mod poly;
mod sample;
#[cfg(feature = "kem")]
mod traits;
mod types;

/// Generates an encapsulation key and a corresponding decapsulation key using the given RNG.
///
/// The decapsulation key must be kept secret. Returns [`Error::EntropyUnavailable`] if the RNG
/// fails.
pub fn key_gen(mut rng: impl CryptoRngCore) -> Result<KeyPair, Error> {
    let (mut d, mut z) = (Zeroizing::new([0u8; 32]), Zeroizing::new([0u8; 32]));
    rng.try_fill_bytes(&mut *d)?;
    rng.try_fill_bytes(&mut *z)?;
    Ok(key_gen_derand(&d, &z))
}

/// Generates an encapsulation key and a corresponding decapsulation key from the seeds `d` and
/// `z`.
///
/// It implements ML-KEM.KeyGen_internal according to FIPS 203, Algorithm 16. The seeds must be
/// uniformly random and secret; this is exposed for known-answer tests.
pub fn key_gen_derand(d: &[u8; 32], z: &[u8; 32]) -> KeyPair {
    let (ek, dk_pke) = pke::key_gen(d);
    let ek = EncapsulationKey::new_unchecked(ek);
    let dk = DecapsulationKey::from_parts(&dk_pke, &ek, z);
    KeyPair::new(ek, dk)
}

/// Generates a ciphertext and an associated shared secret from an encapsulation key and an RNG.
///
/// The shared secret must be kept secret. Returns [`Error::EntropyUnavailable`] if the RNG fails.
pub fn encapsulate(
    ek: &EncapsulationKey,
    mut rng: impl CryptoRngCore,
) -> Result<(Ciphertext, SharedSecret), Error> {
    let mut m = Zeroizing::new([0u8; 32]);
    rng.try_fill_bytes(&mut *m)?;
    Ok(encapsulate_derand(ek, &m))
}

/// Generates a ciphertext and an associated shared secret from the message `m`.
///
/// It implements ML-KEM.Encaps_internal according to FIPS 203, Algorithm 17. The message must be
/// uniformly random and secret; this is exposed for known-answer tests.
pub fn encapsulate_derand(ek: &EncapsulationKey, m: &[u8; 32]) -> (Ciphertext, SharedSecret) {
    // (K, r) = G(m ‖ H(ek))
    let mut g = Zeroizing::new([0u8; 64]);
    Sha3_512::default()
        .chain(m)
        .chain(types::hash_ek(ek.as_bytes()))
        .finalize_into((&mut *g).into());
    let (k, r) = g.split_at(32);

    let c = pke::encrypt(ek.as_bytes(), m, r.try_into().expect("should be 32 bytes"));
    (Ciphertext::from(c), SharedSecret::new(k.try_into().expect("should be 32 bytes")))
}

/// Generates a shared secret from a decapsulation key and a ciphertext.
///
/// The shared secret must be kept secret. It implements ML-KEM.Decaps_internal according to FIPS
/// 203, Algorithm 18. If the ciphertext was not produced by encapsulating against the matching
/// encapsulation key, the result is the implicit rejection secret SHAKE256(z ‖ c), selected in
/// constant time.
pub fn decapsulate(dk: &DecapsulationKey, c: &Ciphertext) -> SharedSecret {
    let c = c.as_bytes();
    let m = pke::decrypt(dk.dk_pke(), c);

    // (K', r') = G(m' ‖ h)
    let mut g = Zeroizing::new([0u8; 64]);
    Sha3_512::default().chain(&*m).chain(dk.h()).finalize_into((&mut *g).into());
    let (k_p, r) = g.split_at(32);

    // K̄ = J(z ‖ c)
    let mut k_out = SharedSecret::new([0u8; 32]);
    Shake256::default().chain(dk.z()).chain(c).finalize_xof_into(k_out.as_bytes_mut());
    let c1 = pke::encrypt(dk.ek(), &m, r.try_into().expect("should be 32 bytes"));

    // Check c == c1
    let mut eq = 1;
    c.cmovne(&c1, 0, &mut eq);

    // Return k_p iff c == c1, k_out otherwise.
    for (x, y) in k_out.as_bytes_mut().iter_mut().zip(k_p) {
        x.cmovnz(y, eq);
    }
    k_out
}
