//! Fixed-size encodings of ML-KEM-768 keys, ciphertexts and shared secrets.
//!
//! Keys are validated when they are built from bytes; once constructed, every value has the
//! exact length and content the algorithms expect. Secret values wipe themselves on drop.

use core::fmt;

use cmov::CmovEq;
use sha3::digest::{FixedOutput, Update};
use sha3::Sha3_256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::encode::check_modulus;
use crate::error::Error;
use crate::params::{
    CIPHERTEXT_LEN, DECAPSULATION_KEY_LEN, ENCAPSULATION_KEY_LEN, K, PKE_DECRYPTION_KEY_LEN,
    POLY_BYTES, SEED_LEN, SHARED_SECRET_LEN,
};

// Offsets into a decapsulation key: dk_pke ‖ ek ‖ H(ek) ‖ z.
const DK_EK: usize = PKE_DECRYPTION_KEY_LEN;
const DK_H: usize = DK_EK + ENCAPSULATION_KEY_LEN;
const DK_Z: usize = DK_H + SEED_LEN;

/// Returns H(ek), the SHA3-256 digest of an encapsulation key.
pub(crate) fn hash_ek(ek: &[u8; ENCAPSULATION_KEY_LEN]) -> [u8; 32] {
    let mut h = [0u8; 32];
    Sha3_256::default().chain(ek).finalize_into((&mut h).into());
    h
}

/// An ML-KEM-768 encapsulation (public) key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncapsulationKey {
    bytes: [u8; ENCAPSULATION_KEY_LEN],
}

impl EncapsulationKey {
    /// Parses an encapsulation key, checking that every encoded coefficient is reduced.
    ///
    /// This is the encapsulation key input validation of FIPS 203, Section 7.2.
    pub fn from_bytes(bytes: &[u8; ENCAPSULATION_KEY_LEN]) -> Result<Self, Error> {
        check_modulus("encapsulation key", &bytes[..K * POLY_BYTES])?;
        Ok(EncapsulationKey { bytes: *bytes })
    }

    pub(crate) fn new_unchecked(bytes: [u8; ENCAPSULATION_KEY_LEN]) -> Self {
        EncapsulationKey { bytes }
    }

    /// Returns the 1184-byte encoding of the key.
    pub fn as_bytes(&self) -> &[u8; ENCAPSULATION_KEY_LEN] {
        &self.bytes
    }
}

impl TryFrom<&[u8]> for EncapsulationKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Error::check_length("encapsulation key", ENCAPSULATION_KEY_LEN, bytes.len())?;
        Self::from_bytes(bytes.try_into().expect("should be 1184 bytes"))
    }
}

impl AsRef<[u8]> for EncapsulationKey {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for EncapsulationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncapsulationKey").field("rho", &&self.bytes[K * POLY_BYTES..]).finish()
    }
}

/// An ML-KEM-768 decapsulation (secret) key.
///
/// The encoding follows FIPS 203, Algorithm 16: the K-PKE decryption key, the encapsulation key,
/// the hash of the encapsulation key, and the implicit rejection value `z`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DecapsulationKey {
    bytes: [u8; DECAPSULATION_KEY_LEN],
}

impl DecapsulationKey {
    /// Parses a decapsulation key, checking the embedded encapsulation key and its hash.
    ///
    /// This is the decapsulation key input validation of FIPS 203, Section 7.3, extended with the
    /// modulus check of the embedded encapsulation key.
    pub fn from_bytes(bytes: &[u8; DECAPSULATION_KEY_LEN]) -> Result<Self, Error> {
        let dk = DecapsulationKey { bytes: *bytes };
        check_modulus("decapsulation key", &dk.ek()[..K * POLY_BYTES])?;

        let mut eq = 1;
        hash_ek(dk.ek()).cmovne(dk.h(), 0, &mut eq);
        if eq != 1 {
            log::debug!("rejected decapsulation key: hash check failed");
            return Err(Error::KeyHashMismatch);
        }
        Ok(dk)
    }

    pub(crate) fn from_parts(
        dk_pke: &[u8; PKE_DECRYPTION_KEY_LEN],
        ek: &EncapsulationKey,
        z: &[u8; SEED_LEN],
    ) -> Self {
        let mut dk = DecapsulationKey { bytes: [0; DECAPSULATION_KEY_LEN] };
        dk.bytes[..DK_EK].copy_from_slice(dk_pke);
        dk.bytes[DK_EK..DK_H].copy_from_slice(ek.as_bytes());
        dk.bytes[DK_H..DK_Z].copy_from_slice(&hash_ek(ek.as_bytes()));
        dk.bytes[DK_Z..].copy_from_slice(z);
        dk
    }

    /// Returns the 2400-byte encoding of the key.
    ///
    /// The returned bytes are secret.
    pub fn as_bytes(&self) -> &[u8; DECAPSULATION_KEY_LEN] {
        &self.bytes
    }

    /// Returns the encapsulation key embedded in this key.
    pub fn encapsulation_key(&self) -> EncapsulationKey {
        EncapsulationKey::new_unchecked(*self.ek())
    }

    pub(crate) fn dk_pke(&self) -> &[u8; PKE_DECRYPTION_KEY_LEN] {
        self.bytes[..DK_EK].try_into().expect("should be 1152 bytes")
    }

    pub(crate) fn ek(&self) -> &[u8; ENCAPSULATION_KEY_LEN] {
        self.bytes[DK_EK..DK_H].try_into().expect("should be 1184 bytes")
    }

    pub(crate) fn h(&self) -> &[u8; SEED_LEN] {
        self.bytes[DK_H..DK_Z].try_into().expect("should be 32 bytes")
    }

    pub(crate) fn z(&self) -> &[u8; SEED_LEN] {
        self.bytes[DK_Z..].try_into().expect("should be 32 bytes")
    }
}

impl TryFrom<&[u8]> for DecapsulationKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Error::check_length("decapsulation key", DECAPSULATION_KEY_LEN, bytes.len())?;
        Self::from_bytes(bytes.try_into().expect("should be 2400 bytes"))
    }
}

impl fmt::Debug for DecapsulationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecapsulationKey").finish_non_exhaustive()
    }
}

/// An ML-KEM-768 ciphertext.
///
/// Any 1088-byte string is a valid ciphertext: decapsulating one that was not produced by
/// encapsulation yields an unrelated shared secret rather than an error.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ciphertext {
    bytes: [u8; CIPHERTEXT_LEN],
}

impl Ciphertext {
    /// Returns the 1088-byte encoding of the ciphertext.
    pub fn as_bytes(&self) -> &[u8; CIPHERTEXT_LEN] {
        &self.bytes
    }
}

impl From<[u8; CIPHERTEXT_LEN]> for Ciphertext {
    fn from(bytes: [u8; CIPHERTEXT_LEN]) -> Self {
        Ciphertext { bytes }
    }
}

impl TryFrom<&[u8]> for Ciphertext {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Error::check_length("ciphertext", CIPHERTEXT_LEN, bytes.len())?;
        Ok(Ciphertext { bytes: bytes.try_into().expect("should be 1088 bytes") })
    }
}

impl AsRef<[u8]> for Ciphertext {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ciphertext").field("len", &CIPHERTEXT_LEN).finish_non_exhaustive()
    }
}

/// A 32-byte shared secret, compared in constant time and wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    bytes: [u8; SHARED_SECRET_LEN],
}

impl SharedSecret {
    pub(crate) fn new(bytes: [u8; SHARED_SECRET_LEN]) -> Self {
        SharedSecret { bytes }
    }

    /// Returns the secret bytes.
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_LEN] {
        &self.bytes
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8; SHARED_SECRET_LEN] {
        &mut self.bytes
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        let mut eq = 1;
        self.bytes.cmovne(&other.bytes, 0, &mut eq);
        eq == 1
    }
}

impl Eq for SharedSecret {}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret").finish_non_exhaustive()
    }
}

/// A matching pair of encapsulation and decapsulation keys.
///
/// A key pair can be used for any number of encapsulations and decapsulations.
#[derive(Clone, Debug)]
pub struct KeyPair {
    encapsulation_key: EncapsulationKey,
    decapsulation_key: DecapsulationKey,
}

impl KeyPair {
    pub(crate) fn new(ek: EncapsulationKey, dk: DecapsulationKey) -> Self {
        KeyPair { encapsulation_key: ek, decapsulation_key: dk }
    }

    /// Returns the public half, to be sent to peers.
    pub fn encapsulation_key(&self) -> &EncapsulationKey {
        &self.encapsulation_key
    }

    /// Returns the secret half.
    pub fn decapsulation_key(&self) -> &DecapsulationKey {
        &self.decapsulation_key
    }

    /// Splits the pair into its two keys.
    pub fn into_parts(self) -> (EncapsulationKey, DecapsulationKey) {
        (self.encapsulation_key, self.decapsulation_key)
    }
}
