//! ML-KEM-768 parameters and the byte lengths derived from them.
//!
//! The code makes assumptions based on these values, they can't be changed blindly.

/// The prime modulus q.
pub const Q: u16 = 3329;

/// The number of coefficients of a ring element.
pub const N: usize = 256;

/// The rank of the module, i.e. the dimension of vectors and matrices.
pub const K: usize = 3;

/// The CBD width used for the secret and error vectors of key generation.
pub const ETA1: usize = 2;

/// The CBD width used for the error terms of encryption.
pub const ETA2: usize = 2;

/// The compression width of the `u` ciphertext component.
pub const DU: u8 = 10;

/// The compression width of the `v` ciphertext component.
pub const DV: u8 = 4;

/// The length of seeds, messages, hashes and shared secrets.
pub const SEED_LEN: usize = 32;

/// The length of a ByteEncode₁₂ encoded ring element.
pub const POLY_BYTES: usize = 384;

/// The length of a Compress₁₀ encoded ring element.
pub const POLY_COMPRESSED_DU_BYTES: usize = 32 * DU as usize;

/// The length of a Compress₄ encoded ring element.
pub const POLY_COMPRESSED_DV_BYTES: usize = 32 * DV as usize;

/// The length of the K-PKE decryption key.
pub const PKE_DECRYPTION_KEY_LEN: usize = K * POLY_BYTES;

/// The length of an encapsulation key.
pub const ENCAPSULATION_KEY_LEN: usize = K * POLY_BYTES + SEED_LEN;

/// The length of a decapsulation key: dk_pke || ek || H(ek) || z.
pub const DECAPSULATION_KEY_LEN: usize =
    PKE_DECRYPTION_KEY_LEN + ENCAPSULATION_KEY_LEN + 2 * SEED_LEN;

/// The length of a ciphertext.
pub const CIPHERTEXT_LEN: usize = K * POLY_COMPRESSED_DU_BYTES + POLY_COMPRESSED_DV_BYTES;

/// The length of a shared secret.
pub const SHARED_SECRET_LEN: usize = SEED_LEN;
