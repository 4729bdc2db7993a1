use kem::generic_array::typenum::{UInt, UTerm, B0, B1, U32};
use kem::generic_array::GenericArray;
use kem::{Decapsulator, EncappedKey, Encapsulator};
use rand_core::{CryptoRng, RngCore};

use crate::{Ciphertext, DecapsulationKey, EncapsulationKey};

#[rustfmt::skip]
pub type U1088 = UInt<UInt<UInt<UInt<UInt<UInt<UInt<UInt<UInt<UInt<UInt<UTerm, B1>, B0>, B0>, B0>, B1>, B0>, B0>, B0>, B0>, B0>, B0>;

/// The ML-KEM-768 algorithm, as an implementation of the traits from the `kem` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MlKem768;

impl MlKem768 {
    /// Generates a key pair, mapping entropy failures to [`kem::Error`].
    pub fn key_gen(
        rng: impl RngCore + CryptoRng,
    ) -> Result<(EncapsulationKey, DecapsulationKey), kem::Error> {
        crate::key_gen(rng).map(|kp| kp.into_parts()).map_err(|_| kem::Error)
    }
}

impl Encapsulator<Ciphertext> for MlKem768 {
    fn try_encap<R: CryptoRng + RngCore>(
        &self,
        csprng: &mut R,
        recip_pubkey: &<Ciphertext as EncappedKey>::RecipientPublicKey,
    ) -> Result<(Ciphertext, kem::SharedSecret<Ciphertext>), kem::Error> {
        let (ct, ss) = crate::encapsulate(recip_pubkey, csprng).map_err(|_| kem::Error)?;
        Ok((ct, kem::SharedSecret::new((*ss.as_bytes()).into())))
    }
}

impl Decapsulator<Ciphertext> for DecapsulationKey {
    fn try_decap(
        &self,
        encapped_key: &Ciphertext,
    ) -> Result<kem::SharedSecret<Ciphertext>, kem::Error> {
        let ss = crate::decapsulate(self, encapped_key);
        Ok(kem::SharedSecret::new((*ss.as_bytes()).into()))
    }
}

impl EncappedKey for Ciphertext {
    type EncappedKeySize = U1088;

    type SharedSecretSize = U32;

    type SenderPublicKey = EncapsulationKey;

    type RecipientPublicKey = EncapsulationKey;

    fn from_bytes(bytes: &GenericArray<u8, Self::EncappedKeySize>) -> Result<Self, kem::Error> {
        Ciphertext::try_from(bytes.as_slice()).map_err(|_| kem::Error)
    }
}
