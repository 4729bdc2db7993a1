//! Errors returned when decoding keys and ciphertexts or drawing randomness.

/// The broad class of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A buffer had the wrong length or did not hold a valid encoding.
    MalformedEncoding,
    /// The random number generator failed to produce output.
    EntropyUnavailable,
}

/// An error from ML-KEM input validation or from the entropy source.
///
/// Decapsulation never fails for a well-formed key and ciphertext: tampered ciphertexts are
/// answered with an implicit-rejection secret instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    /// A buffer did not have the fixed length of the object it encodes.
    #[error("invalid {object} length: expected {expected} bytes, got {actual}")]
    InvalidLength { object: &'static str, expected: usize, actual: usize },

    /// A 12-bit encoded coefficient was not reduced modulo q.
    #[error("{object} contains a coefficient that is not reduced modulo 3329")]
    UnreducedCoefficient { object: &'static str },

    /// The hash stored in a decapsulation key does not match its encapsulation key.
    #[error("decapsulation key hash does not match the embedded encapsulation key")]
    KeyHashMismatch,

    /// The random number generator failed.
    #[error("entropy source unavailable")]
    EntropyUnavailable,
}

impl Error {
    /// Returns the class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidLength { .. }
            | Error::UnreducedCoefficient { .. }
            | Error::KeyHashMismatch => ErrorKind::MalformedEncoding,
            Error::EntropyUnavailable => ErrorKind::EntropyUnavailable,
        }
    }

    /// Checks that `actual` is the expected length of `object`.
    pub(crate) fn check_length(
        object: &'static str,
        expected: usize,
        actual: usize,
    ) -> Result<(), Error> {
        if expected == actual {
            Ok(())
        } else {
            log::debug!("rejected {object}: {actual} bytes, expected {expected}");
            Err(Error::InvalidLength { object, expected, actual })
        }
    }
}

impl From<rand_core::Error> for Error {
    fn from(err: rand_core::Error) -> Self {
        log::warn!("random number generator failed: {err}");
        Error::EntropyUnavailable
    }
}
