//! Byte encoding of polynomials, with and without lossy compression.

use crate::error::Error;
use crate::field::{compress, decompress, fe_is_reduced, fe_reduce_once};
use crate::params::{N, POLY_BYTES};
use crate::poly::{Domain, Poly, RingElement};

/// Packs 256 integers of `d` bits each into `32·d` bytes, least-significant bit first.
///
/// It implements ByteEncode_d, according to FIPS 203, Algorithm 5.
pub(crate) fn byte_encode(f: &[u16; N], d: u8, out: &mut [u8]) {
    debug_assert_eq!(out.len(), 32 * d as usize);

    let mut out = out.iter_mut();
    let (mut acc, mut acc_bits) = (0u32, 0u8);
    for &x in f {
        acc |= (x as u32) << acc_bits;
        acc_bits += d;
        while acc_bits >= 8 {
            if let Some(o) = out.next() {
                *o = acc as u8;
            }
            acc >>= 8;
            acc_bits -= 8;
        }
    }
}

/// Unpacks `32·d` bytes into 256 integers of `d` bits each.
fn unpack(b: &[u8], d: u8) -> [u16; N] {
    let mask = (1u32 << d) - 1;
    let mut f = [0; N];
    let mut f_iter = f.iter_mut();
    let (mut acc, mut acc_bits) = (0u32, 0u8);
    for &byte in b {
        acc |= (byte as u32) << acc_bits;
        acc_bits += 8;
        while acc_bits >= d {
            if let Some(f) = f_iter.next() {
                *f = (acc & mask) as u16;
            }
            acc >>= d;
            acc_bits -= d;
        }
    }
    f
}

/// Unpacks a `32·d` byte encoding into 256 integers of `d` bits each, rejecting inputs of any
/// other length.
///
/// It implements ByteDecode_d, according to FIPS 203, Algorithm 6, without the final reduction
/// modulo q for d = 12, so that callers can tell unreduced encodings apart.
pub(crate) fn byte_decode(b: &[u8], d: u8) -> Result<[u16; N], Error> {
    Error::check_length("encoded polynomial", 32 * d as usize, b.len())?;
    Ok(unpack(b, d))
}

/// Returns the 384-byte encoding of a polynomial.
pub(crate) fn poly_byte_encode<D: Domain>(f: &Poly<D>) -> [u8; POLY_BYTES] {
    let mut out = [0; POLY_BYTES];
    byte_encode(&f.f, 12, &mut out);
    out
}

/// Decodes the 384-byte encoding of a polynomial, reducing every coefficient modulo q.
///
/// It implements ByteDecode₁₂, according to FIPS 203, Algorithm 6. Coefficients are below
/// 2¹² < 2q, so a single conditional subtraction reduces them.
pub(crate) fn poly_byte_decode<D: Domain>(b: &[u8; POLY_BYTES]) -> Poly<D> {
    let mut f = unpack(b, 12);
    for f in f.iter_mut() {
        *f = fe_reduce_once(*f);
    }
    Poly::from_coefficients(f)
}

/// Checks that every 12-bit coefficient in a concatenation of 384-byte encodings is reduced.
///
/// This is the "Modulus check" of ML-KEM encapsulation key input validation, FIPS 203, Section
/// 7.2. It runs on public data only.
pub(crate) fn check_modulus(object: &'static str, b: &[u8]) -> Result<(), Error> {
    for chunk in b.chunks(POLY_BYTES) {
        let reduced = byte_decode(chunk, 12)?.iter().fold(1, |acc, &x| acc & fe_is_reduced(x));
        if reduced == 0 {
            log::debug!("rejected {object}: coefficient not reduced modulo q");
            return Err(Error::UnreducedCoefficient { object });
        }
    }
    Ok(())
}

/// Compresses every coefficient of `f` to `d` bits and packs them into `out`.
///
/// It implements Compress_d, according to FIPS 203, Definition 4.7, followed by ByteEncode_d.
fn ring_compress_and_encode(f: &RingElement, d: u8, out: &mut [u8]) {
    let mut c = [0; N];
    for (c, &f) in c.iter_mut().zip(&f.f) {
        *c = compress(f, d);
    }
    byte_encode(&c, d, out);
}

/// Unpacks `d`-bit values from `b` and decompresses them to field elements.
///
/// It implements ByteDecode_d followed by Decompress_d, according to FIPS 203, Definition 4.8.
fn ring_decode_and_decompress(b: &[u8], d: u8) -> RingElement {
    let mut f = unpack(b, d);
    for f in f.iter_mut() {
        *f = decompress(*f, d);
    }
    RingElement::from_coefficients(f)
}

/// Returns a 32-byte encoding of a ring element, compressing one coefficient per bit.
pub(crate) fn ring_compress_and_encode1(f: &RingElement) -> [u8; 32] {
    let mut b = [0; 32];
    ring_compress_and_encode(f, 1, &mut b);
    b
}

/// Decodes a 32-byte message to a ring element where each bit is mapped to 0 or ⌈q/2⌋.
pub(crate) fn ring_decode_and_decompress1(b: &[u8; 32]) -> RingElement {
    ring_decode_and_decompress(b, 1)
}

/// Returns a 128-byte encoding of a ring element, compressing two coefficients per byte.
pub(crate) fn ring_compress_and_encode4(f: &RingElement) -> [u8; 128] {
    let mut b = [0; 128];
    ring_compress_and_encode(f, 4, &mut b);
    b
}

/// Decodes a 128-byte encoding of a ring element where each four bits are mapped to an equidistant
/// distribution.
pub(crate) fn ring_decode_and_decompress4(b: &[u8; 128]) -> RingElement {
    ring_decode_and_decompress(b, 4)
}

/// Returns a 320-byte encoding of a ring element, compressing four coefficients per five bytes.
pub(crate) fn ring_compress_and_encode10(f: &RingElement) -> [u8; 320] {
    let mut b = [0; 320];
    ring_compress_and_encode(f, 10, &mut b);
    b
}

/// Decodes a 320-byte encoding of a ring element where each ten bits are mapped to an equidistant
/// distribution.
pub(crate) fn ring_decode_and_decompress10(b: &[u8; 320]) -> RingElement {
    ring_decode_and_decompress(b, 10)
}
