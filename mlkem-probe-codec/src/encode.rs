//! ByteEncode_d / ByteDecode_d over compressed coefficients.
//!
//! FIPS 203 Algorithms 5 and 6 pack 256 d-bit integers LSB-first into
//! `32 * d` bytes. Eight coefficients always fill exactly `d` bytes, so
//! both directions work one 8-coefficient group at a time.
//!
//! No modular reduction or decompression is applied in either direction:
//! `byte_encode(byte_decode(b, d), d) == b` for every input `b`.

use crate::poly::Poly;
use mlkem_probe_core::params::N;

/// Number of bytes one polynomial occupies at depth `d`.
#[inline]
pub const fn encoded_len(d: usize) -> usize {
    N * d / 8
}

#[inline]
fn encode_groups<const D: usize>(poly: &Poly, out: &mut [u8]) {
    let mask = (1u128 << D) - 1;
    for (coeffs, bytes) in poly.coeffs.chunks_exact(8).zip(out.chunks_exact_mut(D)) {
        let mut acc = 0u128;
        for (j, &c) in coeffs.iter().enumerate() {
            acc |= (c as u128 & mask) << (D * j);
        }
        for (j, b) in bytes.iter_mut().enumerate() {
            *b = (acc >> (8 * j)) as u8;
        }
    }
}

#[inline]
fn decode_groups<const D: usize>(bytes: &[u8]) -> Poly {
    let mask = (1u128 << D) - 1;
    let mut poly = Poly::new();
    for (coeffs, chunk) in poly.coeffs.chunks_exact_mut(8).zip(bytes.chunks_exact(D)) {
        let mut acc = 0u128;
        for (j, &b) in chunk.iter().enumerate() {
            acc |= (b as u128) << (8 * j);
        }
        for (j, c) in coeffs.iter_mut().enumerate() {
            *c = ((acc >> (D * j)) & mask) as u16;
        }
    }
    poly
}

/// Encode 256 coefficients using `d` bits each into `out[..32 * d]`.
///
/// Bits above `d` in a coefficient are ignored.
///
/// # Panics
///
/// Panics if `d` is not in `1..=12` or `out` is shorter than `32 * d`.
pub fn byte_encode(poly: &Poly, d: usize, out: &mut [u8]) {
    assert!(
        out.len() >= encoded_len(d),
        "output buffer too short for d={}: {} < {}",
        d,
        out.len(),
        encoded_len(d)
    );
    match d {
        1 => encode_groups::<1>(poly, out),
        2 => encode_groups::<2>(poly, out),
        3 => encode_groups::<3>(poly, out),
        4 => encode_groups::<4>(poly, out),
        5 => encode_groups::<5>(poly, out),
        6 => encode_groups::<6>(poly, out),
        7 => encode_groups::<7>(poly, out),
        8 => encode_groups::<8>(poly, out),
        9 => encode_groups::<9>(poly, out),
        10 => encode_groups::<10>(poly, out),
        11 => encode_groups::<11>(poly, out),
        12 => encode_groups::<12>(poly, out),
        _ => panic!("Unsupported d value: {} (supported: 1..=12)", d),
    }
}

/// Decode `32 * d` bytes into 256 `d`-bit coefficients.
///
/// # Panics
///
/// Panics if `d` is not in `1..=12` or `bytes` is shorter than `32 * d`.
pub fn byte_decode(bytes: &[u8], d: usize) -> Poly {
    assert!(
        bytes.len() >= encoded_len(d),
        "input too short for d={}: {} < {}",
        d,
        bytes.len(),
        encoded_len(d)
    );
    match d {
        1 => decode_groups::<1>(bytes),
        2 => decode_groups::<2>(bytes),
        3 => decode_groups::<3>(bytes),
        4 => decode_groups::<4>(bytes),
        5 => decode_groups::<5>(bytes),
        6 => decode_groups::<6>(bytes),
        7 => decode_groups::<7>(bytes),
        8 => decode_groups::<8>(bytes),
        9 => decode_groups::<9>(bytes),
        10 => decode_groups::<10>(bytes),
        11 => decode_groups::<11>(bytes),
        12 => decode_groups::<12>(bytes),
        _ => panic!("Unsupported d value: {} (supported: 1..=12)", d),
    }
}
