//! Compressed polynomials.
//!
//! Unlike the ring elements used inside ML-KEM, these hold the *compressed*
//! d-bit values exactly as they appear on the wire, so decoding and
//! re-encoding a ciphertext is lossless.

use mlkem_probe_core::params::N;

/// A polynomial of 256 compressed coefficients.
///
/// Each coefficient is expected to lie in `[0, 2^d)` for the compression
/// depth `d` it was decoded with; higher bits are dropped on encode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    /// 256 coefficients of the polynomial.
    pub coeffs: [u16; N],
}

impl Default for Poly {
    fn default() -> Self {
        Self { coeffs: [0u16; N] }
    }
}

impl Poly {
    /// Create a new zero polynomial.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a polynomial from a coefficient array.
    pub fn from_coeffs(coeffs: [u16; N]) -> Self {
        Self { coeffs }
    }

    /// True if every coefficient is zero.
    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|&c| c == 0)
    }
}
