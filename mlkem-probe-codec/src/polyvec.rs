//! Vectors of compressed polynomials (the `u` part of a ciphertext).

use crate::poly::Poly;
use mlkem_probe_core::params::N;

/// A vector of `k` compressed polynomials.
///
/// Coefficients can be addressed globally: index `p` is coefficient
/// `p % 256` of polynomial `p / 256`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolyVec {
    /// The polynomials, in ciphertext order.
    pub polys: Vec<Poly>,
}

impl PolyVec {
    /// Create a vector of `k` zero polynomials.
    pub fn new(k: usize) -> Self {
        Self {
            polys: vec![Poly::new(); k],
        }
    }

    /// Number of polynomials (the module rank).
    pub fn len(&self) -> usize {
        self.polys.len()
    }

    /// True if the vector holds no polynomials.
    pub fn is_empty(&self) -> bool {
        self.polys.is_empty()
    }

    /// Total number of coefficients, `k * 256`.
    pub fn coeff_count(&self) -> usize {
        self.polys.len() * N
    }

    /// Coefficient at global index `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p >= k * 256`.
    pub fn coeff(&self, p: usize) -> u16 {
        self.polys[p / N].coeffs[p % N]
    }

    /// Mutable coefficient at global index `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p >= k * 256`.
    pub fn coeff_mut(&mut self, p: usize) -> &mut u16 {
        &mut self.polys[p / N].coeffs[p % N]
    }
}
