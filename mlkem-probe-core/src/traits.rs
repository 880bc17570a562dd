//! Capability traits for the ML-KEM mathematics.
//!
//! Probe generation and timing collection never implement key generation,
//! encapsulation or decapsulation themselves; they consume them through
//! these traits.

use crate::params::{ParameterSet, ENCAPS_RANDOMNESS_SIZE, SEED_SIZE, SHARED_SECRET_SIZE};
use crate::Result;
use zeroize::Zeroizing;

/// Shared secret produced by encapsulation/decapsulation.
pub type SharedSecret = [u8; SHARED_SECRET_SIZE];

/// A key pair expanded from a 64-byte seed.
pub struct KeyPair {
    /// Decapsulation key (private key), wiped on drop.
    pub decapsulation_key: Zeroizing<Vec<u8>>,
    /// Encapsulation key (public key).
    pub encapsulation_key: Vec<u8>,
}

/// Key derivation and encapsulation over any supported parameter set.
///
/// Implementations must be deterministic: all randomness is supplied by the
/// caller, so a probe driven by a seeded RNG always produces the same
/// ciphertext.
///
/// # Example
///
/// ```ignore
/// use mlkem_probe_core::{Kem, ParameterSet};
///
/// let pair = backend.derive_keypair(ParameterSet::MlKem768, &seed)?;
/// let ct = backend.encapsulate(ParameterSet::MlKem768, &pair.encapsulation_key, &m)?;
/// assert_eq!(ct.len(), 1088);
/// ```
pub trait Kem {
    /// Expand a `d || z` seed into a key pair (FIPS 203 ML-KEM.KeyGen_internal).
    fn derive_keypair(&self, params: ParameterSet, seed: &[u8; SEED_SIZE]) -> Result<KeyPair>;

    /// Encapsulate against `ek` with explicit randomness `m`, returning only
    /// the ciphertext bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedKey`](crate::Error::MalformedKey) if `ek`
    /// has the wrong length for `params`.
    fn encapsulate(
        &self,
        params: ParameterSet,
        ek: &[u8],
        randomness: &[u8; ENCAPS_RANDOMNESS_SIZE],
    ) -> Result<Vec<u8>>;
}

/// A decapsulator bound to one decapsulation key.
///
/// Splits decapsulation into two steps so that a timing loop can convert raw
/// bytes into the implementation's ciphertext type before starting its clock
/// and time nothing but [`Decapsulate::decapsulate`].
pub trait Decapsulate {
    /// Ciphertext representation accepted by the implementation.
    type Ciphertext;

    /// Parameter set of the bound key.
    fn params(&self) -> ParameterSet;

    /// Convert raw bytes into a ciphertext.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCiphertextLength`](crate::Error::InvalidCiphertextLength)
    /// if `bytes` is not exactly one ciphertext long.
    fn load_ciphertext(&self, bytes: &[u8]) -> Result<Self::Ciphertext>;

    /// Decapsulate. Invalid ciphertexts yield the implicit-rejection secret.
    fn decapsulate(&self, ct: &Self::Ciphertext) -> SharedSecret;
}
