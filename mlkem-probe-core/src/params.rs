//! ML-KEM parameter sets as defined in FIPS 203.

use core::fmt;

/// Polynomial ring dimension (n).
pub const N: usize = 256;

/// Size of the seed a decapsulation key can be expanded from (d || z).
pub const SEED_SIZE: usize = 64;

/// Size of the encapsulation randomness (m).
pub const ENCAPS_RANDOMNESS_SIZE: usize = 32;

/// Shared secret size in bytes.
pub const SHARED_SECRET_SIZE: usize = 32;

/// OID arc prefix shared by all ML-KEM algorithm identifiers
/// (`2.16.840.1.101.3.4.4`).
const ML_KEM_OID_PREFIX: [u64; 8] = [2, 16, 840, 1, 101, 3, 4, 4];

/// An ML-KEM parameter set.
///
/// Derived once from a decoded algorithm identifier and never changed
/// afterwards; all sizes are computed from the module rank and the two
/// compression depths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterSet {
    /// ML-KEM-512 (NIST Security Level 1).
    MlKem512,
    /// ML-KEM-768 (NIST Security Level 3).
    MlKem768,
    /// ML-KEM-1024 (NIST Security Level 5).
    MlKem1024,
}

impl ParameterSet {
    /// All supported parameter sets.
    pub const ALL: [ParameterSet; 3] = [
        ParameterSet::MlKem512,
        ParameterSet::MlKem768,
        ParameterSet::MlKem1024,
    ];

    /// Human-readable name, e.g. `ML-KEM-768`.
    pub const fn name(self) -> &'static str {
        match self {
            ParameterSet::MlKem512 => "ML-KEM-512",
            ParameterSet::MlKem768 => "ML-KEM-768",
            ParameterSet::MlKem1024 => "ML-KEM-1024",
        }
    }

    /// Module rank (k).
    pub const fn k(self) -> usize {
        match self {
            ParameterSet::MlKem512 => 2,
            ParameterSet::MlKem768 => 3,
            ParameterSet::MlKem1024 => 4,
        }
    }

    /// Compression depth of the u vector (du).
    pub const fn du(self) -> usize {
        match self {
            ParameterSet::MlKem512 | ParameterSet::MlKem768 => 10,
            ParameterSet::MlKem1024 => 11,
        }
    }

    /// Compression depth of the v polynomial (dv).
    pub const fn dv(self) -> usize {
        match self {
            ParameterSet::MlKem512 | ParameterSet::MlKem768 => 4,
            ParameterSet::MlKem1024 => 5,
        }
    }

    /// Decapsulation key size: `768k + 96`.
    pub const fn decapsulation_key_len(self) -> usize {
        768 * self.k() + 96
    }

    /// Encapsulation key size: `384k + 32`.
    pub const fn encapsulation_key_len(self) -> usize {
        384 * self.k() + 32
    }

    /// Size of the compressed u region: `32 * du * k`.
    pub const fn u_len(self) -> usize {
        32 * self.du() * self.k()
    }

    /// Size of the compressed v region: `32 * dv`.
    pub const fn v_len(self) -> usize {
        32 * self.dv()
    }

    /// Ciphertext size: `32 * (du * k + dv)`.
    pub const fn ciphertext_len(self) -> usize {
        self.u_len() + self.v_len()
    }

    /// Last arc of the algorithm OID under `2.16.840.1.101.3.4.4`.
    const fn oid_suffix(self) -> u64 {
        match self {
            ParameterSet::MlKem512 => 1,
            ParameterSet::MlKem768 => 2,
            ParameterSet::MlKem1024 => 3,
        }
    }

    /// Full OID arcs of the algorithm identifier.
    pub fn oid(self) -> Vec<u64> {
        let mut arcs = ML_KEM_OID_PREFIX.to_vec();
        arcs.push(self.oid_suffix());
        arcs
    }

    /// Look up a parameter set by its OID arcs.
    pub fn from_oid(arcs: &[u64]) -> Option<Self> {
        let (last, prefix) = arcs.split_last()?;
        if prefix != ML_KEM_OID_PREFIX.as_slice() {
            return None;
        }
        Self::ALL.into_iter().find(|p| p.oid_suffix() == *last)
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
