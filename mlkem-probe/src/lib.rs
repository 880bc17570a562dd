//! # mlkem-probe
//!
//! Tooling for testing ML-KEM decapsulation against timing side channels.
//!
//! The workflow has two halves:
//!
//! 1. **Generation**: import an encapsulation key, build a set of probe
//!    ciphertexts (valid, invalid, random, or with individual compressed
//!    coefficients modified) and write them as a corpus whose order is
//!    persisted in `log.csv`.
//! 2. **Measurement**: the `mlkem-probe-timing` crate replays the corpus
//!    through decapsulation and records one nanosecond timing per record.
//!
//! ## Features
//!
//! - `libcrux` (default): ML-KEM capability backed by `libcrux-ml-kem`
//!
//! ## Example
//!
//! ```
//! use mlkem_probe::kem::backend::Libcrux;
//! use mlkem_probe::kem::{Kem, ParameterSet, PublicKey};
//! use mlkem_probe::probes::{Generator, Probe};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let params = ParameterSet::MlKem768;
//! let pair = Libcrux.derive_keypair(params, &[7u8; 64]).unwrap();
//! let key = PublicKey::from_bytes(params, &pair.encapsulation_key).unwrap();
//!
//! let generator = Generator::new(&Libcrux, &key);
//! let probe = Probe::parse("xor_v_coefficient=-1 1").unwrap();
//! let ct = generator.generate(&probe, &mut StdRng::seed_from_u64(0)).unwrap();
//! assert_eq!(ct.len(), 1088);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub use mlkem_probe_core::{Error, ParameterSet, Result};

/// Parameter sets, key import and KEM capabilities.
pub mod kem {
    pub use mlkem_probe_core::*;
}

/// Ciphertext codec over compressed polynomials.
pub mod codec {
    pub use mlkem_probe_codec::*;
}

/// Probe catalog, order log and corpus writer.
pub mod probes {
    pub use mlkem_probe_gen::*;
}
