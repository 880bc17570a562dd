//! # mlkem-probe core
//!
//! Shared building blocks for generating ML-KEM timing probes and measuring
//! decapsulation against them.
//!
//! This crate provides:
//! - The common [`Error`] type
//! - [`ParameterSet`] with all FIPS 203 sizes derived from `k`, `du`, `dv`
//! - Capability traits for the KEM mathematics ([`Kem`], [`Decapsulate`])
//! - Key container import (PEM/DER, SPKI- and PKCS#8-shaped)
//! - A `libcrux-ml-kem` backed implementation of the capabilities

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod der;
mod error;
pub mod key;
pub mod params;
pub mod pem;
mod traits;

#[cfg(feature = "libcrux")]
pub mod backend;

pub use error::{Error, Result};
pub use key::{
    import_private_key, import_public_key, read_private_key_file, read_public_key_file,
    PrivateKey, PublicKey,
};
pub use params::ParameterSet;
pub use traits::{Decapsulate, Kem, KeyPair, SharedSecret};

/// Re-export zeroize for convenience.
pub use zeroize::{Zeroize, Zeroizing};
