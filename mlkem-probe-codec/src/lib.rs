//! # mlkem-probe codec
//!
//! Lossless conversion between ML-KEM ciphertext bytes and the compressed
//! polynomials they encode, so individual coefficients of `u` and `v` can
//! be addressed and modified.
//!
//! # Example
//!
//! ```
//! use mlkem_probe_codec::{decode, encode, normalize_u_index};
//! use mlkem_probe_core::ParameterSet;
//!
//! let params = ParameterSet::MlKem512;
//! let ct = vec![0u8; params.ciphertext_len()];
//!
//! let (mut u, v) = decode(&ct, params).unwrap();
//! *u.coeff_mut(normalize_u_index(-1, params)) ^= 1;
//! let modified = encode(&u, &v, params);
//!
//! assert_eq!(modified.len(), ct.len());
//! assert_ne!(modified, ct);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod codec;
pub mod encode;
mod poly;
mod polyvec;

pub use codec::{
    decode, decode_u, decode_v, encode, encode_u, encode_v, normalize_index, normalize_u_index,
    normalize_v_index,
};
pub use poly::Poly;
pub use polyvec::PolyVec;
