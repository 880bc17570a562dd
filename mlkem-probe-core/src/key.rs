//! Key container import.
//!
//! Recovers the parameter set and key bytes from PEM- or DER-encoded
//! containers of the shape
//!
//! ```text
//! SEQUENCE {
//!     version    INTEGER,            -- private keys only, must be 0
//!     algorithm  SEQUENCE { OBJECT IDENTIFIER },
//!     key        OCTET STRING | BIT STRING
//! }
//! ```
//!
//! Private key payloads come in two forms, told apart by length: a 64-byte
//! seed that is expanded with a [`Kem`] capability, or a nested OCTET STRING
//! holding `dk || ek`.

use crate::der::{format_oid, Reader};
use crate::params::{ParameterSet, SEED_SIZE};
use crate::pem::container_bytes;
use crate::traits::Kem;
use crate::{Error, Result};
use std::fs;
use std::path::Path;
use zeroize::Zeroizing;

/// An imported encapsulation (public) key.
#[derive(Clone, Debug)]
pub struct PublicKey {
    params: ParameterSet,
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Wrap raw encapsulation key bytes for `params`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedKey`] if the length does not match `params`.
    pub fn from_bytes(params: ParameterSet, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != params.encapsulation_key_len() {
            return Err(Error::MalformedKey {
                expected: params.encapsulation_key_len(),
                actual: bytes.len(),
            });
        }
        Ok(Self {
            params,
            bytes: bytes.to_vec(),
        })
    }

    /// Parameter set named by the container's algorithm identifier.
    pub fn params(&self) -> ParameterSet {
        self.params
    }

    /// Raw encapsulation key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// An imported decapsulation (private) key together with its
/// encapsulation key.
pub struct PrivateKey {
    params: ParameterSet,
    dk: Zeroizing<Vec<u8>>,
    ek: Vec<u8>,
}

impl PrivateKey {
    /// Parameter set named by the container's algorithm identifier.
    pub fn params(&self) -> ParameterSet {
        self.params
    }

    /// Raw decapsulation key bytes.
    pub fn decapsulation_key(&self) -> &[u8] {
        &self.dk
    }

    /// Raw encapsulation key bytes.
    pub fn encapsulation_key(&self) -> &[u8] {
        &self.ek
    }
}

/// Parse an AlgorithmIdentifier holding exactly one recognised OID.
fn read_algorithm(outer: &mut Reader<'_>) -> Result<ParameterSet> {
    let mut alg = outer.read_sequence()?;
    let oid = alg.read_oid()?;
    let params = ParameterSet::from_oid(&oid).ok_or_else(|| Error::UnrecognizedAlgorithm {
        oid: format_oid(&oid),
    })?;
    alg.finish("algorithm OID")?;
    Ok(params)
}

/// Import an encapsulation key from PEM text or raw DER.
///
/// # Errors
///
/// - [`Error::MalformedPem`] / [`Error::MalformedDer`] on framing or structure errors
/// - [`Error::UnrecognizedAlgorithm`] if the OID is not an ML-KEM identifier
/// - [`Error::TrailingData`] if any field is followed by unexpected bytes
/// - [`Error::MalformedKey`] if the key length does not match the parameter set
pub fn import_public_key(input: &[u8]) -> Result<PublicKey> {
    let der = container_bytes(input)?;

    let mut top = Reader::new(&der);
    let mut outer = top.read_sequence()?;
    top.finish("public key container")?;

    let params = read_algorithm(&mut outer)?;
    let key = outer.read_bit_string()?;
    outer.finish("public key BIT STRING")?;

    let key = PublicKey::from_bytes(params, key)?;
    tracing::debug!(params = %params, "imported encapsulation key");
    Ok(key)
}

/// Import a decapsulation key from PEM text or raw DER.
///
/// A 64-byte seed payload is expanded through `kem`; an expanded payload is
/// split at `768k + 96` into the decapsulation and encapsulation keys.
///
/// # Errors
///
/// As [`import_public_key`], plus [`Error::MalformedDer`] if the version is
/// not 0.
pub fn import_private_key<K: Kem + ?Sized>(input: &[u8], kem: &K) -> Result<PrivateKey> {
    let der = container_bytes(input)?;

    let mut top = Reader::new(&der);
    let mut outer = top.read_sequence()?;
    top.finish("private key container")?;

    if outer.read_small_uint()? != 0 {
        return Err(Error::MalformedDer {
            context: "unexpected format version",
        });
    }

    let params = read_algorithm(&mut outer)?;
    let payload = outer.read_octet_string()?;
    outer.finish("private key OCTET STRING")?;

    if payload.len() == SEED_SIZE {
        let mut seed = Zeroizing::new([0u8; SEED_SIZE]);
        seed.copy_from_slice(payload);
        let pair = kem.derive_keypair(params, &seed)?;

        tracing::debug!(params = %params, "expanded decapsulation key from seed");
        return Ok(PrivateKey {
            params,
            dk: pair.decapsulation_key,
            ek: pair.encapsulation_key,
        });
    }

    let mut inner = Reader::new(payload);
    let keys = inner.read_octet_string()?;
    inner.finish("expanded key")?;

    let dk_len = params.decapsulation_key_len();
    let ek_len = params.encapsulation_key_len();
    if keys.len() != dk_len + ek_len {
        return Err(Error::MalformedKey {
            expected: ek_len,
            actual: keys.len().saturating_sub(dk_len),
        });
    }
    let (dk, ek) = keys.split_at(dk_len);

    tracing::debug!(params = %params, "imported expanded decapsulation key");
    Ok(PrivateKey {
        params,
        dk: Zeroizing::new(dk.to_vec()),
        ek: ek.to_vec(),
    })
}

/// Read and import an encapsulation key file.
pub fn read_public_key_file(path: impl AsRef<Path>) -> Result<PublicKey> {
    let data = fs::read(path)?;
    import_public_key(&data)
}

/// Read and import a decapsulation key file.
pub fn read_private_key_file<K: Kem + ?Sized>(
    path: impl AsRef<Path>,
    kem: &K,
) -> Result<PrivateKey> {
    let data = Zeroizing::new(fs::read(path)?);
    import_private_key(&data, kem)
}
