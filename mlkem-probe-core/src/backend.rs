//! ML-KEM capability backed by `libcrux-ml-kem`.

use crate::params::{ParameterSet, ENCAPS_RANDOMNESS_SIZE, SEED_SIZE};
use crate::traits::{Decapsulate, Kem, KeyPair, SharedSecret};
use crate::{Error, Result};
use libcrux_ml_kem::{mlkem1024, mlkem512, mlkem768};
use zeroize::Zeroizing;

/// Key derivation and encapsulation for all three parameter sets.
#[derive(Clone, Copy, Debug, Default)]
pub struct Libcrux;

fn wrong_ek(params: ParameterSet, ek: &[u8]) -> Error {
    Error::MalformedKey {
        expected: params.encapsulation_key_len(),
        actual: ek.len(),
    }
}

impl Kem for Libcrux {
    fn derive_keypair(&self, params: ParameterSet, seed: &[u8; SEED_SIZE]) -> Result<KeyPair> {
        let seed = Zeroizing::new(*seed);
        let (dk, ek) = match params {
            ParameterSet::MlKem512 => {
                let kp = mlkem512::generate_key_pair(*seed);
                (kp.sk().to_vec(), kp.pk().to_vec())
            }
            ParameterSet::MlKem768 => {
                let kp = mlkem768::generate_key_pair(*seed);
                (kp.sk().to_vec(), kp.pk().to_vec())
            }
            ParameterSet::MlKem1024 => {
                let kp = mlkem1024::generate_key_pair(*seed);
                (kp.sk().to_vec(), kp.pk().to_vec())
            }
        };

        Ok(KeyPair {
            decapsulation_key: Zeroizing::new(dk),
            encapsulation_key: ek,
        })
    }

    fn encapsulate(
        &self,
        params: ParameterSet,
        ek: &[u8],
        randomness: &[u8; ENCAPS_RANDOMNESS_SIZE],
    ) -> Result<Vec<u8>> {
        let ct = match params {
            ParameterSet::MlKem512 => {
                let pk = mlkem512::MlKem512PublicKey::try_from(ek)
                    .map_err(|_| wrong_ek(params, ek))?;
                let (ct, _ss) = mlkem512::encapsulate(&pk, *randomness);
                ct.as_ref().to_vec()
            }
            ParameterSet::MlKem768 => {
                let pk = mlkem768::MlKem768PublicKey::try_from(ek)
                    .map_err(|_| wrong_ek(params, ek))?;
                let (ct, _ss) = mlkem768::encapsulate(&pk, *randomness);
                ct.as_ref().to_vec()
            }
            ParameterSet::MlKem1024 => {
                let pk = mlkem1024::MlKem1024PublicKey::try_from(ek)
                    .map_err(|_| wrong_ek(params, ek))?;
                let (ct, _ss) = mlkem1024::encapsulate(&pk, *randomness);
                ct.as_ref().to_vec()
            }
        };
        Ok(ct)
    }
}

/// Generate a [`Decapsulate`] implementation for one parameter set.
macro_rules! define_decapsulator {
    (
        $(#[$meta:meta])*
        $name:ident, $module:ident, $sk:ident, $ct:ident, $params:expr
    ) => {
        $(#[$meta])*
        pub struct $name {
            key: $module::$sk,
        }

        impl $name {
            /// Bind a decapsulator to raw decapsulation key bytes.
            pub fn new(dk: &[u8]) -> Result<Self> {
                let key = $module::$sk::try_from(dk).map_err(|_| Error::MalformedKey {
                    expected: $params.decapsulation_key_len(),
                    actual: dk.len(),
                })?;
                Ok(Self { key })
            }
        }

        impl Decapsulate for $name {
            type Ciphertext = $module::$ct;

            fn params(&self) -> ParameterSet {
                $params
            }

            fn load_ciphertext(&self, bytes: &[u8]) -> Result<Self::Ciphertext> {
                $module::$ct::try_from(bytes).map_err(|_| Error::InvalidCiphertextLength {
                    expected: $params.ciphertext_len(),
                    actual: bytes.len(),
                })
            }

            #[inline]
            fn decapsulate(&self, ct: &Self::Ciphertext) -> SharedSecret {
                $module::decapsulate(&self.key, ct)
            }
        }
    };
}

define_decapsulator!(
    /// ML-KEM-512 decapsulator.
    Decapsulator512,
    mlkem512,
    MlKem512PrivateKey,
    MlKem512Ciphertext,
    ParameterSet::MlKem512
);

define_decapsulator!(
    /// ML-KEM-768 decapsulator.
    Decapsulator768,
    mlkem768,
    MlKem768PrivateKey,
    MlKem768Ciphertext,
    ParameterSet::MlKem768
);

define_decapsulator!(
    /// ML-KEM-1024 decapsulator.
    Decapsulator1024,
    mlkem1024,
    MlKem1024PrivateKey,
    MlKem1024Ciphertext,
    ParameterSet::MlKem1024
);
