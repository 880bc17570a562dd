//! Ciphertext <-> (u, v) conversion.
//!
//! A ciphertext is `ByteEncode_du(u[0]) || ... || ByteEncode_du(u[k-1]) ||
//! ByteEncode_dv(v)`. The u region is `32 * du * k` bytes long and v takes
//! the remaining `32 * dv`.

use crate::encode::{byte_decode, byte_encode, encoded_len};
use crate::poly::Poly;
use crate::polyvec::PolyVec;
use mlkem_probe_core::params::N;
use mlkem_probe_core::{Error, ParameterSet, Result};

/// Split a ciphertext into its compressed `u` vector and `v` polynomial.
///
/// Fails with [`Error::InvalidCiphertextLength`] unless `bytes` is exactly
/// one ciphertext for `params`.
pub fn decode(bytes: &[u8], params: ParameterSet) -> Result<(PolyVec, Poly)> {
    if bytes.len() != params.ciphertext_len() {
        return Err(Error::InvalidCiphertextLength {
            expected: params.ciphertext_len(),
            actual: bytes.len(),
        });
    }
    let (u_bytes, v_bytes) = bytes.split_at(params.u_len());
    Ok((decode_u(u_bytes, params), decode_v(v_bytes, params)))
}

/// Concatenate the encodings of `u` and `v`.
///
/// # Panics
///
/// Panics if `u` does not hold exactly `k` polynomials.
pub fn encode(u: &PolyVec, v: &Poly, params: ParameterSet) -> Vec<u8> {
    let mut out = encode_u(u, params);
    out.extend_from_slice(&encode_v(v, params));
    out
}

/// Decode the u region (`params.u_len()` bytes).
pub fn decode_u(bytes: &[u8], params: ParameterSet) -> PolyVec {
    let du = params.du();
    PolyVec {
        polys: bytes
            .chunks_exact(encoded_len(du))
            .take(params.k())
            .map(|chunk| byte_decode(chunk, du))
            .collect(),
    }
}

/// Decode the v region (`params.v_len()` bytes).
pub fn decode_v(bytes: &[u8], params: ParameterSet) -> Poly {
    byte_decode(bytes, params.dv())
}

/// Encode `u` into `params.u_len()` bytes.
///
/// # Panics
///
/// Panics if `u` does not hold exactly `k` polynomials.
pub fn encode_u(u: &PolyVec, params: ParameterSet) -> Vec<u8> {
    assert_eq!(u.len(), params.k(), "u must hold k polynomials");
    let du = params.du();
    let mut out = vec![0u8; params.u_len()];
    for (poly, chunk) in u.polys.iter().zip(out.chunks_exact_mut(encoded_len(du))) {
        byte_encode(poly, du, chunk);
    }
    out
}

/// Encode `v` into `params.v_len()` bytes.
pub fn encode_v(v: &Poly, params: ParameterSet) -> Vec<u8> {
    let mut out = vec![0u8; params.v_len()];
    byte_encode(v, params.dv(), &mut out);
    out
}

/// Map any integer onto `[0, period)` with Euclidean remainder, so `-1`
/// addresses the last element.
///
/// # Panics
///
/// Panics if `period` is zero.
#[inline]
pub fn normalize_index(pos: i64, period: usize) -> usize {
    pos.rem_euclid(period as i64) as usize
}

/// Normalize a global u coefficient index (period `k * 256`).
#[inline]
pub fn normalize_u_index(pos: i64, params: ParameterSet) -> usize {
    normalize_index(pos, params.k() * N)
}

/// Normalize a v coefficient index (period 256).
#[inline]
pub fn normalize_v_index(pos: i64) -> usize {
    normalize_index(pos, N)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 131 + 7) as u8).collect()
    }

    #[test]
    fn test_decode_shapes() {
        for params in ParameterSet::ALL {
            let bytes = pattern(params.ciphertext_len());
            let (u, v) = decode(&bytes, params).unwrap();
            assert_eq!(u.len(), params.k());
            let u_max = 1u16 << params.du();
            assert!(u.polys.iter().all(|p| p.coeffs.iter().all(|&c| c < u_max)));
            assert!(v.coeffs.iter().all(|&c| c < (1 << params.dv())));
        }
    }

    #[test]
    fn test_encode_inverts_decode() {
        for params in ParameterSet::ALL {
            let bytes = pattern(params.ciphertext_len());
            let (u, v) = decode(&bytes, params).unwrap();
            assert_eq!(encode(&u, &v, params), bytes, "{}", params);
        }
    }

    #[test]
    fn test_region_lengths() {
        for params in ParameterSet::ALL {
            let u = PolyVec::new(params.k());
            let v = Poly::new();
            assert_eq!(encode_u(&u, params).len(), params.u_len());
            assert_eq!(encode_v(&v, params).len(), params.v_len());
            assert_eq!(encode(&u, &v, params).len(), params.ciphertext_len());
        }
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let result = decode(&[0u8; 1087], ParameterSet::MlKem768);
        assert!(matches!(
            result,
            Err(Error::InvalidCiphertextLength {
                expected: 1088,
                actual: 1087
            })
        ));
    }

    #[test]
    fn test_v_is_independent_of_u() {
        let params = ParameterSet::MlKem512;
        let mut bytes = vec![0u8; params.ciphertext_len()];
        bytes[params.u_len()] = 0x0A;
        let (u, v) = decode(&bytes, params).unwrap();
        assert!(u.polys.iter().all(Poly::is_zero));
        assert_eq!(v.coeffs[0], 0x0A);
    }

    #[test]
    fn test_negative_index_normalization() {
        let params = ParameterSet::MlKem768;
        assert_eq!(normalize_u_index(-1, params), 3 * 256 - 1);
        assert_eq!(normalize_u_index(3 * 256 - 1, params), 3 * 256 - 1);
        assert_eq!(normalize_u_index(3 * 256, params), 0);
        assert_eq!(normalize_u_index(-3 * 256 - 1, params), 3 * 256 - 1);

        assert_eq!(normalize_v_index(-1), 255);
        assert_eq!(normalize_v_index(255), 255);
        assert_eq!(normalize_v_index(256), 0);
        assert_eq!(normalize_v_index(-256), 0);
    }

    #[test]
    fn test_normalize_extremes() {
        assert_eq!(normalize_index(i64::MIN, 256), 0);
        assert_eq!(normalize_index(i64::MAX, 256), 255);
    }
}
