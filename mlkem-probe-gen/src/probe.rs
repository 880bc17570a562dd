//! The probe catalog.
//!
//! Each probe is a named, arity-tagged recipe for one ciphertext. A probe
//! specification on the command line looks like `name` or
//! `name=p1 p2 ...`, with every parameter either decimal (optionally
//! negative) or hexadecimal with a `0x` prefix.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use mlkem_probe_codec::{
    decode_u, decode_v, encode_u, encode_v, normalize_index, normalize_u_index,
    normalize_v_index, Poly, PolyVec,
};
use mlkem_probe_core::params::ENCAPS_RANDOMNESS_SIZE;
use mlkem_probe_core::{Error, Kem, ParameterSet, PublicKey, Result};
use once_cell::sync::Lazy;
use rand::{Rng, RngCore};

/// Every kind of ciphertext the generator knows how to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    /// Genuine encapsulation output.
    Valid,
    /// Genuine output with one random byte inverted.
    Invalid,
    /// Uniformly random bytes.
    Random,
    /// Genuine output with one u coefficient XOR-ed.
    XorUCoefficient,
    /// Genuine output with one v coefficient XOR-ed.
    XorVCoefficient,
    /// Zero u except one random polynomial, random v bytes.
    OneURemain,
    /// Random u bytes, zero v except one random coefficient.
    OneVRemain,
}

static REGISTRY: Lazy<HashMap<&'static str, ProbeKind>> =
    Lazy::new(|| ProbeKind::ALL.iter().map(|&kind| (kind.name(), kind)).collect());

impl ProbeKind {
    /// All probe kinds, in help-listing order.
    pub const ALL: [ProbeKind; 7] = [
        ProbeKind::Valid,
        ProbeKind::Invalid,
        ProbeKind::Random,
        ProbeKind::XorUCoefficient,
        ProbeKind::XorVCoefficient,
        ProbeKind::OneURemain,
        ProbeKind::OneVRemain,
    ];

    /// Name used in probe specifications.
    pub const fn name(self) -> &'static str {
        match self {
            ProbeKind::Valid => "valid",
            ProbeKind::Invalid => "invalid",
            ProbeKind::Random => "random",
            ProbeKind::XorUCoefficient => "xor_u_coefficient",
            ProbeKind::XorVCoefficient => "xor_v_coefficient",
            ProbeKind::OneURemain => "one_u_remain",
            ProbeKind::OneVRemain => "one_v_remain",
        }
    }

    /// Number of parameters the probe takes.
    pub const fn arity(self) -> usize {
        match self {
            ProbeKind::Valid | ProbeKind::Invalid | ProbeKind::Random => 0,
            ProbeKind::XorUCoefficient | ProbeKind::XorVCoefficient => 2,
            ProbeKind::OneURemain | ProbeKind::OneVRemain => 1,
        }
    }

    /// Documentation printed by `--describe`.
    pub const fn description(self) -> &'static str {
        match self {
            ProbeKind::Valid => "\
    Creates a valid ML-KEM ciphertext by encapsulating against the key.",
            ProbeKind::Invalid => "\
    Creates an invalid ML-KEM ciphertext.

    The ciphertext is made invalid by inverting all bits of one randomly
    selected byte of a valid ciphertext.",
            ProbeKind::Random => "\
    Creates a ciphertext made of uniformly random bytes, without running
    encapsulation at all.",
            ProbeKind::XorUCoefficient => "\
    Creates a ciphertext with one coefficient of the u vector modified.

    pos: global coefficient index into u (k*256 coefficients); negative
         values count from the end, so -1 is the last coefficient
    val: value XOR-ed into the compressed coefficient, 0 < val < 2^du",
            ProbeKind::XorVCoefficient => "\
    Creates a ciphertext with one coefficient of the v polynomial modified.

    pos: coefficient index into v (256 coefficients); negative values count
         from the end, so -1 and 255 are the same coefficient
    val: value XOR-ed into the compressed coefficient, 0 < val < 2^dv",
            ProbeKind::OneURemain => "\
    Creates a ciphertext whose u vector is zero except for one polynomial.

    pos: index of the polynomial that is filled with random du-bit
         coefficients; negative values count from the end
    The v part is filled with random bytes.",
            ProbeKind::OneVRemain => "\
    Creates a ciphertext whose v polynomial is zero except for one
    coefficient.

    pos: index of the coefficient set to a random dv-bit value; negative
         values count from the end
    The u part is filled with random bytes.",
        }
    }

    /// Look a probe up by name.
    pub fn from_name(name: &str) -> Option<Self> {
        REGISTRY.get(name).copied()
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A probe kind bound to its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Probe {
    kind: ProbeKind,
    params: Vec<i64>,
}

fn parse_param(token: &str) -> Option<i64> {
    match token.strip_prefix("0x") {
        Some(hex) => i64::from_str_radix(hex, 16).ok(),
        None => token.parse().ok(),
    }
}

impl Probe {
    /// Bind `params` to `kind`, checking the parameter count.
    pub fn new(kind: ProbeKind, params: Vec<i64>) -> Result<Self> {
        if params.len() != kind.arity() {
            return Err(Error::ArityMismatch {
                probe: kind.name(),
                expected: kind.arity(),
                actual: params.len(),
            });
        }
        Ok(Self { kind, params })
    }

    /// Parse a `name` or `name=p1 p2 ...` specification.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidProbeSpec`] on more than one `=` or an unparsable number
    /// - [`Error::UnknownProbe`] if the name is not in the catalog
    /// - [`Error::ArityMismatch`] on the wrong number of parameters
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = || Error::InvalidProbeSpec {
            spec: spec.to_string(),
        };

        let mut parts = spec.split('=');
        let name = parts.next().unwrap_or_default();
        let params = match (parts.next(), parts.next()) {
            (None, _) => Vec::new(),
            (Some(list), None) => list
                .split(' ')
                .map(parse_param)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(invalid)?,
            (Some(_), Some(_)) => return Err(invalid()),
        };

        let kind = ProbeKind::from_name(name).ok_or_else(|| Error::UnknownProbe {
            name: name.to_string(),
        })?;
        Self::new(kind, params)
    }

    /// The probe kind.
    pub fn kind(&self) -> ProbeKind {
        self.kind
    }

    /// The bound parameters.
    pub fn params(&self) -> &[i64] {
        &self.params
    }

    /// Identifier used for file names and the order log: the name joined
    /// with its parameters by `_`, e.g. `xor_u_coefficient_0_1`.
    pub fn id(&self) -> String {
        let mut id = self.kind.name().to_string();
        for p in &self.params {
            id.push('_');
            id.push_str(&p.to_string());
        }
        id
    }
}

impl FromStr for Probe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Parse a list of specifications, rejecting repeated identifiers.
pub fn parse_probes<S: AsRef<str>>(specs: &[S]) -> Result<Vec<Probe>> {
    let mut seen = HashSet::new();
    let mut probes = Vec::with_capacity(specs.len());
    for spec in specs {
        let probe = Probe::parse(spec.as_ref())?;
        if !seen.insert(probe.id()) {
            return Err(Error::DuplicateProbe { id: probe.id() });
        }
        probes.push(probe);
    }
    Ok(probes)
}

/// Builds probe ciphertexts for one encapsulation key.
pub struct Generator<'a, K: Kem + ?Sized> {
    kem: &'a K,
    key: &'a PublicKey,
}

fn check_xor_value(kind: ProbeKind, val: i64, depth: usize) -> Result<u16> {
    let limit = 1u32 << depth;
    if val <= 0 || val >= i64::from(limit) {
        return Err(Error::ParameterOutOfRange {
            probe: kind.name(),
            value: val,
            limit,
        });
    }
    Ok(val as u16)
}

impl<'a, K: Kem + ?Sized> Generator<'a, K> {
    /// Create a generator encapsulating against `key`.
    pub fn new(kem: &'a K, key: &'a PublicKey) -> Self {
        Self { kem, key }
    }

    /// Parameter set of the key.
    pub fn params(&self) -> ParameterSet {
        self.key.params()
    }

    /// Validate a probe's parameters against the key's parameter set
    /// without generating anything.
    pub fn check(&self, probe: &Probe) -> Result<()> {
        let params = self.params();
        match (probe.kind(), probe.params()) {
            (ProbeKind::XorUCoefficient, &[_, val]) => {
                check_xor_value(probe.kind(), val, params.du()).map(drop)
            }
            (ProbeKind::XorVCoefficient, &[_, val]) => {
                check_xor_value(probe.kind(), val, params.dv()).map(drop)
            }
            _ => Ok(()),
        }
    }

    /// Build one ciphertext for `probe`, drawing all randomness from `rng`.
    ///
    /// The result is always exactly `ciphertext_len` bytes.
    pub fn generate(&self, probe: &Probe, rng: &mut dyn RngCore) -> Result<Vec<u8>> {
        let params = self.params();
        match (probe.kind(), probe.params()) {
            (ProbeKind::Valid, []) => self.encapsulate(rng),
            (ProbeKind::Invalid, []) => self.invalid(rng),
            (ProbeKind::Random, []) => Ok(random_bytes(params.ciphertext_len(), rng)),
            (ProbeKind::XorUCoefficient, &[pos, val]) => {
                let val = check_xor_value(probe.kind(), val, params.du())?;
                self.xor_u_coefficient(pos, val, rng)
            }
            (ProbeKind::XorVCoefficient, &[pos, val]) => {
                let val = check_xor_value(probe.kind(), val, params.dv())?;
                self.xor_v_coefficient(pos, val, rng)
            }
            (ProbeKind::OneURemain, &[pos]) => Ok(self.one_u_remain(pos, rng)),
            (ProbeKind::OneVRemain, &[pos]) => Ok(self.one_v_remain(pos, rng)),
            (kind, args) => Err(Error::ArityMismatch {
                probe: kind.name(),
                expected: kind.arity(),
                actual: args.len(),
            }),
        }
    }

    fn encapsulate(&self, rng: &mut dyn RngCore) -> Result<Vec<u8>> {
        let mut m = [0u8; ENCAPS_RANDOMNESS_SIZE];
        rng.fill_bytes(&mut m);
        self.kem
            .encapsulate(self.params(), self.key.as_bytes(), &m)
    }

    fn invalid(&self, rng: &mut dyn RngCore) -> Result<Vec<u8>> {
        let mut ct = self.encapsulate(rng)?;
        let pos = rng.random_range(0..ct.len());
        ct[pos] ^= 0xFF;
        Ok(ct)
    }

    fn xor_u_coefficient(&self, pos: i64, val: u16, rng: &mut dyn RngCore) -> Result<Vec<u8>> {
        let params = self.params();
        let mut ct = self.encapsulate(rng)?;
        let (u_bytes, _) = ct.split_at_mut(params.u_len());

        let mut u = decode_u(u_bytes, params);
        *u.coeff_mut(normalize_u_index(pos, params)) ^= val;
        u_bytes.copy_from_slice(&encode_u(&u, params));
        Ok(ct)
    }

    fn xor_v_coefficient(&self, pos: i64, val: u16, rng: &mut dyn RngCore) -> Result<Vec<u8>> {
        let params = self.params();
        let mut ct = self.encapsulate(rng)?;
        let (_, v_bytes) = ct.split_at_mut(params.u_len());

        let mut v = decode_v(v_bytes, params);
        v.coeffs[normalize_v_index(pos)] ^= val;
        v_bytes.copy_from_slice(&encode_v(&v, params));
        Ok(ct)
    }

    fn one_u_remain(&self, pos: i64, rng: &mut dyn RngCore) -> Vec<u8> {
        let params = self.params();
        let mut u = PolyVec::new(params.k());
        let bound = 1u16 << params.du();
        for c in u.polys[normalize_index(pos, params.k())].coeffs.iter_mut() {
            *c = rng.random_range(0..bound);
        }

        let mut ct = encode_u(&u, params);
        ct.extend_from_slice(&random_bytes(params.v_len(), rng));
        ct
    }

    fn one_v_remain(&self, pos: i64, rng: &mut dyn RngCore) -> Vec<u8> {
        let params = self.params();
        let mut ct = random_bytes(params.u_len(), rng);

        let mut v = Poly::new();
        v.coeffs[normalize_v_index(pos)] = rng.random_range(0..1u16 << params.dv());
        ct.extend_from_slice(&encode_v(&v, params));
        ct
    }
}

fn random_bytes(len: usize, rng: &mut dyn RngCore) -> Vec<u8> {
    let mut out = vec![0u8; len];
    rng.fill_bytes(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlkem_probe_codec::decode;
    use mlkem_probe_core::backend::Libcrux;
    use mlkem_probe_core::params::SEED_SIZE;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn key_for(params: ParameterSet) -> PublicKey {
        let pair = Libcrux.derive_keypair(params, &[0x11; SEED_SIZE]).unwrap();
        PublicKey::from_bytes(params, &pair.encapsulation_key).unwrap()
    }

    fn probe(spec: &str) -> Probe {
        Probe::parse(spec).unwrap()
    }

    #[test]
    fn test_registry_lookup() {
        for kind in ProbeKind::ALL {
            assert_eq!(ProbeKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ProbeKind::from_name("xor_w_coefficient"), None);
    }

    #[test]
    fn test_parse_specs() {
        let p = probe("valid");
        assert_eq!(p.kind(), ProbeKind::Valid);
        assert!(p.params().is_empty());
        assert_eq!(p.id(), "valid");

        let p = probe("xor_u_coefficient=0 1");
        assert_eq!(p.params(), &[0, 1]);
        assert_eq!(p.id(), "xor_u_coefficient_0_1");

        let p = probe("xor_v_coefficient=-1 0x0f");
        assert_eq!(p.params(), &[-1, 15]);
        assert_eq!(p.to_string(), "xor_v_coefficient_-1_15");

        let p: Probe = "one_u_remain=0x1".parse().unwrap();
        assert_eq!(p.params(), &[1]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Probe::parse("bogus"),
            Err(Error::UnknownProbe { name }) if name == "bogus"
        ));
        assert!(matches!(
            Probe::parse("xor_u_coefficient=1"),
            Err(Error::ArityMismatch {
                probe: "xor_u_coefficient",
                expected: 2,
                actual: 1
            })
        ));
        assert!(matches!(
            Probe::parse("valid=1"),
            Err(Error::ArityMismatch { expected: 0, .. })
        ));
        assert!(matches!(
            Probe::parse("one_v_remain=1=2"),
            Err(Error::InvalidProbeSpec { .. })
        ));
        assert!(matches!(
            Probe::parse("one_v_remain=abc"),
            Err(Error::InvalidProbeSpec { .. })
        ));
        assert!(matches!(
            Probe::parse("xor_u_coefficient=1  2"),
            Err(Error::InvalidProbeSpec { .. })
        ));
    }

    #[test]
    fn test_duplicates_rejected() {
        let probes = parse_probes(&["valid", "invalid", "xor_u_coefficient=0 1"]).unwrap();
        assert_eq!(probes.len(), 3);

        assert!(matches!(
            parse_probes(&["valid", "valid"]),
            Err(Error::DuplicateProbe { id }) if id == "valid"
        ));
        assert!(matches!(
            parse_probes(&["one_u_remain=1", "one_u_remain=0x1"]),
            Err(Error::DuplicateProbe { id }) if id == "one_u_remain_1"
        ));
        // Different parameters are different probes.
        assert!(parse_probes(&["one_u_remain=0", "one_u_remain=-1"]).is_ok());
    }

    #[test]
    fn test_every_probe_has_ciphertext_length() {
        let specs = [
            "valid",
            "invalid",
            "random",
            "xor_u_coefficient=0 1",
            "xor_v_coefficient=-1 1",
            "one_u_remain=1",
            "one_v_remain=255",
        ];
        let mut rng = StdRng::seed_from_u64(1);
        for params in ParameterSet::ALL {
            let key = key_for(params);
            let gen = Generator::new(&Libcrux, &key);
            for spec in specs {
                let ct = gen.generate(&probe(spec), &mut rng).unwrap();
                assert_eq!(ct.len(), params.ciphertext_len(), "{} {}", params, spec);
            }
        }
    }

    #[test]
    fn test_same_rng_same_output() {
        let key = key_for(ParameterSet::MlKem768);
        let gen = Generator::new(&Libcrux, &key);
        let p = probe("invalid");
        let a = gen.generate(&p, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = gen.generate(&p, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_flips_exactly_one_byte() {
        let key = key_for(ParameterSet::MlKem512);
        let gen = Generator::new(&Libcrux, &key);

        // The encapsulation randomness is drawn first, so replaying the seed
        // for `valid` yields the unmodified ciphertext.
        let valid = gen
            .generate(&probe("valid"), &mut StdRng::seed_from_u64(3))
            .unwrap();
        let invalid = gen
            .generate(&probe("invalid"), &mut StdRng::seed_from_u64(3))
            .unwrap();

        let diffs: Vec<_> = valid
            .iter()
            .zip(&invalid)
            .filter(|(a, b)| a != b)
            .map(|(a, b)| a ^ b)
            .collect();
        assert_eq!(diffs, vec![0xFF]);
    }

    #[test]
    fn test_xor_value_range() {
        let key = key_for(ParameterSet::MlKem512);
        let gen = Generator::new(&Libcrux, &key);
        let mut rng = StdRng::seed_from_u64(5);

        for spec in ["xor_u_coefficient=0 0", "xor_u_coefficient=0 1024"] {
            let p = probe(spec);
            assert!(matches!(
                gen.check(&p),
                Err(Error::ParameterOutOfRange { limit: 1024, .. })
            ));
            assert!(gen.generate(&p, &mut rng).is_err());
        }
        assert!(gen.check(&probe("xor_u_coefficient=0 1023")).is_ok());

        for spec in ["xor_v_coefficient=0 0", "xor_v_coefficient=0 16", "xor_v_coefficient=0 -1"] {
            assert!(matches!(
                gen.check(&probe(spec)),
                Err(Error::ParameterOutOfRange {
                    probe: "xor_v_coefficient",
                    limit: 16,
                    ..
                })
            ));
        }
        assert!(gen.check(&probe("xor_v_coefficient=0 15")).is_ok());

        let key = key_for(ParameterSet::MlKem1024);
        let gen = Generator::new(&Libcrux, &key);
        assert!(gen.check(&probe("xor_u_coefficient=0 2047")).is_ok());
        assert!(gen.check(&probe("xor_v_coefficient=0 31")).is_ok());
        assert!(gen.check(&probe("xor_v_coefficient=0 32")).is_err());
    }

    #[test]
    fn test_xor_v_touches_only_v() {
        let params = ParameterSet::MlKem768;
        let key = key_for(params);
        let gen = Generator::new(&Libcrux, &key);

        let valid = gen
            .generate(&probe("valid"), &mut StdRng::seed_from_u64(8))
            .unwrap();
        let modified = gen
            .generate(&probe("xor_v_coefficient=-1 3"), &mut StdRng::seed_from_u64(8))
            .unwrap();

        assert_eq!(valid[..params.u_len()], modified[..params.u_len()]);
        let (_, v_valid) = decode(&valid, params).unwrap();
        let (_, v_mod) = decode(&modified, params).unwrap();
        assert_eq!(v_valid.coeffs[255] ^ 3, v_mod.coeffs[255]);
        assert_eq!(v_valid.coeffs[..255], v_mod.coeffs[..255]);
    }

    #[test]
    fn test_negative_and_positive_positions_agree() {
        let params = ParameterSet::MlKem512;
        let key = key_for(params);
        let gen = Generator::new(&Libcrux, &key);

        let a = gen
            .generate(&probe("xor_u_coefficient=-1 5"), &mut StdRng::seed_from_u64(2))
            .unwrap();
        let b = gen
            .generate(&probe("xor_u_coefficient=511 5"), &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(a, b);

        let a = gen
            .generate(&probe("one_v_remain=-1"), &mut StdRng::seed_from_u64(2))
            .unwrap();
        let b = gen
            .generate(&probe("one_v_remain=255"), &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_one_u_remain_shape() {
        for params in ParameterSet::ALL {
            let key = key_for(params);
            let gen = Generator::new(&Libcrux, &key);
            let ct = gen
                .generate(&probe("one_u_remain=-1"), &mut StdRng::seed_from_u64(4))
                .unwrap();
            let (u, _) = decode(&ct, params).unwrap();
            let last = params.k() - 1;
            for (i, poly) in u.polys.iter().enumerate() {
                assert_eq!(poly.is_zero(), i != last, "{} poly {}", params, i);
            }
        }
    }

    #[test]
    fn test_one_v_remain_shape() {
        let params = ParameterSet::MlKem1024;
        let key = key_for(params);
        let gen = Generator::new(&Libcrux, &key);
        let ct = gen
            .generate(&probe("one_v_remain=7"), &mut StdRng::seed_from_u64(6))
            .unwrap();
        let (_, v) = decode(&ct, params).unwrap();
        assert!(v
            .coeffs
            .iter()
            .enumerate()
            .all(|(i, &c)| i == 7 || c == 0));
        assert!(v.coeffs[7] < 32);
    }

    #[test]
    fn test_descriptions_present() {
        for kind in ProbeKind::ALL {
            assert!(!kind.description().trim().is_empty(), "{}", kind);
        }
    }
}
