//! Harness and binary tests against a corpus produced by the generator.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use mlkem_probe_core::backend::{Decapsulator768, Libcrux};
use mlkem_probe_core::{Error, Kem, ParameterSet, PublicKey};
use mlkem_probe_gen::{parse_probes, CorpusWriter, Generator, Status, CIPHERS_FILE};
use mlkem_probe_timing::{run, HEADER};
use rand::rngs::StdRng;
use rand::SeedableRng;

const SEED: [u8; 64] = [0x33; 64];

/// Generate a 768 corpus of `repeat` runs over three probes.
fn corpus(dir: &Path, repeat: usize) -> PathBuf {
    let params = ParameterSet::MlKem768;
    let pair = Libcrux.derive_keypair(params, &SEED).unwrap();
    let key = PublicKey::from_bytes(params, &pair.encapsulation_key).unwrap();

    let writer = CorpusWriter::new(
        Generator::new(&Libcrux, &key),
        parse_probes(&["valid", "invalid", "xor_u_coefficient=-1 1"]).unwrap(),
        dir,
    )
    .unwrap();
    let status = Status::new(writer.record_count(repeat));
    writer
        .write_repeated(repeat, &mut StdRng::seed_from_u64(1), &status)
        .unwrap();
    dir.join(CIPHERS_FILE)
}

/// PKCS#8-shaped container holding the 64-byte seed.
fn seed_key_der(params: ParameterSet) -> Vec<u8> {
    let last = match params {
        ParameterSet::MlKem512 => 1,
        ParameterSet::MlKem768 => 2,
        ParameterSet::MlKem1024 => 3,
    };
    let mut der = vec![
        0x30, 0x52, // SEQUENCE, 82 bytes
        0x02, 0x01, 0x00, // version 0
        0x30, 0x0B, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x04, last,
        0x04, 0x40, // OCTET STRING, 64 bytes
    ];
    der.extend_from_slice(&SEED);
    der
}

#[test]
fn one_timing_line_per_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = corpus(dir.path(), 4);

    let pair = Libcrux
        .derive_keypair(ParameterSet::MlKem768, &SEED)
        .unwrap();
    let dec = Decapsulator768::new(&pair.decapsulation_key).unwrap();

    let mut out = Vec::new();
    let count = run(&dec, fs::File::open(&path).unwrap(), &mut out).unwrap();
    assert_eq!(count, 12);

    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(HEADER));
    let times: Vec<u64> = lines.map(|l| l.parse().unwrap()).collect();
    assert_eq!(times.len(), 12);
}

#[test]
fn truncated_corpus_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = corpus(dir.path(), 1);
    let mut bytes = fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 1);

    let pair = Libcrux
        .derive_keypair(ParameterSet::MlKem768, &SEED)
        .unwrap();
    let dec = Decapsulator768::new(&pair.decapsulation_key).unwrap();

    let mut out = Vec::new();
    let result = run(&dec, bytes.as_slice(), &mut out);
    assert!(matches!(
        result,
        Err(Error::MalformedCorpus {
            expected: 1088,
            actual: 1087
        })
    ));
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
}

#[test]
fn binary_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = corpus(dir.path(), 2);
    let key = dir.path().join("dk.der");
    fs::write(&key, seed_key_der(ParameterSet::MlKem768)).unwrap();
    let out = dir.path().join("timing.csv");

    let status = Command::new(env!("CARGO_BIN_EXE_ml_kem_decap"))
        .arg("-i")
        .arg(&path)
        .arg("-o")
        .arg(&out)
        .arg("-k")
        .arg(&key)
        .args(["-n", "1088"])
        .status()
        .unwrap();
    assert!(status.success());

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 1 + 6);
    assert!(text.starts_with("raw times\n"));
}

#[test]
fn binary_rejects_wrong_width_and_missing_options() {
    let dir = tempfile::tempdir().unwrap();
    let path = corpus(dir.path(), 1);
    let key = dir.path().join("dk.der");
    fs::write(&key, seed_key_der(ParameterSet::MlKem768)).unwrap();
    let out = dir.path().join("timing.csv");

    let output = Command::new(env!("CARGO_BIN_EXE_ml_kem_decap"))
        .arg("-i")
        .arg(&path)
        .arg("-o")
        .arg(&out)
        .arg("-k")
        .arg(&key)
        .args(["-n", "768"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(!out.exists());

    let cases: [(&[&str], &str); 4] = [
        (&["-o", "x", "-k", "y", "-n", "1"], "no input file specified (-i)"),
        (&["-i", "x", "-k", "y", "-n", "1"], "no output file specified (-o)"),
        (&["-i", "x", "-o", "y", "-n", "1"], "no key file specified (-k)"),
        (&["-i", "x", "-o", "y", "-k", "z"], "size of ciphertexts unspecified (-n)"),
    ];
    for (args, message) in cases {
        let output = Command::new(env!("CARGO_BIN_EXE_ml_kem_decap"))
            .args(args)
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1), "{:?}", args);
        assert!(
            String::from_utf8_lossy(&output.stderr).contains(message),
            "{:?}",
            args
        );
    }

    let output = Command::new(env!("CARGO_BIN_EXE_ml_kem_decap"))
        .arg("-h")
        .output()
        .unwrap();
    assert!(output.status.success());
}

#[test]
fn binary_malformed_options_exit_one() {
    let cases: [&[&str]; 2] = [
        &["-i", "x", "-o", "y", "-k", "z", "-n", "abc"],
        &["-i", "x", "--bogus"],
    ];
    for args in cases {
        let output = Command::new(env!("CARGO_BIN_EXE_ml_kem_decap"))
            .args(args)
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1), "{:?}", args);
        assert!(
            String::from_utf8_lossy(&output.stderr).starts_with("ERROR: "),
            "{:?}",
            args
        );
    }
}
