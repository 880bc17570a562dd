//! Fuzz target for the ciphertext codec.
//!
//! Checks that:
//! 1. Decoding never panics on any input length
//! 2. Any correctly sized input re-encodes to identical bytes
//! 3. XOR-ing a coefficient changes only its own region

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use mlkem_probe_codec::{decode, encode, normalize_u_index, normalize_v_index};
use mlkem_probe_core::ParameterSet;

#[derive(Debug, Arbitrary)]
struct CodecInput {
    variant: u8,
    pos: i64,
    flip: u16,
    data: Vec<u8>,
}

fuzz_target!(|input: CodecInput| {
    let params = ParameterSet::ALL[(input.variant % 3) as usize];

    let Ok((mut u, mut v)) = decode(&input.data, params) else {
        assert_ne!(input.data.len(), params.ciphertext_len());
        return;
    };

    assert_eq!(encode(&u, &v, params), input.data, "roundtrip failed for {}", params);

    let u_mask = (1u16 << params.du()) - 1;
    let v_mask = (1u16 << params.dv()) - 1;
    let split = params.u_len();

    *u.coeff_mut(normalize_u_index(input.pos, params)) ^= input.flip & u_mask;
    let edited = encode(&u, &v, params);
    assert_eq!(&edited[split..], &input.data[split..], "u edit leaked into v");

    let (u, _) = decode(&input.data, params).unwrap();
    v.coeffs[normalize_v_index(input.pos)] ^= input.flip & v_mask;
    let edited = encode(&u, &v, params);
    assert_eq!(&edited[..split], &input.data[..split], "v edit leaked into u");
});
