//! Criterion benchmarks for the codec and probe generators live in
//! `benches/`. Run with `cargo bench -p mlkem-probe-bench`.
