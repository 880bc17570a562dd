//! # mlkem-probe gen
//!
//! Generation side of the ML-KEM timing workflow:
//!
//! - [`probe`]: the closed catalog of probe kinds and the [`Generator`]
//!   that turns a probe into ciphertext bytes
//! - [`order`]: the persisted, replayable generation order (`log.csv`)
//! - [`corpus`]: writing single-shot files or a fixed-width `ciphers.bin`
//! - [`progress`]: optional status reporting while a corpus is written

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod corpus;
pub mod order;
pub mod probe;
pub mod progress;

pub use corpus::{prepare_output_dir, CorpusWriter, CIPHERS_FILE};
pub use order::{OrderLog, Replay, LOG_FILE};
pub use probe::{parse_probes, Generator, Probe, ProbeKind};
pub use progress::{Reporter, Status};
