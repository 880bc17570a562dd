//! Error types for probe generation and timing collection.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while importing keys, generating probes or
/// collecting timings.
///
/// Every variant is fatal to the invocation that produced it.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// PEM framing present but the body is not valid base64.
    MalformedPem,

    /// Structural DER violation.
    MalformedDer {
        /// What was being decoded.
        context: &'static str,
    },

    /// Algorithm OID is not one of the supported ML-KEM identifiers.
    UnrecognizedAlgorithm {
        /// Dotted-decimal form of the OID found in the container.
        oid: String,
    },

    /// Bytes left over after a field that must be the last one.
    TrailingData {
        /// The field that should have been terminal.
        context: &'static str,
    },

    /// Key material length does not match the parameter set.
    MalformedKey {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length found.
        actual: usize,
    },

    /// Ciphertext length does not match the parameter set.
    InvalidCiphertextLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length provided.
        actual: usize,
    },

    /// Probe argument outside its permitted range.
    ParameterOutOfRange {
        /// Probe the argument was given to.
        probe: &'static str,
        /// The rejected value.
        value: i64,
        /// Exclusive upper bound of the accepted range.
        limit: u32,
    },

    /// No probe with this name exists.
    UnknownProbe {
        /// The requested name.
        name: String,
    },

    /// Wrong number of arguments for a probe.
    ArityMismatch {
        /// Probe name.
        probe: &'static str,
        /// Number of arguments the probe takes.
        expected: usize,
        /// Number of arguments supplied.
        actual: usize,
    },

    /// A probe specification that cannot be parsed.
    InvalidProbeSpec {
        /// The offending specification.
        spec: String,
    },

    /// The same probe identifier was requested twice.
    DuplicateProbe {
        /// Identifier of the duplicated probe.
        id: String,
    },

    /// A corpus was requested with no probes.
    NoProbes,

    /// Output directory already exists.
    OutputExists {
        /// The existing path.
        path: PathBuf,
    },

    /// Persisted order log cannot be read back.
    MalformedLog {
        /// One-based line number of the offending row.
        line: usize,
        /// Description of the problem.
        reason: &'static str,
    },

    /// Corpus ended with a partial record.
    MalformedCorpus {
        /// Record width in bytes.
        expected: usize,
        /// Bytes present in the final, partial record.
        actual: usize,
    },

    /// Underlying I/O failure.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedPem => write!(f, "malformed PEM: body is not valid base64"),
            Error::MalformedDer { context } => write!(f, "malformed DER: {context}"),
            Error::UnrecognizedAlgorithm { oid } => {
                write!(f, "unrecognised algorithm OID: {oid}")
            }
            Error::TrailingData { context } => write!(f, "trailing data after {context}"),
            Error::MalformedKey { expected, actual } => {
                write!(f, "malformed key: expected {expected} bytes, got {actual}")
            }
            Error::InvalidCiphertextLength { expected, actual } => {
                write!(
                    f,
                    "invalid ciphertext length: expected {expected}, got {actual}"
                )
            }
            Error::ParameterOutOfRange {
                probe,
                value,
                limit,
            } => {
                write!(
                    f,
                    "parameter out of range for {probe}: {value} not in (0, {limit})"
                )
            }
            Error::UnknownProbe { name } => write!(f, "no probe named {name}"),
            Error::ArityMismatch {
                probe,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "incorrect number of parameters for probe {probe}, expected: {expected}, got {actual}"
                )
            }
            Error::InvalidProbeSpec { spec } => {
                write!(f, "incorrect formatting of probe: {spec}")
            }
            Error::DuplicateProbe { id } => {
                write!(f, "duplicate probe name and/or parameters: {id}")
            }
            Error::NoProbes => write!(f, "no probes specified"),
            Error::OutputExists { path } => {
                write!(f, "output directory already exists: {}", path.display())
            }
            Error::MalformedLog { line, reason } => {
                write!(f, "malformed order log at line {line}: {reason}")
            }
            Error::MalformedCorpus { expected, actual } => {
                write!(
                    f,
                    "truncated corpus: final record has {actual} of {expected} bytes"
                )
            }
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
