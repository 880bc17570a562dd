//! Decapsulation timing harness.
//!
//! Reads a corpus of fixed-width ciphertext records and times one
//! decapsulation per record. The output is text: the literal line
//! `raw times`, then one elapsed nanosecond count per record.
//!
//! Only the [`Decapsulate::decapsulate`] call is inside the timed region.
//! Reading, conversion into the backend's ciphertext type and formatting
//! all happen outside it, and the loop runs on the calling thread only.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

use std::hint::black_box;
use std::io::{self, BufWriter, ErrorKind, Read, Write};
use std::time::Instant;

use mlkem_probe_core::{Decapsulate, Error, ParameterSet, Result};

/// First line of every timing output.
pub const HEADER: &str = "raw times";

/// Check that a requested record width matches the key's ciphertext length.
pub fn check_record_width(params: ParameterSet, width: usize) -> Result<()> {
    if width != params.ciphertext_len() {
        return Err(Error::InvalidCiphertextLength {
            expected: params.ciphertext_len(),
            actual: width,
        });
    }
    Ok(())
}

/// Fill `buf` from `input`, returning the number of bytes read. Fewer than
/// `buf.len()` bytes means the stream ended.
fn read_record<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Time decapsulation of every record in `input`, writing the results to
/// `output`. Returns the number of records measured.
///
/// # Errors
///
/// - [`Error::MalformedCorpus`] if the stream ends inside a record; timings
///   for all complete records are written and flushed first
/// - [`Error::Io`] on read or write failures
pub fn run<D, R, W>(dec: &D, mut input: R, output: W) -> Result<u64>
where
    D: Decapsulate,
    R: Read,
    W: Write,
{
    let width = dec.params().ciphertext_len();
    let mut out = BufWriter::new(output);
    writeln!(out, "{HEADER}")?;

    let mut record = vec![0u8; width];
    let mut count = 0u64;
    loop {
        let n = read_record(&mut input, &mut record)?;
        if n == 0 {
            break;
        }
        if n < width {
            out.flush()?;
            return Err(Error::MalformedCorpus {
                expected: width,
                actual: n,
            });
        }

        let ct = dec.load_ciphertext(&record)?;

        let start = Instant::now();
        let ss = dec.decapsulate(black_box(&ct));
        let elapsed = start.elapsed();

        black_box(ss);
        writeln!(out, "{}", elapsed.as_nanos())?;
        count += 1;
    }
    out.flush()?;

    tracing::info!(params = %dec.params(), records = count, "timing complete");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlkem_probe_core::SharedSecret;
    use std::cell::Cell;

    /// Counts calls instead of doing any cryptography.
    struct Counting {
        calls: Cell<usize>,
    }

    impl Decapsulate for Counting {
        type Ciphertext = Vec<u8>;

        fn params(&self) -> ParameterSet {
            ParameterSet::MlKem512
        }

        fn load_ciphertext(&self, bytes: &[u8]) -> Result<Vec<u8>> {
            Ok(bytes.to_vec())
        }

        fn decapsulate(&self, ct: &Vec<u8>) -> SharedSecret {
            self.calls.set(self.calls.get() + 1);
            let mut ss = [0u8; 32];
            ss[0] = ct[0];
            ss
        }
    }

    fn counting() -> Counting {
        Counting {
            calls: Cell::new(0),
        }
    }

    /// Hands out at most `step` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_one_line_per_record() {
        let dec = counting();
        let corpus = vec![0u8; 3 * 768];
        let mut out = Vec::new();

        assert_eq!(run(&dec, corpus.as_slice(), &mut out).unwrap(), 3);
        assert_eq!(dec.calls.get(), 3);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], HEADER);
        for line in &lines[1..] {
            line.parse::<u128>().unwrap();
        }
    }

    #[test]
    fn test_empty_corpus() {
        let dec = counting();
        let mut out = Vec::new();
        assert_eq!(run(&dec, io::empty(), &mut out).unwrap(), 0);
        assert_eq!(out, b"raw times\n");
    }

    #[test]
    fn test_short_reads_are_reassembled() {
        let dec = counting();
        let corpus = vec![1u8; 2 * 768];
        let input = Trickle {
            data: &corpus,
            step: 100,
        };
        let mut out = Vec::new();
        assert_eq!(run(&dec, input, &mut out).unwrap(), 2);
    }

    #[test]
    fn test_truncated_corpus() {
        let dec = counting();
        let corpus = vec![0u8; 2 * 768 + 10];
        let mut out = Vec::new();

        let result = run(&dec, corpus.as_slice(), &mut out);
        assert!(matches!(
            result,
            Err(Error::MalformedCorpus {
                expected: 768,
                actual: 10
            })
        ));
        assert_eq!(dec.calls.get(), 2);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_record_width_check() {
        assert!(check_record_width(ParameterSet::MlKem768, 1088).is_ok());
        assert!(matches!(
            check_record_width(ParameterSet::MlKem768, 768),
            Err(Error::InvalidCiphertextLength {
                expected: 1088,
                actual: 768
            })
        ));
    }
}
