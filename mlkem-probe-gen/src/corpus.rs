//! Writing generated ciphertexts to disk.
//!
//! Two layouts are supported:
//!
//! - **Repeated**: `ciphers.bin` holds `repeat * probes` fixed-width records
//!   in the order persisted in `log.csv`, with no delimiters.
//! - **Single shot**: one file per probe, named by the probe identifier.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use mlkem_probe_core::{Error, Kem, Result};
use rand::RngCore;

use crate::order::{OrderLog, LOG_FILE};
use crate::probe::{Generator, Probe};
use crate::progress::Status;

/// File name of the concatenated corpus inside the output directory.
pub const CIPHERS_FILE: &str = "ciphers.bin";

/// Create the output directory.
///
/// Fails with [`Error::OutputExists`] if it already exists, unless `force`
/// is set.
pub fn prepare_output_dir(path: &Path, force: bool) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if force && path.is_dir() {
                Ok(())
            } else {
                Err(Error::OutputExists {
                    path: path.to_path_buf(),
                })
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// Generates a probe set into an output directory.
pub struct CorpusWriter<'a, K: Kem + ?Sized> {
    generator: Generator<'a, K>,
    probes: Vec<Probe>,
    out_dir: PathBuf,
}

impl<'a, K: Kem + ?Sized> CorpusWriter<'a, K> {
    /// Bind `probes` to a generator and output directory.
    ///
    /// Every probe is validated against the key's parameter set here, so a
    /// bad argument is reported before anything is written. An empty list
    /// is rejected with [`Error::NoProbes`].
    pub fn new(
        generator: Generator<'a, K>,
        probes: Vec<Probe>,
        out_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        if probes.is_empty() {
            return Err(Error::NoProbes);
        }
        let mut seen = HashSet::new();
        for probe in &probes {
            if !seen.insert(probe.id()) {
                return Err(Error::DuplicateProbe { id: probe.id() });
            }
            generator.check(probe)?;
        }
        Ok(Self {
            generator,
            probes,
            out_dir: out_dir.into(),
        })
    }

    /// The probes, in log column order.
    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    /// Number of records a repeated run of `repeat` produces.
    pub fn record_count(&self, repeat: usize) -> u64 {
        (self.probes.len() as u64).saturating_mul(repeat as u64)
    }

    /// Write each probe once to `<out_dir>/<probe id>`.
    pub fn write_each(&self, rng: &mut dyn RngCore) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.probes.len());
        for probe in &self.probes {
            let path = self.out_dir.join(probe.id());
            let ct = self.generator.generate(probe, rng)?;
            fs::write(&path, &ct)?;
            tracing::debug!(probe = %probe, path = %path.display(), "ciphertext written");
            written.push(path);
        }
        tracing::info!(probes = written.len(), "single-shot ciphertexts written");
        Ok(written)
    }

    /// Persist a shuffled order for `repeat` runs, then write every record
    /// to `ciphers.bin` in that order.
    ///
    /// `status` is advanced after each record.
    pub fn write_repeated(
        &self,
        repeat: usize,
        rng: &mut dyn RngCore,
        status: &Status,
    ) -> Result<OrderLog> {
        let ids: Vec<String> = self.probes.iter().map(Probe::id).collect();
        let log = OrderLog::create(self.out_dir.join(LOG_FILE), &ids, repeat, rng)?;

        let path = self.out_dir.join(CIPHERS_FILE);
        let mut out = BufWriter::new(File::create(&path)?);
        let mut done = 0u64;
        for index in log.replay()? {
            let ct = self.generator.generate(&self.probes[index?], rng)?;
            out.write_all(&ct)?;
            done += 1;
            status.set_done(done);
        }
        out.flush()?;

        tracing::info!(
            path = %path.display(),
            records = done,
            record_len = self.generator.params().ciphertext_len(),
            "corpus written"
        );
        Ok(log)
    }
}
