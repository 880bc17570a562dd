//! The persisted generation order (`log.csv`).
//!
//! The header row lists the distinct probe identifiers. Every following row
//! is one run: a permutation of the header's column indices, giving the
//! order in which that run's probes are written to the corpus.
//!
//! ```text
//! valid,invalid,xor_u_coefficient_0_1
//! 2,0,1
//! 0,2,1
//! ```
//!
//! The log is written and synced before any ciphertext is generated, so an
//! interrupted generation still leaves a complete record of the intended
//! order.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use mlkem_probe_core::{Error, Result};
use rand::seq::SliceRandom;
use rand::RngCore;

/// File name of the order log inside the output directory.
pub const LOG_FILE: &str = "log.csv";

/// A persisted order log.
#[derive(Clone, Debug)]
pub struct OrderLog {
    path: PathBuf,
    ids: Vec<String>,
}

impl OrderLog {
    /// Shuffle `repeat` independent runs over `ids` and persist them at
    /// `path`.
    ///
    /// The file is flushed and synced to stable storage before returning.
    pub fn create(
        path: impl AsRef<Path>,
        ids: &[String],
        repeat: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut out = BufWriter::new(File::create(&path)?);

        writeln!(out, "{}", ids.join(","))?;

        let mut order: Vec<usize> = (0..ids.len()).collect();
        let mut row = String::new();
        for _ in 0..repeat {
            order.shuffle(rng);
            row.clear();
            for (i, index) in order.iter().enumerate() {
                if i > 0 {
                    row.push(',');
                }
                row.push_str(&index.to_string());
            }
            writeln!(out, "{row}")?;
        }

        let file = out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;

        tracing::info!(
            path = %path.display(),
            probes = ids.len(),
            runs = repeat,
            "order log written"
        );
        Ok(Self {
            path,
            ids: ids.to_vec(),
        })
    }

    /// Open an existing log, reading only its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut lines = BufReader::new(File::open(&path)?).lines();
        let ids = read_header(&mut lines)?;
        Ok(Self { path, ids })
    }

    /// Probe identifiers in column order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Location of the log on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the log from disk, yielding column indices in stored order.
    ///
    /// Rows are read lazily; each one is checked to be a permutation of the
    /// header's columns before any of its indices are yielded.
    pub fn replay(&self) -> Result<Replay> {
        let mut lines = BufReader::new(File::open(&self.path)?).lines();
        let ids = read_header(&mut lines)?;
        if ids != self.ids {
            return Err(Error::MalformedLog {
                line: 1,
                reason: "header changed since the log was opened",
            });
        }
        Ok(Replay {
            lines,
            width: ids.len(),
            line: 1,
            row: Vec::new().into_iter(),
        })
    }

    /// Like [`replay`](Self::replay), but yielding identifiers.
    pub fn replay_ids(&self) -> Result<impl Iterator<Item = Result<&str>> + '_> {
        Ok(self
            .replay()?
            .map(move |index| index.map(|i| self.ids[i].as_str())))
    }
}

fn read_header(lines: &mut Lines<BufReader<File>>) -> Result<Vec<String>> {
    let header = lines.next().transpose()?.ok_or(Error::MalformedLog {
        line: 1,
        reason: "missing header",
    })?;
    if header.trim().is_empty() {
        return Err(Error::MalformedLog {
            line: 1,
            reason: "empty header",
        });
    }
    Ok(header.split(',').map(str::to_string).collect())
}

/// Lazy iterator over the column indices stored in an order log.
pub struct Replay {
    lines: Lines<BufReader<File>>,
    width: usize,
    line: usize,
    row: std::vec::IntoIter<usize>,
}

impl Replay {
    fn parse_row(&self, text: &str) -> Result<Vec<usize>> {
        let malformed = |reason| Error::MalformedLog {
            line: self.line,
            reason,
        };

        let mut seen = vec![false; self.width];
        let mut row = Vec::with_capacity(self.width);
        for field in text.split(',') {
            let index: usize = field.trim().parse().map_err(|_| malformed("not an index"))?;
            if index >= self.width {
                return Err(malformed("index out of range"));
            }
            if std::mem::replace(&mut seen[index], true) {
                return Err(malformed("repeated index"));
            }
            row.push(index);
        }
        if row.len() != self.width {
            return Err(malformed("row is not a full permutation"));
        }
        Ok(row)
    }
}

impl Iterator for Replay {
    type Item = Result<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(index) = self.row.next() {
                return Some(Ok(index));
            }
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;
            match self.parse_row(&text) {
                Ok(row) => self.row = row.into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
