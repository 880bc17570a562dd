//! Time ML-KEM decapsulation of every ciphertext in a corpus.
//!
//! Run with: `cargo run --release -p mlkem-probe-timing --bin ml_kem_decap -- \
//!     -i ciphers.bin -o timing.csv -k dk.pem -n 1088`

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use mlkem_probe_core::backend::{Decapsulator1024, Decapsulator512, Decapsulator768, Libcrux};
use mlkem_probe_core::{read_private_key_file, ParameterSet};
use mlkem_probe_timing::{check_record_width, run};
use tracing_subscriber::EnvFilter;

/// Measure decapsulation time for each fixed-width ciphertext in a file.
#[derive(Parser, Debug)]
#[command(name = "ml_kem_decap", version)]
struct Cli {
    /// File with the ciphertexts to decapsulate
    #[arg(short = 'i', value_name = "FILE")]
    input: Option<PathBuf>,

    /// File to write the timing data to
    #[arg(short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// The private key to use for decapsulation
    #[arg(short = 'k', value_name = "FILE")]
    key: Option<PathBuf>,

    /// Size of individual ciphertexts
    #[arg(short = 'n', value_name = "SIZE")]
    size: Option<usize>,
}

fn usage_error(message: &str) -> ExitCode {
    eprintln!("ERROR: {message}");
    ExitCode::FAILURE
}

/// Parse arguments, mapping clap's usage errors to exit code 1.
fn parse_cli() -> Result<Cli, ExitCode> {
    Cli::try_parse().map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = e.print();
            ExitCode::SUCCESS
        }
        _ => {
            let message = e.to_string();
            let message = message.strip_prefix("error: ").unwrap_or(&message);
            usage_error(message.trim_end())
        }
    })
}

fn measure(input: &Path, output: &Path, key: &Path, size: usize) -> Result<u64> {
    let key = read_private_key_file(key, &Libcrux)
        .with_context(|| format!("Failed to read decapsulation key {}", key.display()))?;
    let params = key.params();
    check_record_width(params, size)
        .with_context(|| format!("Ciphertext size does not match {params}"))?;

    let corpus = File::open(input)
        .with_context(|| format!("Failed to open corpus {}", input.display()))?;
    let corpus = BufReader::new(corpus);
    let sink = File::create(output)
        .with_context(|| format!("Failed to create timing output {}", output.display()))?;

    let dk = key.decapsulation_key();
    let count = match params {
        ParameterSet::MlKem512 => run(&Decapsulator512::new(dk)?, corpus, sink)?,
        ParameterSet::MlKem768 => run(&Decapsulator768::new(dk)?, corpus, sink)?,
        ParameterSet::MlKem1024 => run(&Decapsulator1024::new(dk)?, corpus, sink)?,
    };
    Ok(count)
}

fn main() -> ExitCode {
    if std::env::args_os().len() <= 1 {
        let _ = Cli::command().print_help();
        return ExitCode::FAILURE;
    }
    let cli = match parse_cli() {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let Some(input) = cli.input.as_deref() else {
        return usage_error("no input file specified (-i)");
    };
    let Some(output) = cli.output.as_deref() else {
        return usage_error("no output file specified (-o)");
    };
    let Some(key) = cli.key.as_deref() else {
        return usage_error("no key file specified (-k)");
    };
    let Some(size) = cli.size.filter(|&n| n > 0) else {
        return usage_error("size of ciphertexts unspecified (-n)");
    };

    match measure(input, output, key, size) {
        Ok(_) => {
            println!("done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}
