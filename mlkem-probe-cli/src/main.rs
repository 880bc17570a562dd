//! ml-kem-encap: generate ML-KEM ciphertexts for decapsulation timing tests.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use mlkem_probe::kem::backend::Libcrux;
use mlkem_probe::kem::read_public_key_file;
use mlkem_probe::probes::{
    parse_probes, prepare_output_dir, CorpusWriter, Generator, ProbeKind, Reporter, Status,
};
use tracing_subscriber::EnvFilter;

/// Interval between status lines with `--verbose`.
const STATUS_INTERVAL: Duration = Duration::from_secs(2);

fn probe_listing() -> String {
    let mut text = String::from("Supported probes:\n");
    for kind in ProbeKind::ALL {
        text.push_str(&format!("  {}, args: {}\n", kind.name(), kind.arity()));
    }
    text
}

/// Generate ciphertexts for testing the ML-KEM decapsulation interface
/// against timing side channels.
#[derive(Parser, Debug)]
#[command(name = "ml-kem-encap", version)]
#[command(after_help = probe_listing())]
struct Cli {
    /// PEM- or DER-encoded ML-KEM encapsulation key
    #[arg(short = 'c', value_name = "KEY")]
    key: Option<PathBuf>,

    /// Directory that will contain the generated ciphertexts
    #[arg(short = 'o', value_name = "DIR", default_value = "ciphertexts")]
    out_dir: PathBuf,

    /// Describe the specified probe and exit
    #[arg(long, value_name = "NAME")]
    describe: Option<String>,

    /// Save the ciphertexts in random order in a single file (ciphers.bin)
    /// together with the order (log.csv), repeating every probe NUM times
    #[arg(long, value_name = "NUM", allow_negative_numbers = true)]
    repeat: Option<i64>,

    /// Don't abort when the output directory exists
    #[arg(long)]
    force: bool,

    /// Print status progress when generating repeated probes
    #[arg(long)]
    verbose: bool,

    /// Probes to generate: `name` or `name="p1 p2"`; parameters are decimal
    /// or 0x-prefixed hexadecimal
    #[arg(value_name = "PROBE")]
    probes: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
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

fn describe(name: &str) -> ExitCode {
    match ProbeKind::from_name(name) {
        Some(kind) => {
            println!("{}:", kind.name());
            println!("{}", kind.description());
            ExitCode::SUCCESS
        }
        None => {
            let _ = Cli::command().print_help();
            usage_error(&format!("No ciphertext named {name}"))
        }
    }
}

fn generate(
    key_path: &Path,
    out_dir: &Path,
    specs: &[String],
    repeat: Option<usize>,
    force: bool,
    verbose: bool,
) -> Result<()> {
    let key = read_public_key_file(key_path)
        .with_context(|| format!("Failed to read encapsulation key {}", key_path.display()))?;
    tracing::info!(params = %key.params(), "loaded encapsulation key");

    let probes = parse_probes(specs)?;
    let writer = CorpusWriter::new(Generator::new(&Libcrux, &key), probes, out_dir)?;

    println!("Will save ciphertexts to {}", out_dir.display());
    prepare_output_dir(out_dir, force)?;

    let mut rng = rand::rng();
    match repeat {
        None => {
            writer.write_each(&mut rng)?;
        }
        Some(repeat) => {
            let status = Arc::new(Status::new(writer.record_count(repeat)));
            let reporter = if verbose {
                Some(
                    Reporter::spawn(Arc::clone(&status), STATUS_INTERVAL, "ciphertext")
                        .context("Failed to start status reporter")?,
                )
            } else {
                None
            };

            let result = writer.write_repeated(repeat, &mut rng, &status);
            if let Some(reporter) = reporter {
                reporter.finish();
            }
            result.context("Failed to write corpus")?;
        }
    }

    println!("done");
    Ok(())
}

fn main() -> ExitCode {
    let cli = match parse_cli() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    init_tracing(cli.verbose);

    if let Some(name) = &cli.describe {
        return describe(name);
    }

    if cli.probes.is_empty() {
        return usage_error("No ciphertexts specified");
    }
    let Some(key_path) = cli.key.as_deref() else {
        return usage_error("No encapsulation key specified");
    };
    let repeat = match cli.repeat {
        None => None,
        Some(n) if n > 0 => Some(n as usize),
        Some(_) => return usage_error("repeat must be a positive integer"),
    };

    match generate(
        key_path,
        &cli.out_dir,
        &cli.probes,
        repeat,
        cli.force,
        cli.verbose,
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}
