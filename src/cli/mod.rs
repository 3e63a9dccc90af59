//! Command-line interface for custodia.
//!
//! Provides commands for hashing evidence into the custody ledger,
//! inspecting and verifying the ledger, and consuming the two external
//! collaborators (document metadata, live packet capture) for display.
//!
//! Exit behavior: an unsupported algorithm or an unrecoverable log-write
//! failure reports a specific error and exits non-zero; user-requested
//! paths exit zero.

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{CaptureEngine, MetadataReader, PdfInfoReader, TsharkEngine};
use crate::config;
use crate::core::{digest_file, Custodian, CustodyError, Ledger};
use crate::domain::{DigestRequest, HashAlgorithm, LedgerEntry};

/// custodia - digital-evidence hashing and chain-of-custody ledger
#[derive(Parser, Debug)]
#[command(name = "custodia")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Digest input and append a custody record to the evidence log
    Hash {
        /// Text to digest (use --file or --stdin for other sources)
        text: Option<String>,

        /// Algorithm selector: MD5, SHA1, SHA256 or SHA512 (case-insensitive)
        #[arg(short, long)]
        algorithm: String,

        /// Digest the contents of a file (streamed in chunks)
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Read input from stdin
        #[arg(long, conflicts_with_all = ["text", "file"])]
        stdin: bool,

        /// Compute the digest without appending a custody record
        #[arg(long)]
        no_record: bool,
    },

    /// Inspect or verify the evidence log
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },

    /// Display document metadata via the external metadata reader
    Metadata {
        /// Document to inspect
        file: PathBuf,
    },

    /// Display live packet summaries via the external capture engine
    Capture {
        /// Network interface identifier (e.g. eth0, wlan0)
        interface: String,

        /// Capture duration in seconds (defaults from config)
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Evidence-log subcommands
#[derive(Subcommand, Debug)]
pub enum LogCommands {
    /// Print custody records in append order
    Show {
        /// Maximum number of records to show (0 = all)
        #[arg(short, long, default_value = "0")]
        limit: usize,
    },

    /// Check every log line; reports malformed lines and per-algorithm
    /// counts, exits non-zero if any line is malformed
    Verify,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Hash {
                text,
                algorithm,
                file,
                stdin,
                no_record,
            } => hash_evidence(text, &algorithm, file, stdin, no_record),
            Commands::Log { command } => match command {
                LogCommands::Show { limit } => show_log(limit),
                LogCommands::Verify => verify_log(),
            },
            Commands::Metadata { file } => show_metadata(&file).await,
            Commands::Capture {
                interface,
                duration,
            } => capture_packets(&interface, duration).await,
            Commands::Config => show_config(),
        }
    }
}

/// Build the custodian from resolved configuration
fn custodian() -> Result<Custodian> {
    let cfg = config::config()?;
    Ok(Custodian::new(Ledger::at(&cfg.ledger))
        .with_empty_input_policy(cfg.policy.allow_empty_input))
}

/// Execute the `hash` command
fn hash_evidence(
    text: Option<String>,
    selector: &str,
    file: Option<PathBuf>,
    use_stdin: bool,
    no_record: bool,
) -> Result<()> {
    let algorithm: HashAlgorithm = selector
        .parse()
        .with_context(|| format!("Cannot hash with selector '{}'", selector))?;

    // Files are digested in streaming chunks; inline text and stdin go
    // through the request object so the empty-input policy applies.
    let (result, reference) = if let Some(path) = file {
        let file_len = std::fs::metadata(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?
            .len();
        let result = digest_file(&path, algorithm)?;
        (Some((result, file_len)), path.display().to_string())
    } else if use_stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        (None, buffer)
    } else {
        let text = text.context("No input provided. Pass text, --file <path> or --stdin")?;
        (None, text)
    };

    if no_record {
        let result = match result {
            Some((result, _)) => result,
            None => {
                let request = DigestRequest::new(reference.as_bytes().to_vec(), algorithm);
                crate::core::compute_digest(&request)
            }
        };
        println!("{}", result.hex_digest);
        return Ok(());
    }

    let custodian = custodian()?;

    let outcome = match result {
        // File digest is already computed; the policy still applies
        // before its custody record is appended
        Some((result, file_len)) => custodian
            .check_input_len(file_len)
            .and_then(|_| custodian.record(result, &reference)),
        None => {
            let request = DigestRequest::new(reference.as_bytes().to_vec(), algorithm);
            custodian.compute_and_record(&request, &reference)
        }
    };

    match outcome {
        Ok(record) => {
            println!("{}", record.hash);
            eprintln!(
                "[{} digest recorded in {}]",
                record.method,
                custodian.ledger().path().display()
            );
            Ok(())
        }
        Err(CustodyError::Unrecorded { result, source }) => {
            // The digest is not lost to the logging failure
            println!("{}", result.hex_digest);
            eprintln!("Error: {}", source);
            eprintln!("[digest shown above was NOT recorded; re-run to retry]");
            std::process::exit(1);
        }
        Err(err @ CustodyError::EmptyInput) => Err(err.into()),
    }
}

/// Execute the `log show` command
fn show_log(limit: usize) -> Result<()> {
    let ledger = Ledger::at(config::ledger_path()?);
    let records = ledger.records()?;

    if records.is_empty() {
        println!("Evidence log is empty: {}", ledger.path().display());
        return Ok(());
    }

    let shown = if limit == 0 { records.len() } else { limit };

    println!("{:<6} {:<8} {:<40} HASH", "#", "METHOD", "INPUT");
    println!("{}", "-".repeat(80));

    for (index, record) in records.iter().take(shown).enumerate() {
        let reference = truncate_reference(&record.input_reference, 37);
        println!(
            "{:<6} {:<8} {:<40} {}",
            index + 1,
            record.method,
            reference,
            record.hash
        );
    }

    println!("\nTotal: {} records", records.len());

    Ok(())
}

/// Truncate a reference for table display. Counts characters, not
/// bytes, so a multibyte reference is never split mid-character.
fn truncate_reference(reference: &str, max_chars: usize) -> String {
    if reference.chars().count() > max_chars {
        let head: String = reference.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        reference.to_string()
    }
}

/// Execute the `log verify` command
fn verify_log() -> Result<()> {
    let ledger = Ledger::at(config::ledger_path()?);
    let entries = ledger.replay()?;

    println!("Verifying evidence log: {}", ledger.path().display());
    println!();

    let mut per_algorithm: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut malformed = 0usize;

    for entry in &entries {
        match entry {
            LedgerEntry::Record(record) => {
                *per_algorithm.entry(record.method.name()).or_default() += 1;
            }
            LedgerEntry::Malformed { line_number, raw } => {
                malformed += 1;
                println!("  MALFORMED line {}: {}", line_number, raw);
            }
        }
    }

    println!("Well-formed records: {}", entries.len() - malformed);
    for (method, count) in &per_algorithm {
        println!("  {}: {}", method, count);
    }
    println!("Malformed lines:     {}", malformed);

    if malformed > 0 {
        eprintln!("\nEvidence log contains malformed lines (manual edits?)");
        std::process::exit(1);
    }

    Ok(())
}

/// Execute the `metadata` command
async fn show_metadata(file: &PathBuf) -> Result<()> {
    let cfg = config::config()?;
    let reader = PdfInfoReader::with_binary_path(&cfg.tools.pdfinfo);

    let metadata = reader.read(file).await?;

    if metadata.is_empty() {
        println!("No metadata reported for {}", file.display());
        return Ok(());
    }

    for (key, value) in &metadata {
        println!("{} : {}", key, value);
    }

    Ok(())
}

/// Execute the `capture` command
async fn capture_packets(interface: &str, duration: Option<u64>) -> Result<()> {
    let cfg = config::config()?;
    let engine = TsharkEngine::with_binary_path(&cfg.tools.tshark);

    let seconds = duration.unwrap_or(cfg.capture.default_duration_seconds);
    eprintln!(
        "Capturing on '{}' for {}s via {}...",
        interface,
        seconds,
        engine.name()
    );

    let packets = engine
        .capture(interface, Duration::from_secs(seconds))
        .await?;

    for line in &packets {
        println!("{}", line);
    }

    eprintln!("[{} packets captured]", packets.len());

    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("Custodia configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:         {}", cfg.home.display());
    println!("  Evidence log: {}", cfg.ledger.display());
    println!();
    println!("Policy:");
    println!("  Allow empty input: {}", cfg.policy.allow_empty_input);
    println!();
    println!("Capture:");
    println!(
        "  Default duration: {}s",
        cfg.capture.default_duration_seconds
    );
    println!();
    println!("Tools:");
    println!("  pdfinfo: {}", cfg.tools.pdfinfo);
    println!("  tshark:  {}", cfg.tools.tshark);

    Ok(())
}
