use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

mod convert;
mod export;
mod info;
mod validate;

#[derive(Parser)]
#[command(name = "cdd-tool", about = "Inspect CANdela diagnostic descriptions and convert DID data values")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging with timing info
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Export the DID database of a CDD file as JSON
    Export {
        /// Input file (.cdd)
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert one data value between its raw and scaled form
    Convert {
        /// Input file (.cdd)
        input: PathBuf,

        /// DID name or identifier (decimal or 0x-prefixed hex)
        #[arg(long)]
        did: String,

        /// Data element name inside the DID
        #[arg(long)]
        data: String,

        /// Raw value to scale
        #[arg(long, conflicts_with = "scaled", required_unless_present = "scaled")]
        raw: Option<String>,

        /// Scaled value or choice label to encode
        #[arg(long)]
        scaled: Option<String>,

        /// Print numbers instead of choice labels
        #[arg(long)]
        no_choices: bool,
    },

    /// Validate the structure of a CDD file's DID database
    Validate {
        /// Input file (.cdd)
        input: PathBuf,

        /// Suppress individual error output
        #[arg(short, long)]
        quiet: bool,

        /// Print summary count only
        #[arg(short, long)]
        summary: bool,
    },

    /// Display the DIDs of a CDD file
    Info {
        /// Input file (.cdd)
        input: PathBuf,
    },
}

/// Parse a CDD file, logging diagnostics as warnings.
fn load_database(input: &Path, verbose: bool) -> Result<diag_cdd::ParsedCdd> {
    let start = Instant::now();
    let parsed = diag_cdd::read_cdd_file(input)
        .with_context(|| format!("reading CDD from {}", input.display()))?;

    if verbose {
        eprintln!("Parse time: {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
    }
    log::info!(
        "Parsed: dids={}, diagnostics={}",
        parsed.database.dids.len(),
        parsed.diagnostics.len()
    );
    Ok(parsed)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match cli.command {
        Command::Export { input, output } => {
            export::run_export(&input, output.as_deref(), cli.verbose)
        }

        Command::Convert {
            input,
            did,
            data,
            raw,
            scaled,
            no_choices,
        } => {
            let request = match (raw, scaled) {
                (Some(raw), _) => convert::Request::Raw(raw),
                (None, Some(scaled)) => convert::Request::Scaled(scaled),
                (None, None) => anyhow::bail!("one of --raw or --scaled is required"),
            };
            convert::run_convert(&input, &did, &data, &request, !no_choices, cli.verbose)
        }

        Command::Validate {
            input,
            quiet,
            summary,
        } => validate::run_validate(&input, quiet, summary),

        Command::Info { input } => info::run_info(&input),
    }
}
