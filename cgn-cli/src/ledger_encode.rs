//! `ledger-encode` subcommand: encode a file and record it on a
//! hash-chained ledger, loading or creating the ledger file as needed.

use anyhow::Context;
use cgn::headers::HeaderMap;
use cgn::ledger::{Ledger, DEFAULT_DIFFICULTY};
use cgn::EncodeOptions;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct Args {
    /// File whose bytes will be hidden
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// PGN file to write, tagged with a `[BlockchainRef ...]` line
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Ledger file to load and save; created fresh if it does not exist
    #[arg(long, default_value = "ledger.json")]
    ledger_file: PathBuf,

    /// Proof-of-work difficulty (leading hex zero digits) for a freshly
    /// created ledger; ignored if `--ledger-file` already exists
    #[arg(long)]
    difficulty: Option<usize>,

    /// Seconds after encoding after which the payload becomes undecodable
    #[arg(long)]
    self_destruct_seconds: Option<u64>,

    /// Extra PGN header, repeatable, in `KEY=VALUE` form
    #[arg(long = "header", value_name = "KEY=VALUE")]
    headers: Vec<String>,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let mut ledger = if args.ledger_file.exists() {
        Ledger::load(&args.ledger_file)
            .with_context(|| format!("failed to load ledger {}", args.ledger_file.display()))?
    } else {
        Ledger::new(args.difficulty.unwrap_or(DEFAULT_DIFFICULTY))
    };

    let mut custom_headers = HeaderMap::new();
    for raw in &args.headers {
        let (key, value) = raw
            .split_once('=')
            .with_context(|| format!("invalid --header '{raw}', expected KEY=VALUE"))?;
        custom_headers.insert(key.to_string(), value.to_string());
    }

    let options = EncodeOptions {
        self_destruct_seconds: args.self_destruct_seconds,
        custom_headers,
    };

    cgn::api::ledger_encode(&mut ledger, &args.input, &args.output, &options)
        .with_context(|| format!("failed to encode {}", args.input.display()))?;

    ledger
        .save(&args.ledger_file)
        .with_context(|| format!("failed to save ledger {}", args.ledger_file.display()))?;

    println!(
        "encoded {} into {} and recorded it on {}",
        args.input.display(),
        args.output.display(),
        args.ledger_file.display()
    );
    Ok(())
}
