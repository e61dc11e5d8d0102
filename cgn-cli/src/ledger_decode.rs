//! `ledger-decode` subcommand: resolve a ledger-tagged PGN file against
//! its ledger and recover the original bytes.

use anyhow::Context;
use cgn::ledger::Ledger;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct Args {
    /// PGN file produced by `ledger-encode`, tagged with `[BlockchainRef ...]`
    #[arg(value_name = "PGN")]
    input: PathBuf,

    /// File to write the recovered bytes to
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Ledger file to resolve the PGN against
    #[arg(long, default_value = "ledger.json")]
    ledger_file: PathBuf,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let mut ledger = Ledger::load(&args.ledger_file)
        .with_context(|| format!("failed to load ledger {}", args.ledger_file.display()))?;

    let result = cgn::api::ledger_decode(&mut ledger, &args.input, &args.output);

    // `sweep()` inside `ledger_decode` may have mutated pending expiry
    // state even when the overall call fails (e.g. this exact block
    // expired); persist it either way so a second run sees the same
    // swept state rather than re-evaluating the clock.
    ledger
        .save(&args.ledger_file)
        .with_context(|| format!("failed to save ledger {}", args.ledger_file.display()))?;

    result.with_context(|| format!("failed to resolve {}", args.input.display()))?;

    println!(
        "resolved {} into {}",
        args.input.display(),
        args.output.display()
    );
    Ok(())
}
