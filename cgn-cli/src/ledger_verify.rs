//! `ledger-verify` subcommand: sweep expired blocks and report whether the
//! hash chain still verifies.

use anyhow::Context;
use cgn::ledger::Ledger;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct Args {
    /// Ledger file to verify
    #[arg(value_name = "LEDGER", default_value = "ledger.json")]
    ledger_file: PathBuf,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let mut ledger = Ledger::load(&args.ledger_file)
        .with_context(|| format!("failed to load ledger {}", args.ledger_file.display()))?;

    let swept = ledger.sweep();
    if !swept.is_empty() {
        println!("swept {} expired block(s): {swept:?}", swept.len());
    }

    ledger
        .save(&args.ledger_file)
        .with_context(|| format!("failed to save ledger {}", args.ledger_file.display()))?;

    if ledger.verify_chain() {
        println!("chain OK: {} block(s)", ledger.chain.len());
        Ok(())
    } else {
        anyhow::bail!("chain verification FAILED");
    }
}
