//! `decode` subcommand: recover the bytes hidden inside a PGN file.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct Args {
    /// PGN file produced by `encode`
    #[arg(value_name = "PGN")]
    input: PathBuf,

    /// File to write the recovered bytes to
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    cgn::api::decode(&args.input, &args.output)
        .with_context(|| format!("failed to decode {}", args.input.display()))?;

    println!(
        "decoded {} into {}",
        args.input.display(),
        args.output.display()
    );
    Ok(())
}
