//! Command-line front end for the `cgn` steganographic chess codec.

use clap::{Parser, Subcommand};

/// Encodes a file as a legal chess game.
pub mod encode;

/// Decodes a file previously produced by `encode`.
pub mod decode;

/// Encodes a file and records it on a hash-chained ledger.
pub mod ledger_encode;

/// Resolves a ledger-tagged PGN file back to its original bytes.
pub mod ledger_decode;

/// Verifies a ledger file's hash chain.
pub mod ledger_verify;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Hide a file's bytes inside the moves of a legal chess game
    Encode(encode::Args),

    /// Recover the bytes hidden inside a PGN file produced by `encode`
    Decode(decode::Args),

    /// Encode a file and append the resulting PGN to a hash-chained ledger
    LedgerEncode(ledger_encode::Args),

    /// Resolve a ledger-tagged PGN file and recover its original bytes
    LedgerDecode(ledger_decode::Args),

    /// Verify a ledger file's hash chain, sweeping expired blocks first
    LedgerVerify(ledger_verify::Args),
}

#[derive(Debug, Parser)]
#[clap(name = "cgn-cli")]
#[clap(bin_name = "cgn")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
#[clap(about = "Hide and recover files inside legal chess games")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    match args.command {
        Command::Encode(args) => encode::run(args),
        Command::Decode(args) => decode::run(args),
        Command::LedgerEncode(args) => ledger_encode::run(args),
        Command::LedgerDecode(args) => ledger_decode::run(args),
        Command::LedgerVerify(args) => ledger_verify::run(args),
    }
}
