//! `encode` subcommand: hide a file's bytes inside a legal chess game.

use anyhow::Context;
use clap::Parser;
use cgn::headers::HeaderMap;
use cgn::EncodeOptions;
use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct Args {
    /// File whose bytes will be hidden
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// PGN file to write
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Seconds after encoding after which the payload becomes undecodable
    #[arg(long)]
    self_destruct_seconds: Option<u64>,

    /// Extra PGN header, repeatable, in `KEY=VALUE` form. `Seed`,
    /// `DataBitLength`, and `ExpiryTime` are reserved and ignored.
    #[arg(long = "header", value_name = "KEY=VALUE")]
    headers: Vec<String>,
}

pub fn run(args: Args) -> anyhow::Result<()> {
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

    cgn::api::encode(&args.input, &args.output, &options)
        .with_context(|| format!("failed to encode {}", args.input.display()))?;

    println!(
        "encoded {} into {}",
        args.input.display(),
        args.output.display()
    );
    Ok(())
}
