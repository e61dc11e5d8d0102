//! File-path entry points. Thin wrappers around [`crate::codec`] and
//! [`crate::ledger`] that handle reading input, writing output under an
//! [`OutputGuard`], and mapping filesystem errors onto [`CgnError`].

use crate::codec::{self, EncodeOptions};
use crate::error::{CgnError, Result};
use crate::ledger::{self, Ledger};
use crate::output_guard::OutputGuard;
use crate::pgn_document::PgnDocument;
use std::path::Path;

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| map_read_error(path, e))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| map_read_error(path, e))
}

fn map_read_error(path: &Path, e: std::io::Error) -> CgnError {
    if e.kind() == std::io::ErrorKind::NotFound {
        CgnError::InputMissing(format!("{} does not exist", path.display()))
    } else {
        CgnError::Io(e)
    }
}

/// Encodes the bytes at `input_path` into a PGN file at `output_path`.
pub fn encode(input_path: &Path, output_path: &Path, options: &EncodeOptions) -> Result<()> {
    let payload = read_bytes(input_path)?;
    let document = codec::encode_to_document(&payload, options)?;

    let guard = OutputGuard::new(output_path);
    std::fs::write(output_path, document.to_pgn_string())?;
    guard.commit();

    log::info!(
        "encoded {} bytes from {} into {} ({} games)",
        payload.len(),
        input_path.display(),
        output_path.display(),
        document.games.len()
    );
    Ok(())
}

/// Decodes the PGN file at `pgn_path` back into bytes written at
/// `output_path`.
pub fn decode(pgn_path: &Path, output_path: &Path) -> Result<()> {
    let text = read_text(pgn_path)?;
    let document = PgnDocument::parse(&text)?;
    let payload = codec::decode_from_document(&document)?;

    let guard = OutputGuard::new(output_path);
    std::fs::write(output_path, &payload)?;
    guard.commit();

    log::info!(
        "decoded {} bytes from {} into {}",
        payload.len(),
        pgn_path.display(),
        output_path.display()
    );
    Ok(())
}

/// Encodes the bytes at `input_path`, stores the resulting PGN on
/// `ledger`, and writes the `[BlockchainRef ...]`-tagged PGN text to
/// `output_path`.
pub fn ledger_encode(
    ledger: &mut Ledger,
    input_path: &Path,
    output_path: &Path,
    options: &EncodeOptions,
) -> Result<()> {
    let payload = read_bytes(input_path)?;
    let document = codec::encode_to_document(&payload, options)?;
    let tagged = ledger::blockchain_encode(ledger, &document.to_pgn_string());

    let guard = OutputGuard::new(output_path);
    std::fs::write(output_path, &tagged)?;
    guard.commit();

    log::info!(
        "encoded {} bytes from {} onto the ledger, tagged PGN written to {}",
        payload.len(),
        input_path.display(),
        output_path.display()
    );
    Ok(())
}

/// Resolves the `[BlockchainRef ...]`-tagged PGN file at `pgn_path`
/// against `ledger`, decoding the stored payload to `output_path`.
pub fn ledger_decode(ledger: &mut Ledger, pgn_path: &Path, output_path: &Path) -> Result<()> {
    let tagged_text = read_text(pgn_path)?;
    let stored_pgn = ledger::blockchain_decode(ledger, &tagged_text)?;
    let document = PgnDocument::parse(&stored_pgn)?;
    let payload = codec::decode_from_document(&document)?;

    let guard = OutputGuard::new(output_path);
    std::fs::write(output_path, &payload)?;
    guard.commit();

    log::info!(
        "resolved ledger entry for {} into {}",
        pgn_path.display(),
        output_path.display()
    );
    Ok(())
}
