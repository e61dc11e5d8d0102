//! Chess steganography codec and tamper-evident ledger.
//!
//! Encodes arbitrary bytes as the move choices of a legal chess game
//! (see [`codec`]), serializes/parses the result as PGN (see
//! [`pgn_document`]), and optionally stores encoded games in a
//! hash-chained, append-only ledger with expiry support (see [`ledger`]).
//! [`api`] wires these together behind file-path entry points for the CLI.

pub mod api;
pub mod bitstream;
pub mod codec;
pub mod cre;
pub mod error;
pub mod game_record;
pub mod headers;
pub mod ledger;
pub mod output_guard;
pub mod pgn_document;
pub mod shuffle;

pub use codec::{decode_from_document, encode_to_document, EncodeOptions};
pub use error::{CgnError, Result};
pub use game_record::GameRecord;
pub use ledger::Ledger;
pub use pgn_document::PgnDocument;
