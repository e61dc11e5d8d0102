//! Parsing a PGN text blob into [`GameRecord`]s and serializing it back.
//!
//! Parsing only extracts header key/value pairs and the literal SAN move
//! tokens (as written in the source text); it does not resolve moves
//! against a live position. Resolving SAN tokens into `shakmaty::Move`s
//! ply-by-ply, against the position the token was actually played in, is
//! the decoder's job (see `crate::codec`) since SAN disambiguation is
//! itself position-dependent.

use crate::error::{CgnError, Result};
use crate::game_record::GameRecord;
use pgn_reader::{BufferedReader, RawHeader, SanPlus, Visitor};

/// An ordered, non-empty sequence of games.
#[derive(Clone, Debug, Default)]
pub struct PgnDocument {
    pub games: Vec<GameRecord>,
}

impl PgnDocument {
    pub fn new() -> Self {
        PgnDocument { games: Vec::new() }
    }

    /// Parses `text` into a document of one or more games.
    ///
    /// Returns [`CgnError::InputMalformed`] if no game is found, or if the
    /// text cannot be tokenized as PGN at all.
    pub fn parse(text: &str) -> Result<PgnDocument> {
        let mut reader = BufferedReader::new_cursor(text);
        let mut games = Vec::new();
        loop {
            let mut visitor = GameVisitor::default();
            match reader.read_game(&mut visitor) {
                Ok(Some(record)) => {
                    if !record.headers.is_empty() || !record.moves.is_empty() {
                        games.push(record);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    return Err(CgnError::InputMalformed(format!(
                        "failed to parse PGN: {e}"
                    )))
                }
            }
        }
        if games.is_empty() {
            return Err(CgnError::InputMalformed(
                "no chess games found in PGN text".to_string(),
            ));
        }
        Ok(PgnDocument { games })
    }

    /// Serializes the document back to PGN text: games separated by
    /// exactly one blank line.
    pub fn to_pgn_string(&self) -> String {
        self.games
            .iter()
            .map(|g| g.to_pgn_string())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Default)]
struct GameVisitor {
    record: GameRecord,
}

impl Visitor for GameVisitor {
    type Result = GameRecord;

    fn header(&mut self, key: &[u8], value: RawHeader<'_>) {
        if let (Ok(key), Ok(value)) = (
            std::str::from_utf8(key),
            std::str::from_utf8(value.as_bytes()),
        ) {
            self.record
                .headers
                .insert(key.to_string(), value.to_string());
        }
    }

    fn san(&mut self, san_plus: SanPlus) {
        self.record.moves.push(san_plus.to_string());
    }

    fn end_game(&mut self) -> Self::Result {
        std::mem::take(&mut self.record)
    }
}

/// Strips a trailing `[BlockchainRef "<index>"]` tag from `text`, returning
/// the cleaned text and the parsed index if one was present.
///
/// The tag is written after the last game's movetext (not inside any
/// game's header block), so it is handled as a plain text operation
/// rather than via the PGN tokenizer.
pub fn extract_blockchain_ref(text: &str) -> (String, Option<u64>) {
    let marker = "[BlockchainRef \"";
    let Some(start) = text.rfind(marker) else {
        return (text.to_string(), None);
    };
    let after_marker = &text[start + marker.len()..];
    let Some(end_quote) = after_marker.find('"') else {
        return (text.to_string(), None);
    };
    let digits = &after_marker[..end_quote];
    let Ok(index) = digits.parse::<u64>() else {
        return (text.to_string(), None);
    };
    let Some(close_bracket) = after_marker[end_quote..].find(']') else {
        return (text.to_string(), None);
    };
    let line_end = start + marker.len() + end_quote + close_bracket + 1;
    let mut cleaned = String::new();
    cleaned.push_str(text[..start].trim_end());
    cleaned.push_str(&text[line_end..]);
    (cleaned.trim().to_string(), Some(index))
}

/// Appends a `[BlockchainRef "<index>"]` line to `text`.
pub fn append_blockchain_ref(text: &str, index: u64) -> String {
    format!("{text}\n\n[BlockchainRef \"{index}\"]")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "[Event \"Test\"]\n[Seed \"42\"]\n[DataBitLength \"8\"]\n\n1. e4 e5 2. Nf3 *";

    #[test]
    fn parses_headers_and_moves() {
        let doc = PgnDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.games.len(), 1);
        let game = &doc.games[0];
        assert_eq!(game.headers.get("Seed").unwrap(), "42");
        assert_eq!(game.moves, vec!["e4", "e5", "Nf3"]);
    }

    #[test]
    fn rejects_text_with_no_games() {
        assert!(PgnDocument::parse("not a pgn file at all").is_err());
    }

    #[test]
    fn round_trips_multiple_games() {
        let two_games = format!("{SAMPLE}\n\n[Event \"Test\"]\n[Seed \"7\"]\n[Round \"2\"]\n\n1. d4 *");
        let doc = PgnDocument::parse(&two_games).unwrap();
        assert_eq!(doc.games.len(), 2);
        assert_eq!(doc.games[1].headers.get("Round").unwrap(), "2");
    }

    #[test]
    fn extracts_and_strips_blockchain_ref() {
        let text = format!("{SAMPLE}\n\n[BlockchainRef \"3\"]");
        let (cleaned, idx) = extract_blockchain_ref(&text);
        assert_eq!(idx, Some(3));
        assert_eq!(cleaned, SAMPLE);
        assert!(PgnDocument::parse(&cleaned).is_ok());
    }

    #[test]
    fn no_blockchain_ref_is_a_no_op() {
        let (cleaned, idx) = extract_blockchain_ref(SAMPLE);
        assert_eq!(idx, None);
        assert_eq!(cleaned, SAMPLE);
    }

    #[test]
    fn append_then_extract_round_trips() {
        let with_ref = append_blockchain_ref(SAMPLE, 5);
        let (cleaned, idx) = extract_blockchain_ref(&with_ref);
        assert_eq!(idx, Some(5));
        assert_eq!(cleaned, SAMPLE);
    }
}
