//! A single PGN game: headers, a move list (pre-rendered SAN tokens), and
//! a result marker.

use crate::headers::HeaderMap;

/// One game within a [`crate::pgn_document::PgnDocument`].
///
/// `moves` holds already-rendered SAN tokens (e.g. `"Nf3"`, `"O-O"`,
/// `"Qh4#"`) rather than `shakmaty` move types, so that formatting this
/// struct to PGN text never needs to replay the game.
#[derive(Clone, Debug, Default)]
pub struct GameRecord {
    pub headers: HeaderMap,
    pub moves: Vec<String>,
}

impl GameRecord {
    pub fn new() -> Self {
        GameRecord {
            headers: HeaderMap::new(),
            moves: Vec::new(),
        }
    }

    /// The `Result` header, defaulting to the PGN "unknown result" marker.
    pub fn result(&self) -> &str {
        self.headers.get("Result").map(String::as_str).unwrap_or("*")
    }

    /// Renders headers and the move list as PGN game text, wrapped to 80
    /// columns the way the reference formatter wraps move text.
    pub fn to_pgn_string(&self) -> String {
        let mut s = String::new();
        for (key, value) in &self.headers {
            s.push_str(&format!("[{key} \"{value}\"]\n"));
        }
        s.push('\n');

        let mut movetext = String::new();
        for (i, mv) in self.moves.iter().enumerate() {
            if i % 2 == 0 {
                movetext.push_str(&format!("{}. ", i / 2 + 1));
            }
            movetext.push_str(mv);
            movetext.push(' ');
        }
        movetext.push_str(self.result());
        s.push_str(&textwrap::fill(&movetext, 80));
        s
    }
}

impl std::fmt::Display for GameRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pgn_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headers_then_moves_then_result() {
        let mut record = GameRecord::new();
        record.headers.insert("Event".to_string(), "Test".to_string());
        record.headers.insert("Result".to_string(), "1-0".to_string());
        record.moves.push("e4".to_string());
        record.moves.push("e5".to_string());
        let text = record.to_pgn_string();
        assert!(text.starts_with("[Event \"Test\"]\n"));
        assert!(text.contains("1. e4 e5 1-0"));
    }

    #[test]
    fn defaults_to_unknown_result() {
        let record = GameRecord::new();
        assert_eq!(record.result(), "*");
    }
}
