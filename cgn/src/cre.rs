//! Chess Rule Engine adapter.
//!
//! The codec depends only on the operations below; they are a thin layer
//! over `shakmaty::Chess` rather than a reimplementation of chess rules.
//! `shakmaty`'s `Position::legal_moves()` enumerates moves in an order
//! that is a pure function of the position (fixed piece/bitboard iteration
//! order), so it already satisfies the "deterministic, same across
//! encoder and decoder" requirement without any extra sorting here.

use shakmaty::san::San;
use shakmaty::uci::Uci;
use shakmaty::{CastlingMode, Chess, Move, Position};

/// The maximum number of plies a single game is allowed to run before the
/// SGB forces a new game, regardless of whether the position is terminal.
pub const MAX_PLIES_PER_GAME: u32 = 50;

/// Half-move clock threshold (in half-moves) used to approximate
/// "can claim a draw" via the fifty-move rule. `shakmaty` does not track
/// position history, so threefold repetition is not modeled; see
/// DESIGN.md for why that is an acceptable approximation here.
const FIFTY_MOVE_HALFCLOCK: u32 = 100;

/// Returns the starting position.
pub fn initial_position() -> Chess {
    Chess::default()
}

/// Returns the legal moves for `pos` in canonical (deterministic) order.
pub fn legal_moves(pos: &Chess) -> Vec<Move> {
    pos.legal_moves().into_iter().collect()
}

/// Applies `m` to a clone of `pos`, returning the resulting position.
pub fn apply(pos: &Chess, m: &Move) -> Chess {
    let mut next = pos.clone();
    next.play_unchecked(m);
    next
}

/// Applies `m` to `pos` in place.
pub fn apply_in_place(pos: &mut Chess, m: &Move) {
    pos.play_unchecked(m);
}

/// Renders `m` as a UCI move string (e.g. `"e2e4"`, `"e7e8q"`).
pub fn move_uci(_pos: &Chess, m: &Move) -> String {
    m.to_uci(CASTLING_MODE).to_string()
}

/// Renders `m` as SAN text (e.g. `"Nf3"`, `"O-O"`) against `pos`, including
/// the check (`+`) or checkmate (`#`) suffix computed from the resulting
/// position.
pub fn move_san(pos: &Chess, m: &Move) -> String {
    let san = San::from_move(pos, m).to_string();
    let next = apply(pos, m);
    if next.is_checkmate() {
        format!("{san}#")
    } else if next.is_check() {
        format!("{san}+")
    } else {
        san
    }
}

/// Parses a UCI move string against `pos` into a [`Move`].
pub fn move_from_uci(pos: &Chess, uci: &str) -> Option<Move> {
    let parsed: Uci = uci.parse().ok()?;
    parsed.to_move(pos).ok()
}

/// Parses a SAN token (the move string, without move numbers) against
/// `pos` into a [`Move`]. Accepts the `+`/`#` suffix as emitted by
/// [`move_san`].
pub fn move_from_san(pos: &Chess, san: &str) -> Option<Move> {
    let trimmed = san.trim_end_matches(['+', '#']);
    let parsed: San = trimmed.parse().ok()?;
    parsed.to_move(pos).ok()
}

/// True once the position has no legal moves (checkmate or stalemate).
pub fn is_game_over(pos: &Chess) -> bool {
    pos.is_game_over()
}

/// True if neither side has enough material to deliver checkmate.
pub fn is_insufficient_material(pos: &Chess) -> bool {
    pos.is_insufficient_material()
}

/// Approximates "a player could claim a draw": the fifty-move rule via the
/// position's half-move clock. Threefold repetition is not modeled (see
/// module docs).
pub fn can_claim_draw(pos: &Chess) -> bool {
    pos.halfmoves() >= FIFTY_MOVE_HALFCLOCK
}

/// Number of plies played to reach `pos`, counted from game start.
pub fn move_count(pos: &Chess) -> u32 {
    let fullmoves = pos.fullmoves().get();
    let base = (fullmoves - 1) * 2;
    if pos.turn().is_black() {
        base + 1
    } else {
        base
    }
}

/// Constructs a position from its starting-position SAN history. Used by
/// tests and by the CLI's diagnostic tooling; the SGB itself never needs
/// to reconstruct a position from scratch, it plays moves incrementally.
#[cfg(test)]
pub fn replay_san(moves: &[&str]) -> Option<Chess> {
    let mut pos = initial_position();
    for san in moves {
        let m = move_from_san(&pos, san)?;
        apply_in_place(&mut pos, &m);
    }
    Some(pos)
}

/// Exposed for modules that need the castling notation used by
/// [`move_uci`]/[`move_from_uci`]; this crate always uses standard FIDE
/// castling notation (`e1g1`, not Chess960 `e1h1`).
pub const CASTLING_MODE: CastlingMode = CastlingMode::Standard;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_position_has_twenty_legal_moves() {
        let pos = initial_position();
        assert_eq!(legal_moves(&pos).len(), 20);
    }

    #[test]
    fn legal_move_order_is_deterministic() {
        let pos = initial_position();
        let a: Vec<String> = legal_moves(&pos)
            .iter()
            .map(|m| move_uci(&pos, m))
            .collect();
        let b: Vec<String> = legal_moves(&pos)
            .iter()
            .map(|m| move_uci(&pos, m))
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn uci_round_trips_through_move() {
        let pos = initial_position();
        let m = legal_moves(&pos).into_iter().next().unwrap();
        let uci = move_uci(&pos, &m);
        let parsed = move_from_uci(&pos, &uci).unwrap();
        assert_eq!(move_uci(&pos, &parsed), uci);
    }

    #[test]
    fn san_round_trips_through_move() {
        let pos = initial_position();
        let m = legal_moves(&pos)
            .into_iter()
            .find(|m| move_uci(&pos, m) == "e2e4")
            .unwrap();
        let san = move_san(&pos, &m);
        assert_eq!(san, "e4");
        let parsed = move_from_san(&pos, &san).unwrap();
        assert_eq!(move_uci(&pos, &parsed), "e2e4");
    }

    #[test]
    fn move_count_tracks_plies() {
        let pos = initial_position();
        assert_eq!(move_count(&pos), 0);
        let m = move_from_uci(&pos, "e2e4").unwrap();
        let pos = apply(&pos, &m);
        assert_eq!(move_count(&pos), 1);
        let m = move_from_uci(&pos, "e7e5").unwrap();
        let pos = apply(&pos, &m);
        assert_eq!(move_count(&pos), 2);
    }

    #[test]
    fn fools_mate_is_checkmate_and_suffixed() {
        let pos = replay_san(&["f3", "e5", "g4"]).unwrap();
        let m = move_from_uci(&pos, "d8h4").unwrap();
        assert_eq!(move_san(&pos, &m), "Qh4#");
        let mated = apply(&pos, &m);
        assert!(is_game_over(&mated));
    }
}
