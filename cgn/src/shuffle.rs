//! Per-game keyed shuffle of the legal-move list.
//!
//! The generator is pinned to `rand::rngs::StdRng` seeded via
//! `seed_from_u64`, and the permutation is `rand::seq::SliceRandom::shuffle`
//! (a Fisher-Yates shuffle). Both the encoder and decoder MUST perform the
//! same shuffle at every ply where two or more moves are legal, even when
//! only the first element of the result is needed, so that the PRNG state
//! at ply *t+1* is identical on both sides.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shakmaty::Move;

/// The per-game pseudo-random generator, keyed by the game's `Seed`
/// header.
pub struct GameRng(StdRng);

impl GameRng {
    /// Creates a generator keyed by `seed`.
    pub fn new(seed: u64) -> Self {
        GameRng(StdRng::seed_from_u64(seed))
    }

    /// Shuffles `moves` in place using this game's keyed generator.
    ///
    /// Always shuffles the full list, regardless of how many elements the
    /// caller actually needs, so that encoder and decoder PRNG state stays
    /// in lockstep ply over ply.
    pub fn shuffle(&mut self, moves: &mut [Move]) {
        moves.shuffle(&mut self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cre;

    #[test]
    fn same_seed_produces_same_permutation() {
        let pos = cre::initial_position();
        let mut a = cre::legal_moves(&pos);
        let mut b = cre::legal_moves(&pos);

        GameRng::new(42).shuffle(&mut a);
        GameRng::new(42).shuffle(&mut b);

        let ua: Vec<String> = a.iter().map(|m| cre::move_uci(&pos, m)).collect();
        let ub: Vec<String> = b.iter().map(|m| cre::move_uci(&pos, m)).collect();
        assert_eq!(ua, ub);
    }

    #[test]
    fn different_seeds_usually_differ() {
        let pos = cre::initial_position();
        let mut a = cre::legal_moves(&pos);
        let mut b = cre::legal_moves(&pos);

        GameRng::new(1).shuffle(&mut a);
        GameRng::new(2).shuffle(&mut b);

        let ua: Vec<String> = a.iter().map(|m| cre::move_uci(&pos, m)).collect();
        let ub: Vec<String> = b.iter().map(|m| cre::move_uci(&pos, m)).collect();
        assert_ne!(ua, ub);
    }

    #[test]
    fn sequential_shuffles_keep_rng_state_in_sync() {
        // Two independent generators seeded identically must advance
        // identically across several plies, which is what lets the
        // decoder replay the encoder's shuffles ply by ply.
        let pos = cre::initial_position();
        let mut rng_a = GameRng::new(7);
        let mut rng_b = GameRng::new(7);

        for _ in 0..5 {
            let mut moves_a = cre::legal_moves(&pos);
            let mut moves_b = cre::legal_moves(&pos);
            rng_a.shuffle(&mut moves_a);
            rng_b.shuffle(&mut moves_b);
            let ua: Vec<String> = moves_a.iter().map(|m| cre::move_uci(&pos, m)).collect();
            let ub: Vec<String> = moves_b.iter().map(|m| cre::move_uci(&pos, m)).collect();
            assert_eq!(ua, ub);
        }
    }
}
