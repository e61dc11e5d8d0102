//! Steganographic Game Builder / Parser (SGB).
//!
//! Drives the CRE to produce and consume PGN games that embed a bit
//! stream, maintaining the per-game keyed shuffle described in
//! `crate::shuffle`. This is the heart of the codec; `crate::api` is a thin
//! file-path wrapper around [`encode_to_document`] and
//! [`decode_from_document`].

use crate::bitstream::{BitAccumulator, BitReader};
use crate::cre;
use crate::error::{CgnError, Result};
use crate::game_record::GameRecord;
use crate::headers::{default_headers, merge_custom_headers, HeaderMap};
use crate::pgn_document::PgnDocument;
use crate::shuffle::GameRng;
use chrono::Local;
use rand::Rng;

/// Lower bound (inclusive) of the uniform range a fresh per-game seed is
/// drawn from.
const SEED_MIN: u64 = 1;
/// Upper bound (inclusive) of the uniform range a fresh per-game seed is
/// drawn from.
const SEED_MAX: u64 = 1_000_000;

/// Caller-supplied knobs for [`encode_to_document`].
#[derive(Clone, Debug, Default)]
pub struct EncodeOptions {
    /// Number of seconds after encoding completes that the payload should
    /// become undecodable. `None` means no expiry.
    pub self_destruct_seconds: Option<u64>,
    /// Extra or overriding PGN headers. `Seed`, `DataBitLength`, and
    /// `ExpiryTime` are reserved and silently dropped if present.
    pub custom_headers: HeaderMap,
}

/// Encodes `payload` into a [`PgnDocument`] whose games' move choices
/// carry the payload bits, per the per-ply mapping in the module spec.
pub fn encode_to_document(payload: &[u8], options: &EncodeOptions) -> Result<PgnDocument> {
    if payload.is_empty() {
        return Err(CgnError::InputMissing(
            "payload is empty".to_string(),
        ));
    }

    let total_bits = payload.len() * 8;
    let mut reader = BitReader::new(payload);
    let expiry_time = options
        .self_destruct_seconds
        .map(|secs| now_unix() + secs as i64);

    let mut games: Vec<GameRecord> = Vec::new();
    let mut game_number: u32 = 1;

    let mut pos = cre::initial_position();
    let mut seed = draw_seed();
    let mut rng = GameRng::new(seed);
    let mut moves: Vec<String> = Vec::new();

    while reader.remaining() > 0 {
        let legal = cre::legal_moves(&pos);
        let n = legal.len();

        if n <= 1 {
            if let Some(m) = legal.into_iter().next() {
                moves.push(cre::move_san(&pos, &m));
                cre::apply_in_place(&mut pos, &m);
                log::debug!("pushed forced move in game {game_number}");
            }
            if n == 0 || should_end_game(&pos) {
                let is_first = games.is_empty();
                games.push(finalize_game(
                    is_first,
                    game_number,
                    seed,
                    total_bits,
                    expiry_time,
                    &options.custom_headers,
                    std::mem::take(&mut moves),
                ));
                pos = cre::initial_position();
                seed = draw_seed();
                rng = GameRng::new(seed);
                game_number += 1;
            }
            continue;
        }

        let capacity = floor_log2(n);
        let bits_to_encode = capacity.min(reader.remaining());
        let (idx, consumed) = reader.extract_uint(bits_to_encode);
        debug_assert_eq!(consumed, bits_to_encode);

        let mut shuffled = legal;
        rng.shuffle(&mut shuffled);
        if idx >= shuffled.len() {
            return Err(CgnError::Overflow(format!(
                "move index {idx} out of range for {} legal moves",
                shuffled.len()
            )));
        }
        let chosen = &shuffled[idx];
        moves.push(cre::move_san(&pos, chosen));
        cre::apply_in_place(&mut pos, chosen);
        log::debug!("encoded {bits_to_encode} bits into ply {}", moves.len());

        if should_end_game(&pos) {
            let is_first = games.is_empty();
            games.push(finalize_game(
                is_first,
                game_number,
                seed,
                total_bits,
                expiry_time,
                &options.custom_headers,
                std::mem::take(&mut moves),
            ));
            if reader.remaining() > 0 {
                pos = cre::initial_position();
                seed = draw_seed();
                rng = GameRng::new(seed);
                game_number += 1;
            }
        }
    }

    if !moves.is_empty() {
        let is_first = games.is_empty();
        games.push(finalize_game(
            is_first,
            game_number,
            seed,
            total_bits,
            expiry_time,
            &options.custom_headers,
            moves,
        ));
    }

    Ok(PgnDocument { games })
}

/// Decodes the payload bits embedded in `document` back into bytes.
///
/// Stops exactly at `DataBitLength` bits if present (§4.3.5); otherwise
/// consumes every ply in the document and logs a warning that the result
/// may be right-padded and therefore lossy for non-byte-aligned payloads.
pub fn decode_from_document(document: &PgnDocument) -> Result<Vec<u8>> {
    let first = document
        .games
        .first()
        .ok_or_else(|| CgnError::InputMalformed("PGN document has no games".to_string()))?;

    if let Some(expiry_str) = first.headers.get("ExpiryTime") {
        let expiry: i64 = expiry_str
            .parse()
            .map_err(|_| CgnError::InputMalformed("ExpiryTime is not an integer".to_string()))?;
        let now = now_unix();
        if expiry < now {
            log::warn!("payload expired at {expiry}, current time {now}");
            return Err(CgnError::Expired(format!(
                "payload expired at {expiry}, current time is {now}"
            )));
        }
    }

    let expected_bits: Option<usize> = match first.headers.get("DataBitLength") {
        Some(s) => Some(s.parse().map_err(|_| {
            CgnError::InputMalformed("DataBitLength is not an integer".to_string())
        })?),
        None => {
            log::warn!("DataBitLength header missing; falling back to lossy full-document decode");
            None
        }
    };

    let mut accumulator = BitAccumulator::new();
    let mut extracted_bits: usize = 0;

    'games: for (game_index, game) in document.games.iter().enumerate() {
        let seed: u64 = game.headers.get("Seed").map(String::as_str).unwrap_or("1")
            .parse()
            .map_err(|_| {
                CgnError::InputMalformed(format!("invalid Seed in game {}", game_index + 1))
            })?;
        let mut rng = GameRng::new(seed);
        let mut pos = cre::initial_position();

        for (ply_index, san_token) in game.moves.iter().enumerate() {
            if let Some(expected) = expected_bits {
                if extracted_bits >= expected {
                    log::debug!(
                        "stopping extraction at game {}, ply {}: have {} bits, need {}",
                        game_index + 1,
                        ply_index,
                        extracted_bits,
                        expected
                    );
                    break;
                }
            }

            let legal = cre::legal_moves(&pos);
            let n = legal.len();

            if n <= 1 {
                let played = cre::move_from_san(&pos, san_token).ok_or_else(|| {
                    CgnError::Desync {
                        game: game_index + 1,
                        ply: ply_index + 1,
                        detail: format!("could not resolve forced move '{san_token}'"),
                    }
                })?;
                cre::apply_in_place(&mut pos, &played);
                continue;
            }

            let mut shuffled = legal;
            rng.shuffle(&mut shuffled);

            let played = cre::move_from_san(&pos, san_token).ok_or_else(|| CgnError::Desync {
                game: game_index + 1,
                ply: ply_index + 1,
                detail: format!("could not resolve move '{san_token}'"),
            })?;
            let played_uci = cre::move_uci(&pos, &played);
            let idx = shuffled
                .iter()
                .position(|m| cre::move_uci(&pos, m) == played_uci)
                .ok_or_else(|| CgnError::Desync {
                    game: game_index + 1,
                    ply: ply_index + 1,
                    detail: format!("played move '{san_token}' not in permuted legal-move list"),
                })?;

            let capacity = floor_log2(n);
            let bits_to_extract = match expected_bits {
                Some(expected) => capacity.min(expected.saturating_sub(extracted_bits)),
                None => capacity,
            };
            if bits_to_extract > 0 {
                accumulator.push_uint(idx, bits_to_extract);
                extracted_bits += bits_to_extract;
            }

            cre::apply_in_place(&mut pos, &played);
        }

        if let Some(expected) = expected_bits {
            if extracted_bits >= expected {
                break 'games;
            }
        }
    }

    if let Some(expected) = expected_bits {
        if extracted_bits < expected {
            return Err(CgnError::InputMalformed(format!(
                "PGN ended after {extracted_bits} bits, expected {expected}"
            )));
        }
    }

    Ok(accumulator.into_bytes())
}

/// A game ends when any of: the position is over, insufficient material
/// remains, a draw can be claimed, or the per-game ply cap is reached.
fn should_end_game(pos: &shakmaty::Chess) -> bool {
    cre::is_game_over(pos)
        || cre::is_insufficient_material(pos)
        || cre::can_claim_draw(pos)
        || cre::move_count(pos) >= cre::MAX_PLIES_PER_GAME
}

#[allow(clippy::too_many_arguments)]
fn finalize_game(
    is_first: bool,
    game_number: u32,
    seed: u64,
    total_bits: usize,
    expiry_time: Option<i64>,
    custom_headers: &HeaderMap,
    moves: Vec<String>,
) -> GameRecord {
    let mut headers = HeaderMap::new();
    headers.insert("Seed".to_string(), seed.to_string());
    for (key, value) in default_headers(&Local::now().format("%Y.%m.%d").to_string()) {
        headers.insert(key, value);
    }
    merge_custom_headers(&mut headers, custom_headers);

    if !headers.contains_key("Round") && game_number > 1 {
        headers.insert("Round".to_string(), game_number.to_string());
    }

    if is_first {
        if let Some(expiry) = expiry_time {
            headers.insert("ExpiryTime".to_string(), expiry.to_string());
            headers.insert(
                "ExpiryTimeReadable".to_string(),
                format_local_time(expiry),
            );
        }
        headers.insert("DataBitLength".to_string(), total_bits.to_string());
    }

    log::debug!("finalized game {game_number} with {} plies", moves.len());
    GameRecord { headers, moves }
}

fn draw_seed() -> u64 {
    rand::thread_rng().gen_range(SEED_MIN..=SEED_MAX)
}

fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn format_local_time(unix_seconds: i64) -> String {
    use chrono::TimeZone;
    Local
        .timestamp_opt(unix_seconds, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| unix_seconds.to_string())
}

/// `floor(log2(n))` for `n >= 1`, computed via bit position rather than
/// floating point to avoid precision edge cases at powers of two.
fn floor_log2(n: usize) -> usize {
    debug_assert!(n >= 1);
    (usize::BITS - 1 - (n as u32).leading_zeros()) as usize
}
