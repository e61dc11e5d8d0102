//! A hash-chained, append-only ledger of encoded PGN payloads.
//!
//! Each [`Block`] commits to its predecessor's hash, its own PGN payload,
//! and a proof-of-work nonce. The canonical hash input is a hand-built,
//! sorted-key string (mirroring `json.dumps(..., sort_keys=True)` in the
//! reference implementation) rather than routed through `serde_json`,
//! so the exact byte layout that gets hashed is explicit and stable
//! regardless of how `serde`'s map serialization happens to order fields.
//! The ledger's own on-disk persistence (`save`/`load`), by contrast, is
//! an ordinary `serde_json` document (that shape is this crate's own
//! choice, not part of the hashing contract).

use crate::error::{CgnError, Result};
use crate::pgn_document;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Literal text appended to a block's PGN payload once it is swept as
/// expired. Chosen over rehashing-and-relinking the chain: a swept block's
/// stored hash deliberately stops matching its recomputed hash, so
/// [`Ledger::verify_chain`] reports `false` for a ledger containing expired
/// blocks. Callers that need to distinguish "expired" from "tampered" must
/// call [`Ledger::sweep`] before [`Ledger::verify_chain`].
pub const EXPIRED_MARKER: &str = "[EXPIRED]";

/// Default proof-of-work difficulty: number of leading hex zero digits a
/// block's hash must have.
pub const DEFAULT_DIFFICULTY: usize = 2;

/// One block in the chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: i64,
    pub pgn_data: String,
    pub previous_hash: String,
    pub nonce: u64,
    pub hash: String,
}

impl Block {
    /// Builds the canonical string that gets hashed: a JSON-object-shaped
    /// string with keys in fixed lexicographic order, independent of
    /// whatever field order `derive(Serialize)` would otherwise pick.
    fn canonical_string(
        index: u64,
        timestamp: i64,
        pgn_data: &str,
        previous_hash: &str,
        nonce: u64,
    ) -> String {
        format!(
            "{{\"index\":{index},\"nonce\":{nonce},\"pgn_data\":{},\"previous_hash\":{},\"timestamp\":{timestamp}}}",
            json_escape(pgn_data),
            json_escape(previous_hash),
        )
    }

    fn compute_hash(
        index: u64,
        timestamp: i64,
        pgn_data: &str,
        previous_hash: &str,
        nonce: u64,
    ) -> String {
        let canonical = Self::canonical_string(index, timestamp, pgn_data, previous_hash, nonce);
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Recomputes this block's hash from its current fields, ignoring the
    /// `hash` field stored on it. Used by [`Ledger::verify_chain`] to
    /// detect tampering.
    fn recompute_hash(&self) -> String {
        Self::compute_hash(
            self.index,
            self.timestamp,
            &self.pgn_data,
            &self.previous_hash,
            self.nonce,
        )
    }
}

fn json_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Mines `nonce` starting from zero until the block's hash has `difficulty`
/// leading hex zero digits, returning the mined `(nonce, hash)`.
fn mine_block(
    index: u64,
    timestamp: i64,
    pgn_data: &str,
    previous_hash: &str,
    difficulty: usize,
) -> (u64, String) {
    let target_prefix = "0".repeat(difficulty);
    let mut nonce = 0u64;
    loop {
        let hash = Block::compute_hash(index, timestamp, pgn_data, previous_hash, nonce);
        if hash.starts_with(&target_prefix) {
            return (nonce, hash);
        }
        nonce += 1;
    }
}

/// A pending self-destruct timer for one block, independent of any
/// `ExpiryTime` header carried inside that block's own PGN text. Separated
/// out (rather than re-parsing PGN headers on every sweep) so the ledger's
/// expiry bookkeeping does not depend on the payload being decodable PGN.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpiryEntry {
    pub block_index: u64,
    pub expiry_time: i64,
}

/// An append-only, hash-chained sequence of encoded PGN payloads.
#[derive(Serialize, Deserialize)]
pub struct Ledger {
    pub chain: Vec<Block>,
    pub difficulty: usize,
    pub expiry_entries: Vec<ExpiryEntry>,
}

impl Ledger {
    /// Creates a ledger with a freshly-mined genesis block.
    pub fn new(difficulty: usize) -> Self {
        let timestamp = now_unix();
        let genesis_data = "Genesis Block";
        let (nonce, hash) = mine_block(0, timestamp, genesis_data, "0", difficulty);
        let genesis = Block {
            index: 0,
            timestamp,
            pgn_data: genesis_data.to_string(),
            previous_hash: "0".to_string(),
            nonce,
            hash,
        };
        log::debug!("mined genesis block with difficulty {difficulty}");
        Ledger {
            chain: vec![genesis],
            difficulty,
            expiry_entries: Vec::new(),
        }
    }

    /// Appends `pgn_data` as a new block, optionally recording `expiry` as
    /// an [`ExpiryEntry`], and returns the new block's index.
    pub fn add_pgn(&mut self, pgn_data: String, expiry: Option<i64>) -> u64 {
        let previous = self.chain.last().expect("chain always has a genesis block");
        let index = previous.index + 1;
        let timestamp = now_unix();
        let (nonce, hash) = mine_block(index, timestamp, &pgn_data, &previous.hash, self.difficulty);
        log::debug!("mined block {index} with nonce {nonce}");
        self.chain.push(Block {
            index,
            timestamp,
            pgn_data,
            previous_hash: previous.hash.clone(),
            nonce,
            hash,
        });
        if let Some(expiry_time) = expiry {
            self.expiry_entries.push(ExpiryEntry {
                block_index: index,
                expiry_time,
            });
        }
        index
    }

    /// Looks up the PGN payload stored at `index`, returning `None` if the
    /// index does not exist or the block has expired. Callers that need to
    /// tell "missing" apart from "expired" should call
    /// [`Self::is_expired`] first.
    pub fn retrieve(&self, index: u64) -> Option<String> {
        if self.is_expired(index) {
            return None;
        }
        self.chain
            .iter()
            .find(|b| b.index == index)
            .map(|b| b.pgn_data.clone())
    }

    /// True if the block at `index` already carries the swept-expired
    /// marker, or has a pending [`ExpiryEntry`] whose `expiry_time` has
    /// already passed.
    pub fn is_expired(&self, index: u64) -> bool {
        let already_swept = self
            .chain
            .iter()
            .find(|b| b.index == index)
            .map(|b| b.pgn_data.contains(EXPIRED_MARKER))
            .unwrap_or(false);
        if already_swept {
            return true;
        }
        self.expiry_entries
            .iter()
            .any(|e| e.block_index == index && e.expiry_time <= now_unix())
    }

    /// Fires every pending [`ExpiryEntry`] whose `expiry_time` has passed:
    /// appends [`EXPIRED_MARKER`] to the corresponding block's PGN text and
    /// removes the entry from the pending list. Idempotent: a second call
    /// with no newly-fired entries is a no-op.
    ///
    /// Intentionally does not rehash or relink the chain: a swept block's
    /// stored `hash` no longer matches its payload, so
    /// [`Self::verify_chain`] will report tampering for any chain
    /// containing a swept block, by design.
    pub fn sweep(&mut self) -> Vec<u64> {
        let now = now_unix();
        let (fired, pending): (Vec<_>, Vec<_>) = self
            .expiry_entries
            .drain(..)
            .partition(|e| e.expiry_time <= now);
        self.expiry_entries = pending;

        let mut swept = Vec::new();
        for entry in fired {
            if let Some(block) = self.chain.iter_mut().find(|b| b.index == entry.block_index) {
                if !block.pgn_data.contains(EXPIRED_MARKER) {
                    block.pgn_data.push('\n');
                    block.pgn_data.push_str(EXPIRED_MARKER);
                    log::info!("swept expired block {}", block.index);
                }
                swept.push(entry.block_index);
            }
        }
        swept
    }

    /// Verifies every block's stored hash matches its recomputed hash, that
    /// the hash carries the required proof-of-work difficulty prefix, and
    /// that each block's `previous_hash` matches its predecessor's stored
    /// hash. Returns `false` for any tampering, including the expected
    /// hash mismatch left behind by [`Self::sweep`].
    pub fn verify_chain(&self) -> bool {
        let target_prefix = "0".repeat(self.difficulty);
        for (i, block) in self.chain.iter().enumerate() {
            if block.hash != block.recompute_hash() {
                log::warn!("block {} hash mismatch", block.index);
                return false;
            }
            if !block.hash.starts_with(&target_prefix) {
                log::warn!("block {} hash does not meet difficulty {}", block.index, self.difficulty);
                return false;
            }
            if i > 0 && block.previous_hash != self.chain[i - 1].hash {
                log::warn!("block {} previous_hash mismatch", block.index);
                return false;
            }
        }
        true
    }

    /// Persists the ledger as a single JSON document.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CgnError::InputMalformed(format!("failed to serialize ledger: {e}")))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads a ledger previously written by [`Self::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| CgnError::InputMalformed(format!("failed to parse ledger file: {e}")))
    }
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Extracts the `ExpiryTime` header from the first game of `pgn_text`, if
/// any, so it can be carried into the ledger's own [`ExpiryEntry`]
/// bookkeeping alongside the payload.
fn extract_expiry_header(pgn_text: &str) -> Option<i64> {
    let document = pgn_document::PgnDocument::parse(pgn_text).ok()?;
    document
        .games
        .first()?
        .headers
        .get("ExpiryTime")?
        .parse()
        .ok()
}

/// Encodes `pgn_text` onto the ledger, returning PGN text with a trailing
/// `[BlockchainRef "<index>"]` tag pointing at the stored block.
pub fn blockchain_encode(ledger: &mut Ledger, pgn_text: &str) -> String {
    let expiry = extract_expiry_header(pgn_text);
    let index = ledger.add_pgn(pgn_text.to_string(), expiry);
    pgn_document::append_blockchain_ref(pgn_text, index)
}

/// Resolves a `[BlockchainRef "<index>"]`-tagged PGN text against the
/// ledger: sweeps expired blocks first (so a legitimately-expired block
/// surfaces as [`CgnError::Expired`] rather than an opaque tamper
/// failure), verifies the chain, then compares the on-disk text (with its
/// `BlockchainRef` tag stripped) against the ledger's own stored copy.
/// Any mismatch is reported as [`CgnError::Tampered`] even if the chain
/// hashes still verify, since only the ledger's copy is hash-committed,
/// not whatever text a caller hands to `blockchain_decode`.
pub fn blockchain_decode(ledger: &mut Ledger, tagged_pgn_text: &str) -> Result<String> {
    let (on_disk_text, index) = pgn_document::extract_blockchain_ref(tagged_pgn_text);
    let index = index.ok_or_else(|| {
        CgnError::InputMalformed("PGN text has no BlockchainRef tag".to_string())
    })?;

    ledger.sweep();

    if ledger.is_expired(index) {
        return Err(CgnError::Expired(format!("block {index} has expired")));
    }

    if !ledger.verify_chain() {
        return Err(CgnError::Tampered(
            "ledger hash chain failed verification".to_string(),
        ));
    }

    let stored_text = ledger
        .retrieve(index)
        .ok_or_else(|| CgnError::InputMalformed(format!("no block found at index {index}")))?;

    if stored_text != on_disk_text {
        return Err(CgnError::Tampered(format!(
            "on-disk PGN for block {index} does not match the ledger's stored copy"
        )));
    }

    Ok(stored_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_block_is_mined_to_difficulty() {
        let ledger = Ledger::new(1);
        assert!(ledger.chain[0].hash.starts_with('0'));
    }

    #[test]
    fn appended_blocks_link_to_predecessor() {
        let mut ledger = Ledger::new(1);
        let idx = ledger.add_pgn("game one".to_string(), None);
        assert_eq!(idx, 1);
        assert_eq!(ledger.chain[1].previous_hash, ledger.chain[0].hash);
    }

    #[test]
    fn retrieve_returns_none_for_missing_index() {
        let ledger = Ledger::new(1);
        assert_eq!(ledger.retrieve(42), None);
    }

    #[test]
    fn retrieve_returns_stored_payload() {
        let mut ledger = Ledger::new(1);
        let idx = ledger.add_pgn("stored game".to_string(), None);
        assert_eq!(ledger.retrieve(idx).unwrap(), "stored game");
    }

    #[test]
    fn verify_chain_passes_on_untouched_chain() {
        let mut ledger = Ledger::new(1);
        ledger.add_pgn("a".to_string(), None);
        ledger.add_pgn("b".to_string(), None);
        assert!(ledger.verify_chain());
    }

    #[test]
    fn verify_chain_fails_after_payload_tamper() {
        let mut ledger = Ledger::new(1);
        ledger.add_pgn("original".to_string(), None);
        ledger.chain[1].pgn_data = "tampered".to_string();
        assert!(!ledger.verify_chain());
    }

    #[test]
    fn verify_chain_fails_when_a_block_does_not_meet_difficulty() {
        // A block whose stored hash is internally consistent (matches its
        // recomputed hash) but was mined to a lower difficulty than the
        // ledger now requires must still fail verification; a hash/back-link
        // check alone would miss this.
        let mut ledger = Ledger::new(0);
        ledger.add_pgn("a".to_string(), None);
        ledger.difficulty = 64;
        assert!(!ledger.verify_chain());
    }

    #[test]
    fn sweep_marks_expired_blocks_and_breaks_verification() {
        let mut ledger = Ledger::new(1);
        let idx = ledger.add_pgn("a game".to_string(), Some(1));
        let swept = ledger.sweep();
        assert_eq!(swept, vec![idx]);
        assert!(ledger.chain[idx as usize].pgn_data.contains(EXPIRED_MARKER));
        assert!(!ledger.verify_chain());
    }

    #[test]
    fn sweep_is_idempotent() {
        let mut ledger = Ledger::new(1);
        ledger.add_pgn("a game".to_string(), Some(1));
        let first = ledger.sweep();
        let text_after_first = ledger.chain[1].pgn_data.clone();
        let second = ledger.sweep();
        assert_eq!(first, vec![1]);
        assert!(second.is_empty());
        assert_eq!(ledger.chain[1].pgn_data, text_after_first);
    }

    #[test]
    fn retrieve_hides_expired_block_before_sweep_runs() {
        let mut ledger = Ledger::new(1);
        let idx = ledger.add_pgn("soon gone".to_string(), Some(1));
        assert!(ledger.is_expired(idx));
        assert_eq!(ledger.retrieve(idx), None);
    }

    #[test]
    fn blockchain_encode_decode_round_trips() {
        let mut ledger = Ledger::new(1);
        let pgn = "[Event \"E\"]\n[Seed \"1\"]\n[DataBitLength \"8\"]\n\n1. e4 *";
        let tagged = blockchain_encode(&mut ledger, pgn);
        let recovered = blockchain_decode(&mut ledger, &tagged).unwrap();
        assert_eq!(recovered, pgn);
    }

    #[test]
    fn blockchain_decode_reports_expiry_not_tamper() {
        let mut ledger = Ledger::new(1);
        let pgn =
            "[Event \"E\"]\n[Seed \"1\"]\n[DataBitLength \"8\"]\n[ExpiryTime \"1\"]\n\n1. e4 *";
        let tagged = blockchain_encode(&mut ledger, pgn);
        let err = blockchain_decode(&mut ledger, &tagged).unwrap_err();
        assert!(matches!(err, CgnError::Expired(_)));
    }

    #[test]
    fn blockchain_decode_reports_tamper_for_foreign_corruption() {
        let mut ledger = Ledger::new(1);
        let pgn = "[Event \"E\"]\n[Seed \"1\"]\n[DataBitLength \"8\"]\n\n1. e4 *";
        let tagged = blockchain_encode(&mut ledger, pgn);
        ledger.chain[0].pgn_data = "corrupted genesis".to_string();
        let err = blockchain_decode(&mut ledger, &tagged).unwrap_err();
        assert!(matches!(err, CgnError::Tampered(_)));
    }

    #[test]
    fn blockchain_decode_reports_tamper_when_on_disk_pgn_diverges_from_ledger() {
        let mut ledger = Ledger::new(1);
        let pgn = "[Event \"E\"]\n[Seed \"1\"]\n[DataBitLength \"8\"]\n\n1. e4 *";
        let mut tagged = blockchain_encode(&mut ledger, pgn);
        tagged = tagged.replace("e4", "d4");
        let err = blockchain_decode(&mut ledger, &tagged).unwrap_err();
        assert!(matches!(err, CgnError::Tampered(_)));
    }

    #[test]
    fn save_and_load_round_trips() {
        let mut ledger = Ledger::new(1);
        ledger.add_pgn("a game".to_string(), Some(1));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        ledger.save(&path).unwrap();
        let loaded = Ledger::load(&path).unwrap();
        assert_eq!(loaded.chain.len(), ledger.chain.len());
        assert_eq!(loaded.expiry_entries.len(), ledger.expiry_entries.len());
        assert!(loaded.verify_chain());
    }
}
