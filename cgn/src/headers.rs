//! PGN header map.
//!
//! Headers are modeled as an insertion-ordered mapping rather than a
//! dynamically-typed dictionary, matching how the rest of the codec
//! favors explicit static structure over stringly-typed state. Reserved
//! keys are an enumerated set; caller-supplied headers are filtered
//! against it before being merged in.

use indexmap::IndexMap;

/// An insertion-ordered header map, preserving the order headers were
/// inserted (which is also the order they are written to PGN text).
pub type HeaderMap = IndexMap<String, String>;

/// Header keys the codec itself writes and that a caller's custom headers
/// MUST NOT override.
pub const RESERVED_KEYS: [&str; 3] = ["Seed", "DataBitLength", "ExpiryTime"];

/// True if `key` is one of the codec's reserved headers.
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Merges `custom` into `headers`, skipping any key in [`RESERVED_KEYS`]
/// and any empty value, mirroring the "default headers overridable by
/// caller-supplied ones, except the reserved set" contract in the header
/// spec. Non-reserved keys overwrite an existing value of the same key but
/// do not change its position if it was already present.
pub fn merge_custom_headers(headers: &mut HeaderMap, custom: &HeaderMap) {
    for (key, value) in custom {
        if is_reserved(key) || value.is_empty() {
            continue;
        }
        headers.insert(key.clone(), value.clone());
    }
}

/// Builds the default header set written into every game absent caller
/// overrides: `Event`, `Date`, `White`, `Black`, `Result`.
pub fn default_headers(date: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Event".to_string(), "Encoded Game".to_string());
    headers.insert("Date".to_string(), date.to_string());
    headers.insert("White".to_string(), "Player1".to_string());
    headers.insert("Black".to_string(), "Player2".to_string());
    headers.insert("Result".to_string(), "*".to_string());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_keys_are_not_overridable() {
        let mut headers = default_headers("2024.01.01");
        headers.insert("Seed".to_string(), "1".to_string());
        let mut custom = HeaderMap::new();
        custom.insert("Seed".to_string(), "999".to_string());
        custom.insert("Event".to_string(), "My Game".to_string());
        merge_custom_headers(&mut headers, &custom);
        assert_eq!(headers.get("Seed").unwrap(), "1");
        assert_eq!(headers.get("Event").unwrap(), "My Game");
    }

    #[test]
    fn empty_custom_values_are_ignored() {
        let mut headers = default_headers("2024.01.01");
        let mut custom = HeaderMap::new();
        custom.insert("Event".to_string(), String::new());
        merge_custom_headers(&mut headers, &custom);
        assert_eq!(headers.get("Event").unwrap(), "Encoded Game");
    }
}
