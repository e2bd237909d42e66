//! Short token codec
//!
//! Generated tokens are the Base62 positional representation of a numeric id,
//! most-significant symbol first. Custom tokens are checked against the same
//! alphabet extended with `-` and `_`.

/// Base62 字母表：数字、大写、小写
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const BASE: u64 = ALPHABET.len() as u64;

/// Encode a numeric id as a Base62 token.
///
/// `0` encodes to the empty string; allocated ids start at 1 so this never
/// reaches the store.
pub fn encode(mut id: u64) -> String {
    // u64::MAX 在 base62 下是 11 位
    let mut buf = Vec::with_capacity(11);
    while id > 0 {
        buf.push(ALPHABET[(id % BASE) as usize]);
        id /= BASE;
    }
    buf.reverse();
    // 字母表全部是 ASCII
    buf.into_iter().map(char::from).collect()
}

/// Decode a Base62 token back to its id.
///
/// Returns `None` for symbols outside the alphabet or values that overflow
/// `u64`. Custom tokens containing `-` or `_` never decode.
pub fn decode(token: &str) -> Option<u64> {
    token.bytes().try_fold(0u64, |acc, b| {
        let digit = symbol_value(b)?;
        acc.checked_mul(BASE)?.checked_add(digit)
    })
}

#[inline]
fn symbol_value(b: u8) -> Option<u64> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u64),
        b'A'..=b'Z' => Some((b - b'A') as u64 + 10),
        b'a'..=b'z' => Some((b - b'a') as u64 + 36),
        _ => None,
    }
}

/// Check a caller-supplied token.
///
/// The empty string is not a valid custom token; the engine treats it as
/// "no custom token requested" before calling this.
pub fn validate_custom_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_small_ids() {
        assert_eq!(encode(0), "");
        assert_eq!(encode(1), "1");
        assert_eq!(encode(9), "9");
        assert_eq!(encode(10), "A");
        assert_eq!(encode(35), "Z");
        assert_eq!(encode(36), "a");
        assert_eq!(encode(61), "z");
    }

    #[test]
    fn test_encode_carries_to_next_position() {
        assert_eq!(encode(62), "10");
        assert_eq!(encode(63), "11");
        assert_eq!(encode(62 * 62), "100");
        assert_eq!(encode(62 * 62 - 1), "zz");
    }

    #[test]
    fn test_encode_max_value() {
        let token = encode(u64::MAX);
        assert_eq!(token.len(), 11);
        assert_eq!(decode(&token), Some(u64::MAX));
    }

    #[test]
    fn test_decode_inverts_encode() {
        for id in [1u64, 61, 62, 3843, 3844, 1_000_000, 987_654_321_012] {
            assert_eq!(decode(&encode(id)), Some(id), "id {}", id);
        }
    }

    #[test]
    fn test_decode_rejects_foreign_symbols() {
        assert_eq!(decode("abc-def"), None);
        assert_eq!(decode("under_score"), None);
        assert_eq!(decode("ümlaut"), None);
    }

    #[test]
    fn test_decode_overflow() {
        // 12 个 'z' 超出 u64 范围
        assert_eq!(decode(&"z".repeat(12)), None);
    }

    #[test]
    fn test_distinct_ids_give_distinct_tokens() {
        let tokens: std::collections::HashSet<String> = (1..=10_000).map(encode).collect();
        assert_eq!(tokens.len(), 10_000);
    }

    #[test]
    fn test_validate_custom_token() {
        assert!(validate_custom_token("valid-token_1"));
        assert!(validate_custom_token("ABCxyz019"));
        assert!(validate_custom_token("-"));
        assert!(!validate_custom_token(""));
        assert!(!validate_custom_token("invalid@token"));
        assert!(!validate_custom_token("with space"));
        assert!(!validate_custom_token("path/segment"));
        assert!(!validate_custom_token("dot.ted"));
        assert!(!validate_custom_token("café"));
    }
}
