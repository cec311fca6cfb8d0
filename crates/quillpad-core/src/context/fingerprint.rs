//! Deterministic input fingerprints for cache keys.
//!
//! A 32-bit polynomial rolling hash (`h = h * 31 + unit`, two's-complement
//! wraparound) over the UTF-16 code units of the raw input, rendered as a
//! signed decimal. Cheap and stable across processes; collisions are
//! accepted.

/// Fingerprint `text`.
pub fn fingerprint(text: &str) -> String {
    hash32(text).to_string()
}

/// The raw signed 32-bit hash.
pub fn hash32(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Cache key for `text` under `prefix`.
pub fn cache_key(prefix: &str, text: &str) -> String {
    format!("{prefix}{}", fingerprint(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(fingerprint(""), "0");
        assert_eq!(fingerprint("a"), "97");
        assert_eq!(fingerprint("hello"), "99162322");
    }

    #[test]
    fn test_wraparound_matches_twos_complement() {
        assert_eq!(fingerprint("Hello World"), "-862545276");
        assert_eq!(
            fingerprint("The quick brown fox jumps over the lazy dog"),
            "-609428141"
        );
    }

    #[test]
    fn test_hashes_utf16_units() {
        // Non-BMP characters hash as their surrogate pair.
        assert_eq!(fingerprint("😀"), "1772899");
        assert_eq!(fingerprint("héllo wörld"), "1628148953");
    }

    #[test]
    fn test_block_payload() {
        assert_eq!(
            fingerprint(r#"[{"kind":"heading","content":"Title"}]"#),
            "1204631749"
        );
    }

    #[test]
    fn test_deterministic() {
        let s = "some document ".repeat(1000);
        assert_eq!(fingerprint(&s), fingerprint(&s));
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("context:", "hello"), "context:99162322");
    }
}
