use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

/// Confirmation links stay valid for 14 days after approval. Expiry is
/// enforced only at acceptance time; an expired, unconsumed token simply
/// stays unusable.
pub const TOKEN_VALIDITY_DAYS: i64 = 14;

/// A 128-bit random confirmation token, base64url-encoded without padding.
///
/// Drawn from the OS entropy source, so tokens are unguessable and
/// collisions are out of practical reach. The request store still enforces
/// global uniqueness as a backstop.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tokens_are_url_safe_and_distinct() {
        let mut seen = HashSet::new();
        for _ in 0..1_000 {
            let token = generate_token();
            // 16 bytes -> 22 base64url chars, no padding.
            assert_eq!(token.len(), 22);
            assert!(token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
            assert!(seen.insert(token));
        }
    }
}
