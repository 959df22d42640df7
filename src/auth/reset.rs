use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Random bytes in an e-mailed reset token
const TOKEN_BYTES: usize = 20;

/// A freshly issued reset token. Only `hash` is stored; `token` goes out by e-mail.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub token: String,
    pub hash: String,
    pub expires: DateTime<Utc>,
}

impl ResetToken {
    pub fn generate(expiry_minutes: i64) -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);
        let hash = hash_token(&token);
        Self {
            token,
            hash,
            expires: Utc::now() + Duration::minutes(expiry_minutes),
        }
    }
}

/// SHA-256 hex digest, the form reset tokens are stored and looked up in
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_forty_hex_chars_and_hash_matches() {
        let reset = ResetToken::generate(10);
        assert_eq!(reset.token.len(), 40);
        assert!(reset.token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(reset.hash, hash_token(&reset.token));
        assert_ne!(reset.hash, reset.token);
    }

    #[test]
    fn expiry_is_in_the_future() {
        let reset = ResetToken::generate(10);
        let remaining = reset.expires - Utc::now();
        assert!(remaining > Duration::minutes(9));
        assert!(remaining <= Duration::minutes(10));
    }

    #[test]
    fn known_digest() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(ResetToken::generate(10).token, ResetToken::generate(10).token);
    }
}
