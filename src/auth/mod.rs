//! Authentication module
//!
//! Members log in with a password and receive a bearer token. Requests
//! without a valid token are treated as guests.

pub mod accounts;

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use sha2::{Digest, Sha256};

/// Member names: 3-32 characters of letters, digits and underscores
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,32}$").unwrap());

/// Check a member name against the allowed pattern
pub fn is_valid_username(username: &str) -> bool {
    USERNAME_REGEX.is_match(username)
}

/// Generate a random 256-bit bearer token, hex encoded
pub fn generate_token() -> String {
    let random_bytes: [u8; 32] = rand::rng().random();
    hex::encode(random_bytes)
}

/// Salted SHA-256 password hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub salt: String,
    pub hash: String,
}

impl PasswordHash {
    /// Hash a password under a fresh random salt
    pub fn new(password: &str) -> Self {
        let salt_bytes: [u8; 16] = rand::rng().random();
        let salt = hex::encode(salt_bytes);
        let hash = Self::digest(password, &salt);
        Self { salt, hash }
    }

    fn digest(password: &str, salt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Check a password against this hash
    pub fn verify(&self, password: &str) -> bool {
        Self::digest(password, &self.salt) == self.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation() {
        let token1 = generate_token();
        let token2 = generate_token();

        assert_eq!(token1.len(), 64);
        assert_ne!(token1, token2);
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hashed = PasswordHash::new("mysecret");

        assert_eq!(hashed.salt.len(), 32);
        assert!(hashed.verify("mysecret"));
        assert!(!hashed.verify("wrongpassword"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = PasswordHash::new("secret123");
        let b = PasswordHash::new("secret123");

        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_username_validation() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("Bob_42"));
        assert!(!is_valid_username("al"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username(&"x".repeat(33)));
    }
}
