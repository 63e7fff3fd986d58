//! Handshake challenge generation (PKCE S256 plus anti-forgery state)
//!
//! Every handshake attempt gets a fresh [`Challenge`]. The `state` is echoed
//! back by the authorize page and compared; the `verifier` stays local until
//! the token exchange; the `digest` travels with the authorize request so
//! the token endpoint can check possession of the verifier later.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use sha2::{Digest, Sha256};

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Largest multiple of the alphabet size that fits in a byte. Bytes at or
/// above it are rejected so every character is equally likely.
const ACCEPT_BELOW: u8 = (256 / ALPHABET.len() * ALPHABET.len()) as u8;

pub const STATE_LEN: usize = 32;
pub const VERIFIER_LEN: usize = 64;

/// Single-use handshake parameters.
pub struct Challenge {
    pub state: String,
    pub verifier: String,
    pub digest: String,
}

impl Challenge {
    pub fn generate() -> Self {
        let state = random_string(STATE_LEN);
        let verifier = random_string(VERIFIER_LEN);
        let digest = compute_challenge(&verifier);
        Self {
            state,
            verifier,
            digest,
        }
    }
}

impl std::fmt::Debug for Challenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Challenge")
            .field("state", &self.state)
            .field("verifier", &"[REDACTED]")
            .field("digest", &self.digest)
            .finish()
    }
}

/// Alphanumeric string drawn from the thread-local CSPRNG.
pub fn random_string(len: usize) -> String {
    let mut rng = rand::rng();
    let mut out = String::with_capacity(len);
    let mut buf = [0u8; 64];

    while out.len() < len {
        rng.fill(&mut buf);
        for &byte in buf.iter().filter(|&&b| b < ACCEPT_BELOW) {
            out.push(ALPHABET[byte as usize % ALPHABET.len()] as char);
            if out.len() == len {
                break;
            }
        }
    }
    out
}

/// `BASE64URL-NOPAD(SHA256(verifier))`
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn lengths_match_handshake_requirements() {
        let challenge = Challenge::generate();
        assert_eq!(challenge.state.len(), STATE_LEN);
        assert_eq!(challenge.verifier.len(), VERIFIER_LEN);
        // SHA-256 → 32 bytes → 43 base64url chars without padding
        assert_eq!(challenge.digest.len(), 43);
    }

    #[test]
    fn random_strings_are_alphanumeric() {
        let s = random_string(500);
        assert_eq!(s.len(), 500);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()), "got: {s}");
    }

    #[test]
    fn digest_matches_verifier() {
        for _ in 0..50 {
            let challenge = Challenge::generate();
            assert_eq!(challenge.digest, compute_challenge(&challenge.verifier));
            let decoded = URL_SAFE_NO_PAD.decode(&challenge.digest).unwrap();
            assert_eq!(decoded.as_slice(), Sha256::digest(challenge.verifier.as_bytes()).as_slice());
        }
    }

    #[test]
    fn challenge_matches_known_value() {
        // SHA256("hello") = 2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824
        assert_eq!(
            compute_challenge("hello"),
            "LPJNul-wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ"
        );
    }

    #[test]
    fn states_do_not_repeat() {
        let states: HashSet<String> = (0..1000).map(|_| Challenge::generate().state).collect();
        assert_eq!(states.len(), 1000);
    }

    #[test]
    fn debug_hides_verifier() {
        let challenge = Challenge::generate();
        let debug = format!("{challenge:?}");
        assert!(!debug.contains(&challenge.verifier));
        assert!(debug.contains(&challenge.state));
    }
}
