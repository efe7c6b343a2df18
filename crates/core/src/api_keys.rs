//! API key hashing.
//!
//! Employees authenticate with a long random key. Only its SHA-256 digest is
//! stored; every lookup hashes the presented key first.

use sha2::{Digest, Sha256};

/// Header carrying the employee's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Compute the lowercase SHA-256 hex digest of an API key.
pub fn hash_api_key(key: &str) -> String {
    let digest = Sha256::digest(key.trim().as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
