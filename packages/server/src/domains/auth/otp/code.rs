//! Code generation and keyed hashing.
//!
//! Only the digest is ever stored. The digest binds the code to the phone
//! number and a server secret, so a leaked table cannot be replayed against
//! another phone or brute-forced offline without the secret.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Random numeric code, zero-padded to `length` digits
pub fn generate_code(length: u32) -> String {
    let upper = 10u64.pow(length);
    let value = rand::thread_rng().gen_range(0..upper);
    format!("{:0width$}", value, width = length as usize)
}

/// Keyed SHA-256 digest used at issue and verify time
#[derive(Clone)]
pub struct OtpHasher {
    secret: Vec<u8>,
}

impl std::fmt::Debug for OtpHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpHasher").field("secret", &"<redacted>").finish()
    }
}

impl OtpHasher {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    /// Hex digest of `secret:phone:code`
    pub fn hash(&self, phone: &str, code: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(b":");
        hasher.update(phone.as_bytes());
        hasher.update(b":");
        hasher.update(code.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Compare a submitted code against a stored digest in constant time
    pub fn matches(&self, phone: &str, code: &str, stored_hash: &str) -> bool {
        let candidate = self.hash(phone, code);
        constant_time_eq(candidate.as_bytes(), stored_hash.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
