//! One-way credential digest used for storage comparison.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the credential (64 characters)
pub fn digest(credential: &str) -> String {
    format!("{:x}", Sha256::digest(credential.as_bytes()))
}
