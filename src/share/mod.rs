//! Share codes for joining a shared budget
//!
//! A share code is four words separated by spaces: human-typeable, so
//! normalization is typo-tolerant about case and spacing. The normalized
//! code deterministically defines the salt space every member of a shared
//! budget derives keys in, which is why format validation happens before
//! any cryptographic use.

pub mod wordlist;

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;

use crate::crypto;
use crate::error::{VaultError, VaultResult};

/// Number of words in a share code
pub const WORD_COUNT: usize = 4;

/// Normalize a raw share code: trim, lowercase, collapse internal whitespace
pub fn normalize(code: &str) -> String {
    code.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check whether a share code has the expected format
///
/// Valid after normalization: exactly four words, each purely alphabetic.
/// Word-list membership is deliberately not required.
pub fn is_valid(code: &str) -> bool {
    let normalized = normalize(code);
    let words: Vec<&str> = normalized.split(' ').collect();

    words.len() == WORD_COUNT
        && words
            .iter()
            .all(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_lowercase()))
}

/// Validate and normalize a share code in one step
pub fn validate(code: &str) -> VaultResult<String> {
    if code.trim().is_empty() {
        return Err(VaultError::InvalidShareCode(
            "Share code is empty".to_string(),
        ));
    }
    if !is_valid(code) {
        return Err(VaultError::InvalidShareCode(format!(
            "Expected {} words",
            WORD_COUNT
        )));
    }
    Ok(normalize(code))
}

/// Generate a new random share code from the embedded word list
pub fn generate() -> String {
    let mut words = Vec::with_capacity(WORD_COUNT);
    for _ in 0..WORD_COUNT {
        let index = (OsRng.next_u32() as usize) % wordlist::WORDS.len();
        words.push(wordlist::WORDS[index]);
    }
    words.join(" ")
}

/// Derive the 32-byte salt for a share code
///
/// Validates the format first; every member of a shared budget derives the
/// identical salt from the identical code.
pub fn derive_salt(code: &str) -> VaultResult<Vec<u8>> {
    let normalized = validate(code)?;
    Ok(crypto::share_code_salt(&normalized))
}
