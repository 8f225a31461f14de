//! Deterministic budget identifiers
//!
//! A budget identifier is derived from the owner's passphrase and share
//! code. Identical inputs yield the identical identifier on any device;
//! this is the join key that lets shared-budget members find the same
//! budget without a server round-trip. One-way; no inverse exists.

use sha2::{Digest, Sha256};

use crate::error::{VaultError, VaultResult};
use crate::share;

/// Prefix carried by every budget identifier
pub const BUDGET_ID_PREFIX: &str = "budget_";

/// Number of hex characters after the prefix
const BUDGET_ID_HEX_LEN: usize = 16;

/// Fixed context string mixed into the identifier seed
const BUDGET_ID_CONTEXT: &str = "envelope-vault";

/// Derive the stable budget identifier for a passphrase + share code pair
///
/// Requires a syntactically valid share code (`InvalidShareCode` otherwise)
/// and a non-empty passphrase. The result is `budget_` followed by 16 hex
/// characters: 23 characters total.
pub fn generate_budget_id(passphrase: &str, share_code: &str) -> VaultResult<String> {
    if passphrase.is_empty() {
        return Err(VaultError::InvalidPassphraseFormat(
            "Passphrase must not be empty".to_string(),
        ));
    }

    let normalized = share::validate(share_code)?;

    let seed = format!(
        "budget_seed_{}_{}_{}",
        passphrase, normalized, BUDGET_ID_CONTEXT
    );
    let digest = Sha256::digest(seed.as_bytes());

    let hex: String = digest
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
        .chars()
        .take(BUDGET_ID_HEX_LEN)
        .collect();

    Ok(format!("{}{}", BUDGET_ID_PREFIX, hex))
}

/// Shorten a budget id for log output (first 8 characters plus ellipsis)
///
/// Identifiers are not secret, but full ids in logs make cross-referencing
/// user reports noisier than it needs to be.
pub fn preview(budget_id: &str) -> String {
    if budget_id.len() <= 8 {
        budget_id.to_string()
    } else {
        format!("{}...", &budget_id[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODE: &str = "maple harbor cedar lantern";

    #[test]
    fn test_budget_id_shape() {
        let id = generate_budget_id("correct-horse", CODE).unwrap();
        assert_eq!(id.len(), 23);
        assert!(id.starts_with(BUDGET_ID_PREFIX));
        assert!(id[BUDGET_ID_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_budget_id_is_deterministic() {
        let id1 = generate_budget_id("correct-horse", CODE).unwrap();
        let id2 = generate_budget_id("correct-horse", CODE).unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_budget_id_normalizes_share_code() {
        let id1 = generate_budget_id("correct-horse", CODE).unwrap();
        let id2 = generate_budget_id("correct-horse", "  MAPLE Harbor  cedar LANTERN ").unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_different_inputs_different_ids() {
        let base = generate_budget_id("correct-horse", CODE).unwrap();
        let other_pass = generate_budget_id("wrong-horse", CODE).unwrap();
        let other_code = generate_budget_id("correct-horse", "pine harbor cedar lantern").unwrap();
        assert_ne!(base, other_pass);
        assert_ne!(base, other_code);
    }

    #[test]
    fn test_invalid_share_code_rejected() {
        assert!(matches!(
            generate_budget_id("correct-horse", "only three words"),
            Err(VaultError::InvalidShareCode(_))
        ));
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        assert!(matches!(
            generate_budget_id("", CODE),
            Err(VaultError::InvalidPassphraseFormat(_))
        ));
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("budget_0123456789abcdef"), "budget_0...");
        assert_eq!(preview("short"), "short");
    }
}
