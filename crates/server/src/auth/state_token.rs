//! Anti-forgery state tokens for the login flow.
//!
//! A token is issued when the login page is rendered, echoed back by the
//! provider redirect, and compared exactly once. Validation failure aborts
//! the flow before any provider or identity-store call is made.

use crate::error::AuthFlowError;

/// Length of an issued state token.
pub const STATE_TOKEN_LEN: usize = 32;

const STATE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a fresh state token: `STATE_TOKEN_LEN` characters drawn
/// uniformly from uppercase letters and digits.
///
/// Bytes from the OS are rejection-sampled so every alphabet character is
/// equally likely.
pub fn issue() -> String {
    // Largest multiple of the alphabet size that fits in a byte; values at
    // or above it would bias the draw and are discarded.
    const LIMIT: u8 = (u8::MAX / 36) * 36;

    let mut token = String::with_capacity(STATE_TOKEN_LEN);
    let mut buf = [0u8; 64];
    while token.len() < STATE_TOKEN_LEN {
        getrandom::fill(&mut buf).expect("Failed to generate random bytes");
        for &b in &buf {
            if b < LIMIT {
                token.push(STATE_ALPHABET[(b % 36) as usize] as char);
                if token.len() == STATE_TOKEN_LEN {
                    break;
                }
            }
        }
    }
    token
}

/// Compare the token issued for this session with the one echoed back by
/// the provider redirect.
///
/// Succeeds only on exact equality; a session that never issued a token
/// rejects everything. The caller clears the stored token on success, which
/// makes it single-use.
pub fn validate(issued: Option<&str>, received: &str) -> Result<(), AuthFlowError> {
    match issued {
        Some(expected) if expected == received => Ok(()),
        _ => Err(AuthFlowError::InvalidState),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_have_expected_shape() {
        let token = issue();
        assert_eq!(token.len(), STATE_TOKEN_LEN);
        assert!(
            token
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        );
    }

    #[test]
    fn issued_tokens_differ() {
        // Collisions on 36^32 values would indicate a broken generator.
        assert_ne!(issue(), issue());
    }

    #[test]
    fn validate_accepts_exact_match() {
        assert!(validate(Some("ABC123"), "ABC123").is_ok());
    }

    #[test]
    fn validate_rejects_mismatch() {
        assert!(matches!(
            validate(Some("ABC123"), "abc123"),
            Err(AuthFlowError::InvalidState)
        ));
        assert!(matches!(
            validate(Some("ABC123"), "WRONG"),
            Err(AuthFlowError::InvalidState)
        ));
    }

    #[test]
    fn validate_rejects_when_no_token_issued() {
        assert!(matches!(
            validate(None, "ANYTHING"),
            Err(AuthFlowError::InvalidState)
        ));
        assert!(matches!(validate(None, ""), Err(AuthFlowError::InvalidState)));
    }
}
