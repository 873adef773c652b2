//! Password hashing and strength policy.
//!
//! Hashes are bcrypt strings with the salt embedded, so `verify_password`
//! needs no separate salt storage.  bcrypt's verify re-derives the digest and
//! compares it in constant time, so a mismatch position leaks nothing.

use crate::error::{AuthError, Result};

/// bcrypt cost factor.  12 is the crate default and a reasonable 2024-era
/// work factor.
pub const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Passwords rejected outright regardless of length.
const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "passw0rd", "123456", "12345678", "123456789",
    "qwerty", "qwerty123", "abc123", "letmein", "iloveyou", "admin",
    "welcome", "monkey", "dragon", "sunshine", "princess", "football",
];

/// Hash a password with bcrypt.
///
/// Runs on the blocking thread pool: bcrypt at cost 12 takes on the order of
/// 100 ms, far too long to hold an executor thread.
pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        bcrypt::hash(password, BCRYPT_COST).map_err(|e| AuthError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::Hashing(format!("blocking task failed: {e}")))?
}

/// Verify a password against a stored bcrypt hash.
///
/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is
/// malformed or the blocking task fails.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || {
        bcrypt::verify(password, &hash).map_err(|e| AuthError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::Hashing(format!("blocking task failed: {e}")))?
}

/// Pluggable password strength policy.
///
/// The default rejects trivially short passwords, entirely numeric passwords,
/// and anything on the embedded common-passwords list.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    /// Minimum password length in characters.
    pub min_length: usize,
    /// Reject passwords consisting only of digits.
    pub reject_numeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            reject_numeric: true,
        }
    }
}

impl PasswordPolicy {
    /// Check a candidate password against the policy.
    pub fn check(&self, password: &str) -> Result<()> {
        if password.chars().count() < self.min_length {
            return Err(AuthError::WeakPassword(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if self.reject_numeric && password.chars().all(|c| c.is_ascii_digit()) {
            return Err(AuthError::WeakPassword(
                "Password cannot be entirely numeric".to_string(),
            ));
        }

        let lowered = password.to_lowercase();
        if COMMON_PASSWORDS.contains(&lowered.as_str()) {
            return Err(AuthError::WeakPassword(
                "Password is too common".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify_round_trip() {
        let hash = hash_password("Secr3t!").await.unwrap();

        // Stored value is never the plaintext.
        assert_ne!(hash, "Secr3t!");
        assert!(hash.starts_with("$2"));

        assert!(verify_password("Secr3t!", &hash).await.unwrap());
        assert!(!verify_password("wrong-password", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn same_password_hashes_differently() {
        // Fresh random salt per hash.
        let a = hash_password("Secr3t!").await.unwrap();
        let b = hash_password("Secr3t!").await.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn policy_rejects_short() {
        let policy = PasswordPolicy::default();
        assert!(matches!(
            policy.check("abc"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn policy_rejects_numeric_and_common() {
        let policy = PasswordPolicy::default();
        assert!(policy.check("12345678").is_err());
        assert!(policy.check("QWERTY123").is_err());
    }

    #[test]
    fn policy_accepts_reasonable_password() {
        let policy = PasswordPolicy::default();
        assert!(policy.check("Secr3t!").is_ok());
    }

    #[test]
    fn policy_min_length_is_tunable() {
        let policy = PasswordPolicy {
            min_length: 12,
            ..Default::default()
        };
        assert!(policy.check("Secr3t!").is_err());
        assert!(policy.check("Secr3t!Secr3t!").is_ok());
    }
}
