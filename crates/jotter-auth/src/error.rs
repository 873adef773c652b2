use thiserror::Error;

/// Errors produced by the authentication layer.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Login failed.  Deliberately generic: the message never reveals
    /// whether the username or the password was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token rejected: bad signature, expired, or wrong token type.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Password rejected by the strength policy.
    #[error("{0}")]
    WeakPassword(String),

    /// bcrypt failure (malformed stored hash, blocking-pool join error).
    #[error("Hashing error: {0}")]
    Hashing(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AuthError>;
