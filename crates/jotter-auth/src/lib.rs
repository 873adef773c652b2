//! # jotter-auth
//!
//! The authentication boundary of the jotter backend: password hashing with
//! a pluggable strength policy, and issuing/validating signed access and
//! refresh tokens.
//!
//! Everything in this crate is pure computation (no I/O); bcrypt work is
//! offloaded to the tokio blocking pool so it never stalls the async runtime.

pub mod password;
pub mod token;

mod error;

pub use error::AuthError;
pub use password::PasswordPolicy;
pub use token::{Claims, TokenConfig, TokenPair, TokenService, TokenType, UserIdentity};
