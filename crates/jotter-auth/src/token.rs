//! Signed access/refresh token issuing and validation.
//!
//! Tokens are HS256 JWTs carrying the user identity as claims.  Validation is
//! stateless: claims are trusted as of issuance and no store lookup happens,
//! which trades revocability for zero-I/O request authentication.  A deleted
//! user's still-unexpired token therefore remains technically valid.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, Result};

/// Default access-token lifetime: 5 minutes.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 5 * 60;

/// Default refresh-token lifetime: 1 day.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 24 * 60 * 60;

/// Distinguishes access tokens from refresh tokens.  A token of one type is
/// never accepted where the other is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user's id.
    pub user_id: Uuid,
    /// Username at issuance time.
    pub username: String,
    /// Email at issuance time, if any.
    pub email: Option<String>,
    /// `access` or `refresh`.
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,
    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

/// The identity resolved from a validated access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
}

/// An access/refresh token pair returned by login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Token service configuration: the shared signing secret and lifetimes.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC signing secret shared by all server instances.
    pub secret: String,
    /// Access-token lifetime in seconds.
    pub access_ttl_secs: i64,
    /// Refresh-token lifetime in seconds.
    pub refresh_ttl_secs: i64,
}

impl TokenConfig {
    /// Config with the given secret and default lifetimes.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
        }
    }
}

/// Issues and validates signed tokens.  Cheap to share behind an `Arc`.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is a hard boundary for these short-lived tokens.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
        }
    }

    /// Mint an access/refresh pair for an authenticated user.
    ///
    /// Credential checking happens before this call; the service itself only
    /// signs whatever identity it is given.
    pub fn issue_pair(
        &self,
        user_id: Uuid,
        username: &str,
        email: Option<&str>,
    ) -> Result<TokenPair> {
        let access = self.mint(user_id, username, email, TokenType::Access)?;
        let refresh = self.mint(user_id, username, email, TokenType::Refresh)?;
        Ok(TokenPair { access, refresh })
    }

    /// Exchange a refresh token for a fresh access token.
    ///
    /// The new token carries the same user claims with a new iat/exp.
    pub fn refresh(&self, refresh_token: &str) -> Result<String> {
        let claims = self.decode_expecting(refresh_token, TokenType::Refresh)?;
        self.mint(
            claims.user_id,
            &claims.username,
            claims.email.as_deref(),
            TokenType::Access,
        )
    }

    /// Validate an access token and return the identity it carries.
    pub fn validate(&self, access_token: &str) -> Result<UserIdentity> {
        let claims = self.decode_expecting(access_token, TokenType::Access)?;
        Ok(UserIdentity {
            id: claims.user_id,
            username: claims.username,
            email: claims.email,
        })
    }

    fn mint(
        &self,
        user_id: Uuid,
        username: &str,
        email: Option<&str>,
        token_type: TokenType,
    ) -> Result<String> {
        let now = Utc::now().timestamp();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl_secs,
            TokenType::Refresh => self.refresh_ttl_secs,
        };

        let claims = Claims {
            user_id,
            username: username.to_string(),
            email: email.map(|e| e.to_string()),
            token_type,
            iat: now,
            exp: now + ttl,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!(error = %e, "failed to sign token");
            AuthError::InvalidToken
        })
    }

    fn decode_expecting(&self, token: &str, expected: TokenType) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AuthError::InvalidToken
        })?;

        if data.claims.token_type != expected {
            tracing::debug!(
                got = %data.claims.token_type,
                expected = %expected,
                "token type mismatch"
            );
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(TokenConfig::new("test-secret"))
    }

    #[test]
    fn issued_access_token_round_trips_identity() {
        let svc = service();
        let user_id = Uuid::new_v4();

        let pair = svc
            .issue_pair(user_id, "alice", Some("alice@example.com"))
            .unwrap();
        let identity = svc.validate(&pair.access).unwrap();

        assert_eq!(identity.id, user_id);
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let svc = service();
        let pair = svc.issue_pair(Uuid::new_v4(), "alice", None).unwrap();

        assert!(matches!(
            svc.validate(&pair.refresh),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn access_token_cannot_be_refreshed() {
        let svc = service();
        let pair = svc.issue_pair(Uuid::new_v4(), "alice", None).unwrap();

        assert!(matches!(
            svc.refresh(&pair.access),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn refresh_yields_valid_access_token() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let pair = svc.issue_pair(user_id, "alice", None).unwrap();

        let access = svc.refresh(&pair.refresh).unwrap();
        let identity = svc.validate(&access).unwrap();
        assert_eq!(identity.id, user_id);
        assert_eq!(identity.username, "alice");
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let now = Utc::now().timestamp();

        let claims = Claims {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: None,
            token_type: TokenType::Access,
            iat: now - 600,
            exp: now - 300,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(svc.validate(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let svc = service();
        let other = TokenService::new(TokenConfig::new("other-secret"));
        let pair = other.issue_pair(Uuid::new_v4(), "mallory", None).unwrap();

        assert!(matches!(
            svc.validate(&pair.access),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let svc = service();
        assert!(matches!(
            svc.validate("not-a-jwt"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn claims_use_wire_field_names() {
        use base64::Engine;

        let svc = service();
        let pair = svc.issue_pair(Uuid::new_v4(), "alice", None).unwrap();

        // Decode the payload segment directly to inspect the wire names.
        let payload = pair.access.split('.').nth(1).unwrap();
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload)
            .unwrap();
        let json = String::from_utf8(bytes).unwrap();

        assert!(json.contains("\"type\":\"access\""));
        assert!(json.contains("\"user_id\""));
        assert!(json.contains("\"iat\""));
        assert!(json.contains("\"exp\""));
    }
}
