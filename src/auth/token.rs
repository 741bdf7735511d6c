use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::revocation_repository::RevocationRepository;
use crate::error::AppError;

const ACCESS_TOKEN_TTL_HOURS: i64 = 1;
const REFRESH_TOKEN_TTL_HOURS: i64 = 1440;

/// The two disjoint kinds of bearer token. The kind travels in the `iss` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived, authorizes individual requests.
    Access,
    /// Long-lived, only good for minting new access tokens.
    Refresh,
}

impl TokenKind {
    pub fn issuer(self) -> &'static str {
        match self {
            TokenKind::Access => "chirpy-access",
            TokenKind::Refresh => "chirpy-refresh",
        }
    }

    pub fn lifetime(self) -> Duration {
        match self {
            TokenKind::Access => Duration::hours(ACCESS_TOKEN_TTL_HOURS),
            TokenKind::Refresh => Duration::hours(REFRESH_TOKEN_TTL_HOURS),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Token verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Unparseable, bad signature, or a subject that is not an account id.
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid issuer: expected a {expected} token")]
    WrongKind { expected: TokenKind },

    #[error("Token expired")]
    Expired,

    #[error("Token revoked")]
    Revoked,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Registered claims carried by every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    /// Kind discriminator, see [`TokenKind::issuer`].
    iss: String,
    /// Account id, stringified.
    sub: String,
    /// Issued at (Unix seconds).
    iat: i64,
    /// Expiry (Unix seconds).
    exp: i64,
}

/// Mints and verifies HS256 bearer tokens with one process-wide secret.
///
/// Revocation is a separate concern: [`TokenAuthority::verify`] never looks at
/// the revocation list, while [`TokenAuthority::refresh`] and
/// [`TokenAuthority::revoke`] go through it.
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    revocations: Arc<dyn RevocationRepository>,
}

impl TokenAuthority {
    pub fn new(secret: &str, revocations: Arc<dyn RevocationRepository>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            revocations,
        }
    }

    /// Issue a token of `kind` for `account_id`, valid from now.
    pub fn issue(&self, account_id: i64, kind: TokenKind) -> Result<String, TokenError> {
        self.issue_at(account_id, kind, Utc::now())
    }

    /// Issue a token as if it had been minted at `issued_at`.
    pub fn issue_at(
        &self,
        account_id: i64,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            iss: kind.issuer().to_string(),
            sub: account_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + kind.lifetime()).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature, kind and expiry, in that order, and return the account id.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<i64, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below so that a wrong-kind token is reported as such.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?
            .claims;

        if claims.iss != expected.issuer() {
            return Err(TokenError::WrongKind { expected });
        }

        if claims.exp < Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Malformed(format!("invalid subject '{}'", claims.sub)))
    }

    /// Exchange a valid, unrevoked refresh token for a fresh access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let account_id = self.verify(refresh_token, TokenKind::Refresh)?;

        if self.revocations.is_revoked(refresh_token).await? {
            return Err(TokenError::Revoked.into());
        }

        Ok(self.issue(account_id, TokenKind::Access)?)
    }

    /// Revoke a refresh token. Anything that does not verify as a refresh
    /// token is rejected without touching the revocation list.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        let account_id = self.verify(refresh_token, TokenKind::Refresh)?;
        self.revocations.record_revocation(refresh_token).await?;

        tracing::info!(account_id, "refresh token revoked");
        Ok(())
    }
}
