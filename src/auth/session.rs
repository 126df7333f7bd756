//! Stateless session tokens.
//!
//! A session is an HS256-signed claim set over the tutor's email. There is
//! no server-side session record and no revocation list: logout is a
//! client-side token discard, and a leaked token stays valid until its
//! expiry. A password reset does not invalidate outstanding sessions.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionTokenError {
    #[error("Token encoding failed: {0}")]
    Encode(jsonwebtoken::errors::Error),
    #[error("Invalid session token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

/// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub email: String,
    pub exp: i64,
}

/// Issues and verifies session tokens under a single shared key.
#[derive(Clone)]
pub struct SessionSigner {
    decoding: DecodingKey,
    encoding: EncodingKey,
    ttl: Duration,
}

impl SessionSigner {
    pub fn new(signing_key: &str, ttl_days: i64) -> Self {
        Self {
            decoding: DecodingKey::from_secret(signing_key.as_bytes()),
            encoding: EncodingKey::from_secret(signing_key.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    /// Sign a session token for the given tutor email.
    pub fn issue(&self, email: &str) -> Result<String, SessionTokenError> {
        let claims = SessionClaims {
            email: email.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(SessionTokenError::Encode)
    }

    /// Verify a bearer token and return the email it was issued for.
    ///
    /// Signature and expiry failures are indistinguishable to the caller.
    pub fn verify(&self, token: &str) -> Result<String, SessionTokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::default())
            .map_err(SessionTokenError::Invalid)?;
        Ok(data.claims.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let signer = SessionSigner::new("test-signing-key", 30);
        let token = signer.issue("ada@example.edu").unwrap();
        assert_eq!(signer.verify(&token).unwrap(), "ada@example.edu");
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let signer = SessionSigner::new("test-signing-key", 30);
        let other = SessionSigner::new("different-key", 30);
        let token = signer.issue("ada@example.edu").unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let signer = SessionSigner::new("test-signing-key", 30);
        let mut token = signer.issue("ada@example.edu").unwrap();
        token.push('x');
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Expiry a day in the past, well beyond the default leeway
        let signer = SessionSigner::new("test-signing-key", -1);
        let token = signer.issue("ada@example.edu").unwrap();
        assert!(signer.verify(&token).is_err());
    }
}
