//! Out-of-band credential recovery tokens.
//!
//! Reset tokens are signed with a per-user secret: the global signing key
//! concatenated with the tutor's id. A token minted for one account never
//! verifies against another, even when both accounts chose the same
//! password. The tutor's reset generation is part of the signed claims and
//! the store bumps it when a reset lands, which retires every token minted
//! before it.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::models::Tutor;

#[derive(Debug, Error)]
pub enum ResetTokenError {
    #[error("Token encoding failed: {0}")]
    Encode(jsonwebtoken::errors::Error),
    #[error("Invalid reset token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("reset token does not match the stored account state")]
    Mismatch,
}

/// Claims carried by a reset token
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub email: String,
    pub exp: i64,
    pub generation: u64,
}

fn per_user_key(signing_key: &str, tutor_id: &str) -> String {
    format!("{signing_key}{tutor_id}")
}

/// Sign a reset token for the tutor, valid for `ttl_minutes`.
pub fn issue(signing_key: &str, tutor: &Tutor, ttl_minutes: i64) -> Result<String, ResetTokenError> {
    let secret = per_user_key(signing_key, &tutor.id);
    let claims = ResetClaims {
        email: tutor.email.clone(),
        exp: (Utc::now() + Duration::minutes(ttl_minutes)).timestamp(),
        generation: tutor.reset_generation,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(ResetTokenError::Encode)
}

/// Verify a reset token against the tutor it claims to belong to.
///
/// Checks signature and expiry under the recomputed per-user secret, then
/// that the email and reset generation still match the stored record.
pub fn verify(
    signing_key: &str,
    tutor: &Tutor,
    token: &str,
) -> Result<ResetClaims, ResetTokenError> {
    let secret = per_user_key(signing_key, &tutor.id);
    let data = decode::<ResetClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(ResetTokenError::Invalid)?;

    if data.claims.email != tutor.email || data.claims.generation != tutor.reset_generation {
        return Err(ResetTokenError::Mismatch);
    }
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::make_tutor;

    const KEY: &str = "test-signing-key";

    #[test]
    fn test_issue_and_verify() {
        let tutor = make_tutor("t1", "ada@example.edu");
        let token = issue(KEY, &tutor, 20).unwrap();

        let claims = verify(KEY, &tutor, &token).unwrap();
        assert_eq!(claims.email, "ada@example.edu");
        assert_eq!(claims.generation, 0);
    }

    #[test]
    fn test_token_is_scoped_to_one_tutor() {
        let ada = make_tutor("t1", "ada@example.edu");
        let grace = make_tutor("t2", "grace@example.edu");

        let token = issue(KEY, &ada, 20).unwrap();
        assert!(verify(KEY, &grace, &token).is_err());
    }

    #[test]
    fn test_stale_generation_is_rejected() {
        let mut tutor = make_tutor("t1", "ada@example.edu");
        let token = issue(KEY, &tutor, 20).unwrap();

        // A reset landed in the meantime
        tutor.reset_generation += 1;
        assert!(matches!(
            verify(KEY, &tutor, &token),
            Err(ResetTokenError::Mismatch)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tutor = make_tutor("t1", "ada@example.edu");
        let token = issue(KEY, &tutor, -5).unwrap();
        assert!(matches!(
            verify(KEY, &tutor, &token),
            Err(ResetTokenError::Invalid(_))
        ));
    }
}
