pub mod cookie;
pub mod password;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by the session cookie. The token only references the
/// server-side session record; revocation happens by deleting that record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sid: Uuid,
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    pub fn new(session_id: Uuid, user_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        Self {
            sid: session_id,
            sub: user_id,
            exp: expires_at.timestamp(),
            iat: Utc::now().timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionTokenError {
    #[error("session token generation error: {0}")]
    Signing(String),
    #[error("session secret not configured")]
    InvalidSecret,
    #[error("invalid session token: {0}")]
    Invalid(String),
}

pub fn sign_session(claims: &SessionClaims, secret: &str) -> Result<String, SessionTokenError> {
    if secret.is_empty() {
        return Err(SessionTokenError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| SessionTokenError::Signing(e.to_string()))
}

/// Check signature and expiry and return the claims
pub fn verify_session(token: &str, secret: &str) -> Result<SessionClaims, SessionTokenError> {
    if secret.is_empty() {
        return Err(SessionTokenError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<SessionClaims>(token, &decoding_key, &validation)
        .map_err(|e| SessionTokenError::Invalid(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn in_hours(hours: i64) -> DateTime<Utc> {
        Utc::now() + Duration::hours(hours)
    }

    #[test]
    fn signs_and_verifies() {
        let claims = SessionClaims::new(Uuid::new_v4(), Uuid::new_v4(), in_hours(24));
        let token = sign_session(&claims, "s3cret").unwrap();
        assert_eq!(verify_session(&token, "s3cret").unwrap(), claims);
    }

    #[test]
    fn rejects_wrong_secret_and_garbage() {
        let claims = SessionClaims::new(Uuid::new_v4(), Uuid::new_v4(), in_hours(24));
        let token = sign_session(&claims, "s3cret").unwrap();
        assert!(matches!(
            verify_session(&token, "other"),
            Err(SessionTokenError::Invalid(_))
        ));
        assert!(verify_session("not-a-token", "s3cret").is_err());
        assert!(matches!(
            sign_session(&claims, ""),
            Err(SessionTokenError::InvalidSecret)
        ));
    }

    #[test]
    fn rejects_expired_tokens() {
        let mut claims = SessionClaims::new(Uuid::new_v4(), Uuid::new_v4(), in_hours(1));
        claims.exp = Utc::now().timestamp() - 3600;
        let token = sign_session(&claims, "s3cret").unwrap();
        assert!(verify_session(&token, "s3cret").is_err());
    }
}
