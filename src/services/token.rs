use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Claims carried inside a signed token. `sub` is the user ID.
/// `is_admin` is informational only; authorization always re-reads the
/// stored user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HMAC-SHA256 signed tokens with embedded expiry.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    admin_ttl_seconds: i64,
    session_ttl_seconds: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            admin_ttl_seconds: config.admin_session_hours * 3600,
            session_ttl_seconds: config.user_session_days * 86400,
        }
    }

    /// Short-lived token for the admin dashboard (returned in the
    /// response body, not a cookie).
    pub fn issue_admin(&self, user_id: i32) -> Result<String, TokenError> {
        self.issue_with_ttl(user_id, true, self.admin_ttl_seconds)
    }

    /// Long-lived session token delivered as an httpOnly cookie.
    pub fn issue_session(&self, user_id: i32, is_admin: bool) -> Result<String, TokenError> {
        self.issue_with_ttl(user_id, is_admin, self.session_ttl_seconds)
    }

    pub fn issue_with_ttl(
        &self,
        user_id: i32,
        is_admin: bool,
        ttl_seconds: i64,
    ) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            is_admin,
            iat: now,
            exp: now + ttl_seconds,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims on success.
    /// An expired-but-otherwise-valid token is reported distinctly so
    /// callers can log it, though both cases deny access.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            ..AuthConfig::default()
        })
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let svc = service();
        let token = svc.issue_session(42, false).unwrap();

        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert!(!claims.is_admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_admin_token_carries_admin_claim() {
        let svc = service();
        let token = svc.issue_admin(1).unwrap();

        let claims = svc.verify(&token).unwrap();
        assert!(claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let svc = service();
        let token = svc.issue_with_ttl(7, false, -120).unwrap();

        assert!(matches!(svc.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let svc = service();
        let token = svc.issue_session(7, false).unwrap();

        // Corrupt the signature segment
        let mut tampered = token[..token.len() - 4].to_string();
        tampered.push_str("AAAA");

        assert!(matches!(svc.verify(&tampered), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let svc = service();
        let other = TokenService::new(&AuthConfig {
            jwt_secret: "different-secret".to_string(),
            ..AuthConfig::default()
        });

        let token = other.issue_session(7, false).unwrap();
        assert!(matches!(svc.verify(&token), Err(TokenError::Invalid)));
    }
}
