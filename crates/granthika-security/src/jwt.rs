//! Session tokens (JWT)

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const TOKEN_TYPE_SESSION: &str = "session";

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: String,
    #[serde(default)]
    pub remember: bool,
}

impl Claims {
    pub fn identity_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|e| JwtError::ValidationError(e.to_string()))
    }
}

pub struct JwtService {
    secret: String,
    session_expiry: i64,
    remember_me_expiry: i64,
}

impl JwtService {
    pub fn new(secret: String, session_expiry: i64, remember_me_expiry: i64) -> Self {
        Self {
            secret,
            session_expiry,
            remember_me_expiry,
        }
    }

    /// Lifetime in seconds of a token issued with the given remember-me choice.
    pub fn expiry_for(&self, remember: bool) -> i64 {
        if remember {
            self.remember_me_expiry
        } else {
            self.session_expiry
        }
    }

    pub fn generate_session_token(&self, identity_id: &Uuid, remember: bool) -> Result<String, JwtError> {
        self.generate_token(identity_id, remember, self.expiry_for(remember))
    }

    fn generate_token(&self, identity_id: &Uuid, remember: bool, expiry: i64) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry)).timestamp(),
            token_type: TOKEN_TYPE_SESSION.to_string(),
            remember,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::ValidationError(e.to_string()),
        })?;

        if claims.token_type != TOKEN_TYPE_SESSION {
            return Err(JwtError::ValidationError(format!(
                "unexpected token type: {}",
                claims.token_type
            )));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret-with-enough-entropy".to_string(), 3600, 604_800)
    }

    #[test]
    fn test_session_token_round_trip() {
        let jwt = service();
        let id = Uuid::new_v4();
        let token = jwt.generate_session_token(&id, true).unwrap();
        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.identity_id().unwrap(), id);
        assert!(claims.remember);
        assert_eq!(claims.exp - claims.iat, 604_800);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = service();
        let token = jwt.generate_token(&Uuid::new_v4(), false, -3600).unwrap();
        assert!(matches!(jwt.validate_token(&token), Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let token = service().generate_session_token(&Uuid::new_v4(), false).unwrap();
        let other = JwtService::new("another-secret".to_string(), 3600, 3600);
        assert!(matches!(other.validate_token(&token), Err(JwtError::ValidationError(_))));
    }
}
