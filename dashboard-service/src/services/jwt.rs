//! JWT session tokens.
//!
//! Access tokens are the only server-issued credential: stateless HS256
//! tokens carrying the actor id and role. Ending a session is a client-side
//! discard; there is no server-side revocation list.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::Actor;

/// JWT service for token generation and validation.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry_minutes: i64,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (actor ID)
    pub sub: Uuid,
    /// Email
    pub email: String,
    /// Role code at issue time
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    pub jti: String,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Result<Self, AppError> {
        if config.secret.len() < 32 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT secret must be at least 32 bytes"
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_token_expiry_minutes: config.access_token_expiry_minutes,
        })
    }

    /// Generate an access token for an actor.
    pub fn generate_access_token(&self, actor: &Actor) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.access_token_expiry_minutes);

        let claims = AccessTokenClaims {
            sub: actor.user_id,
            email: actor.email.clone(),
            role: actor.role_code.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate an access token and return its claims.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, AppError> {
        let data = decode::<AccessTokenClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }

    /// Token lifetime in seconds, reported to clients at login.
    pub fn expires_in_seconds(&self) -> i64 {
        self.access_token_expiry_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn service() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_minutes: 30,
        })
        .unwrap()
    }

    fn actor() -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            email: "sales@hardware.example".to_string(),
            display_name: "Sales Officer".to_string(),
            role_code: Role::SalesOfficer.as_str().to_string(),
            is_active: true,
            password_hash: String::new(),
            created_utc: Utc::now(),
            updated_utc: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips_claims() {
        let service = service();
        let actor = actor();

        let token = service.generate_access_token(&actor).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, actor.user_id);
        assert_eq!(claims.email, actor.email);
        assert_eq!(claims.role, "sales_officer");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = service();
        let token = service.generate_access_token(&actor()).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(service.validate_access_token(&tampered).is_err());
    }

    #[test]
    fn short_secret_is_rejected() {
        let result = JwtService::new(&JwtConfig {
            secret: "short".to_string(),
            access_token_expiry_minutes: 30,
        });
        assert!(result.is_err());
    }
}
