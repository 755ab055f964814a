//! HS256 access tokens.
//!
//! Every token carries a random `jti` so a single token can be revoked on
//! logout without touching the user's other sessions.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sova_core::domain::Role;
use sova_core::ports::{AuthError, TokenClaims, TokenService};

const DEV_SECRET: &str = "change-me-in-production";
const DEFAULT_TTL_MINUTES: i64 = 24 * 60;
const DEFAULT_ISSUER: &str = "sova-api";

/// Signing configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    /// Lifetime of an issued token. Negative values mint already-expired tokens.
    pub ttl: TimeDelta,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SECRET.to_string(),
            issuer: DEFAULT_ISSUER.to_string(),
            ttl: TimeDelta::minutes(DEFAULT_TTL_MINUTES),
        }
    }
}

impl JwtConfig {
    /// Reads `JWT_SECRET`, `JWT_ISSUER` and `JWT_TTL_MINUTES`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let secret = std::env::var("JWT_SECRET").unwrap_or(defaults.secret);
        if secret == DEV_SECRET {
            let production = std::env::var("RUST_ENV")
                .is_ok_and(|v| matches!(v.as_str(), "production" | "prod"));
            if production {
                tracing::error!("JWT_SECRET is unset in production, tokens are forgeable");
            } else {
                tracing::warn!("JWT_SECRET is unset, using the development secret");
            }
        }

        Self {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            ttl: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(TimeDelta::minutes)
                .unwrap_or(defaults.ttl),
        }
    }
}

/// Registered claims plus the user's email and role.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    jti: Uuid,
    iss: String,
    iat: i64,
    exp: i64,
    email: String,
    role: Role,
}

impl From<Claims> for TokenClaims {
    fn from(claims: Claims) -> Self {
        TokenClaims {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            token_id: claims.jti,
            exp: claims.exp,
        }
    }
}

/// Issues and verifies access tokens.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(JwtConfig::from_env())
    }

    fn issue_at(
        &self,
        now: DateTime<Utc>,
        user_id: Uuid,
        email: &str,
        role: Role,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.config.ttl).timestamp(),
            email: email.to_string(),
            role,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(&self, user_id: Uuid, email: &str, role: Role) -> Result<String, AuthError> {
        self.issue_at(Utc::now(), user_id, email, role)
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.into())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }

    fn expiration_seconds(&self) -> i64 {
        self.config.ttl.num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(issuer: &str, ttl: TimeDelta) -> JwtTokenService {
        JwtTokenService::new(JwtConfig {
            secret: "test-secret-key".to_string(),
            issuer: issuer.to_string(),
            ttl,
        })
    }

    #[test]
    fn test_token_round_trips_identity() {
        let service = service("test", TimeDelta::hours(1));
        let user_id = Uuid::new_v4();

        let token = service
            .generate_token(user_id, "admin@example.com", Role::Admin)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.expires_at() > Utc::now());
    }

    #[test]
    fn test_tokens_are_individually_identified() {
        let service = service("test", TimeDelta::hours(1));
        let user_id = Uuid::new_v4();

        let ids: Vec<Uuid> = (0..2)
            .map(|_| {
                let token = service
                    .generate_token(user_id, "a@example.com", Role::Editor)
                    .unwrap();
                service.validate_token(&token).unwrap().token_id
            })
            .collect();

        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_garbage_is_invalid() {
        let service = service("test", TimeDelta::hours(1));

        assert!(matches!(
            service.validate_token("not.a.jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let ours = service("ours", TimeDelta::hours(1));
        let theirs = service("theirs", TimeDelta::hours(1));

        let token = theirs
            .generate_token(Uuid::new_v4(), "x@example.com", Role::Editor)
            .unwrap();

        assert!(ours.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let service = service("test", TimeDelta::hours(-2));

        let token = service
            .generate_token(Uuid::new_v4(), "old@example.com", Role::Editor)
            .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_expiration_seconds_follows_ttl() {
        assert_eq!(
            service("test", TimeDelta::minutes(90)).expiration_seconds(),
            5400
        );
    }
}
