//! Authentication extractors.
//!
//! [`Identity`] requires a valid, unrevoked bearer token. [`OptionalIdentity`]
//! never fails: a missing or invalid token resolves to an anonymous actor.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use chrono::{DateTime, Utc};
use futures::future::LocalBoxFuture;
use std::sync::Arc;

use sova_core::domain::Role;
use sova_core::policy::Actor;
use sova_core::ports::{AuthError, TokenClaims, TokenService};

use crate::state::AppState;

/// Authenticated user identity extractor.
///
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub role: Role,
    pub token_id: uuid::Uuid,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    pub fn actor(&self) -> Actor {
        Actor::authenticated(self.user_id, self.role)
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            expires_at: claims.expires_at(),
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
            token_id: claims.token_id,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            AuthError::HashingError(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => actix_web::http::StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        use sova_shared::ErrorResponse;

        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::TokenRevoked => ErrorResponse::new(401, "Token Revoked")
                .with_detail("This token has been logged out. Please login again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Please provide a valid Bearer token in the Authorization header."),
            AuthError::InvalidCredentials => ErrorResponse::unauthorized(),
            AuthError::HashingError(_) => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

/// Extract the raw token from an `Authorization: Bearer <token>` header.
fn bearer_token(req: &HttpRequest) -> Result<String, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token_service = req.app_data::<web::Data<Arc<dyn TokenService>>>().cloned();
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let (Some(token_service), Some(state)) = (token_service, state) else {
                tracing::error!("TokenService or AppState not found in app data");
                return Err(AuthenticationError(AuthError::InvalidToken(
                    "Server configuration error".to_string(),
                )));
            };

            let claims = token_service
                .validate_token(&token.map_err(AuthenticationError)?)
                .map_err(AuthenticationError)?;

            let revoked = state
                .revoked_tokens
                .is_revoked(claims.token_id)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to check token revocation");
                    AuthenticationError(AuthError::InvalidToken(
                        "Unable to verify token".to_string(),
                    ))
                })?;
            if revoked {
                return Err(AuthenticationError(AuthError::TokenRevoked));
            }

            Ok(Identity::from(claims))
        })
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    /// The request's actor; anonymous when no valid token was presented.
    pub fn actor(&self) -> Actor {
        self.0
            .as_ref()
            .map(Identity::actor)
            .unwrap_or(Actor::Anonymous)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let identity = Identity::from_request(req, payload);

        Box::pin(async move {
            match identity.await {
                Ok(identity) => Ok(OptionalIdentity(Some(identity))),
                Err(AuthenticationError(AuthError::MissingAuth)) => Ok(OptionalIdentity(None)),
                Err(e) => {
                    tracing::debug!(reason = %e, "Ignoring unusable token, treating as anonymous");
                    Ok(OptionalIdentity(None))
                }
            }
        })
    }
}
