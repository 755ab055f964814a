//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use sova_core::domain::{Role, User};
use sova_core::error::RepoError;
use sova_core::ports::{PasswordService, TokenService};
use sova_infra::pii::mask_email;
use sova_shared::MessageResponse;
use sova_shared::dto::{AuthResponse, LoginRequest, RegisterResponse, RegisterUserRequest};

use super::views::user_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const EMAIL_TAKEN: &str = "The email has already been taken.";
const BAD_CREDENTIALS: &str = "The credentials are incorrect.";

/// POST /api/register
pub async fn register(
    state: web::Data<AppState>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner().validate().map_err(AppError::Validation)?;

    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::validation(EMAIL_TAKEN));
    }

    let role = match req.role.as_deref() {
        Some(role) => role.parse::<Role>()?,
        None => Role::default(),
    };

    let password_hash = password_service.hash(&req.password)?;

    let user = match state
        .users
        .create(User::new(req.name, req.email, password_hash, role))
        .await
    {
        Ok(user) => user,
        // Lost a race with a concurrent registration.
        Err(RepoError::Duplicate(_)) => return Err(AppError::validation(EMAIL_TAKEN)),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully".to_string(),
        user: user_response(&user),
    }))
}

/// POST /api/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate().map_err(AppError::Validation)?;

    let email = req.normalized_email();
    let user = state.users.find_by_email(&email).await?;

    let user = match user {
        Some(user) if password_service.verify(&req.password, &user.password_hash)? => user,
        _ => {
            tracing::warn!(user_email = %mask_email(&email), "Failed login attempt");
            return Err(AppError::validation(BAD_CREDENTIALS));
        }
    };

    let token = token_service.generate_token(user.id, &user.email, user.role)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds().max(0) as u64,
        user: user_response(&user),
    }))
}

/// POST /api/logout
///
/// Revokes the presented token until it would have expired anyway.
pub async fn logout(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    state
        .revoked_tokens
        .revoke(identity.token_id, identity.expires_at)
        .await?;

    tracing::info!(user_id = %identity.user_id, "User logged out");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Logged out successfully")))
}

/// GET /api/user
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(user_response(&user)))
}
