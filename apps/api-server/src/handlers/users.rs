//! User listing handler.

use actix_web::{HttpResponse, web};

use sova_core::policy::Policy;
use sova_shared::dto::UserResponse;

use super::views::user_response;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/users - admins only.
pub async fn index(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let policy = Policy::current();
    policy.authorize(&actor, policy.can_list_all_users(&actor))?;

    let users: Vec<UserResponse> = state
        .users
        .list_all()
        .await?
        .iter()
        .map(user_response)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}
