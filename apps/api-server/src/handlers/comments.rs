//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use sova_core::domain::Comment;
use sova_core::policy::Policy;
use sova_shared::dto::CreateCommentRequest;

use super::posts::find_post;
use super::views::comment_response;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/posts/{id}/comments
///
/// Anonymous callers are turned away before the post is looked up, so they
/// cannot probe for post ids.
pub async fn store(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let policy = Policy::current();
    policy.authorize(&actor, policy.can_comment(&actor))?;
    let author_id = actor.id().ok_or(AppError::Unauthorized)?;

    let post = find_post(&state, path.into_inner()).await?;
    policy.authorize(&actor, policy.can_view_post(&actor, &post))?;

    let body = body.into_inner().validate().map_err(AppError::Validation)?;

    let comment = state
        .comments
        .create(Comment::new(post.id, author_id, body))
        .await?;

    tracing::info!(
        comment_id = %comment.id,
        post_id = %post.id,
        user_id = %author_id,
        "Comment added"
    );

    let author = state.users.find_by_id(author_id).await?;
    Ok(HttpResponse::Created().json(comment_response(comment, author.as_ref())))
}
