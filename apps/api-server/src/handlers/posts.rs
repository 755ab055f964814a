//! Post handlers.
//!
//! Each handler resolves the actor, loads the target post when there is one,
//! and asks the [`Policy`] before touching the request body.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use sova_core::domain::{NewPost, PageRequest, Post, PostChanges};
use sova_core::error::RepoError;
use sova_core::policy::Policy;
use sova_shared::Paginated;
use sova_shared::dto::{
    CreatePostRequest, ListPostsQuery, PostDetailResponse, PostResponse, UpdatePostRequest,
};

use super::views::{by_id, comment_response, distinct_ids, post_response};
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Posts per page on the listing.
pub const PER_PAGE: u64 = 10;

const TITLE_TAKEN: &str = "The title has already been taken.";

/// GET /api/posts?page=N
pub async fn index(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let filter = Policy::current().can_list_posts(&actor);
    let request = PageRequest::new(query.page.unwrap_or(1), PER_PAGE);

    let page = state.posts.paginate(filter, request).await?;

    let author_ids = distinct_ids(page.items.iter().map(|p| p.user_id));
    let authors = by_id(state.users.find_by_ids(&author_ids).await?);

    let data: Vec<PostResponse> = page
        .items
        .into_iter()
        .map(|post| {
            let author = authors.get(&post.user_id);
            post_response(post, author)
        })
        .collect();

    Ok(HttpResponse::Ok().json(Paginated::new(
        data,
        page.page,
        page.per_page,
        page.total,
    )))
}

/// GET /api/posts/{slug}
pub async fn show(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let post = state
        .posts
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post '{}' not found", slug)))?;

    let actor = identity.actor();
    let policy = Policy::current();
    policy.authorize(&actor, policy.can_view_post(&actor, &post))?;

    let comments = state.comments.find_by_post_id(post.id).await?;

    let user_ids = distinct_ids(
        std::iter::once(post.user_id).chain(comments.iter().map(|c| c.user_id)),
    );
    let users = by_id(state.users.find_by_ids(&user_ids).await?);

    let comments = comments
        .into_iter()
        .map(|comment| {
            let author = users.get(&comment.user_id);
            comment_response(comment, author)
        })
        .collect();
    let author = users.get(&post.user_id);

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: post_response(post, author),
        comments,
    }))
}

/// POST /api/posts
pub async fn store(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let policy = Policy::current();
    policy.authorize(&actor, policy.can_create_post(&actor))?;
    let owner = actor.id().ok_or(AppError::Unauthorized)?;

    let req = body.into_inner().validate().map_err(AppError::Validation)?;

    if state.posts.find_by_title(&req.title).await?.is_some() {
        return Err(AppError::validation(TITLE_TAKEN));
    }

    let post = Post::new(
        owner,
        NewPost {
            title: req.title,
            body: req.body,
            image_path: req.image_path,
            published_at: req.published_at,
        },
    );

    let post = state.posts.create(post).await.map_err(title_conflict)?;

    tracing::info!(post_id = %post.id, user_id = %owner, "Post created");

    let author = state.users.find_by_id(owner).await?;
    Ok(HttpResponse::Created().json(post_response(post, author.as_ref())))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let mut post = find_post(&state, path.into_inner()).await?;

    let actor = identity.actor();
    let policy = Policy::current();
    policy.authorize(&actor, policy.can_update_post(&actor, &post))?;

    let patch = body.into_inner().validate().map_err(AppError::Validation)?;

    if let Some(title) = &patch.title {
        if let Some(existing) = state.posts.find_by_title(title).await? {
            if existing.id != post.id {
                return Err(AppError::validation(TITLE_TAKEN));
            }
        }
    }

    post.apply(PostChanges {
        title: patch.title,
        body: patch.body,
        image_path: patch.image_path,
        published_at: patch.published_at,
    });

    let post = state.posts.update(post).await.map_err(title_conflict)?;

    tracing::info!(post_id = %post.id, actor = ?actor, "Post updated");

    let author = state.users.find_by_id(post.user_id).await?;
    Ok(HttpResponse::Ok().json(post_response(post, author.as_ref())))
}

/// DELETE /api/posts/{id}
pub async fn destroy(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;

    let actor = identity.actor();
    let policy = Policy::current();
    policy.authorize(&actor, policy.can_delete_post(&actor, &post))?;

    let removed = state.posts.delete_with_comments(post.id).await?;

    tracing::info!(post_id = %post.id, comments = removed, actor = ?actor, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}

pub(super) async fn find_post(state: &AppState, id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {} not found", id)))
}

/// Unique violations on posts come from the title or the slug derived from it.
fn title_conflict(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(_) => AppError::validation(TITLE_TAKEN),
        other => other.into(),
    }
}
