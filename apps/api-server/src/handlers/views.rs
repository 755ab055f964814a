//! Conversions from domain entities to response DTOs.

use std::collections::HashMap;

use sova_core::domain::{Comment, Post, User};
use sova_shared::dto::{CommentResponse, PostResponse, UserResponse, UserSummary};
use uuid::Uuid;

pub fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.to_string(),
        created_at: user.created_at.to_rfc3339(),
    }
}

pub fn user_summary(user: &User) -> UserSummary {
    UserSummary {
        id: user.id.to_string(),
        name: user.name.clone(),
    }
}

pub fn post_response(post: Post, author: Option<&User>) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        user_id: post.user_id.to_string(),
        title: post.title,
        body: post.body,
        slug: post.slug,
        image_path: post.image_path,
        published_at: post.published_at.map(|at| at.to_rfc3339()),
        created_at: post.created_at.to_rfc3339(),
        updated_at: post.updated_at.to_rfc3339(),
        user: author.map(user_summary),
    }
}

pub fn comment_response(comment: Comment, author: Option<&User>) -> CommentResponse {
    CommentResponse {
        id: comment.id.to_string(),
        post_id: comment.post_id.to_string(),
        user_id: comment.user_id.to_string(),
        body: comment.body,
        created_at: comment.created_at.to_rfc3339(),
        user: author.map(user_summary),
    }
}

/// Index users by id for attaching authors to posts and comments.
pub fn by_id(users: Vec<User>) -> HashMap<Uuid, User> {
    users.into_iter().map(|u| (u.id, u)).collect()
}

/// Distinct ids, in first-seen order.
pub fn distinct_ids(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = Vec::new();
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}
