use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slugify;

/// Post entity - represents a blog post.
///
/// A post is published once `published_at` is set and not in the future;
/// otherwise it is a draft. The state is never stored, only derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    /// Owner of the post. Fixed for the post's lifetime.
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub slug: Option<String>,
    pub image_path: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub image_path: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Partial update of a post. The outer `Option` on nullable fields tells
/// "leave unchanged" (`None`) apart from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image_path: Option<Option<String>>,
    pub published_at: Option<Option<DateTime<Utc>>>,
}

impl Post {
    /// Create a new post owned by `user_id`, deriving the slug from the title.
    pub fn new(user_id: Uuid, new: NewPost) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            slug: slug_for(&new.title),
            title: new.title,
            body: new.body,
            image_path: new.image_path,
            published_at: new.published_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the post is published as of `now`. The boundary is inclusive.
    pub fn is_published_at(&self, now: DateTime<Utc>) -> bool {
        self.published_at.is_some_and(|at| at <= now)
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Apply a partial update. A new title re-derives the slug.
    pub fn apply(&mut self, changes: PostChanges) {
        if let Some(title) = changes.title {
            self.slug = slug_for(&title);
            self.title = title;
        }
        if let Some(body) = changes.body {
            self.body = body;
        }
        if let Some(image_path) = changes.image_path {
            self.image_path = image_path;
        }
        if let Some(published_at) = changes.published_at {
            self.published_at = published_at;
        }
        self.updated_at = Utc::now();
    }
}

fn slug_for(title: &str) -> Option<String> {
    let slug = slugify(title);
    (!slug.is_empty()).then_some(slug)
}
