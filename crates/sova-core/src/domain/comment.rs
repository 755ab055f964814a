use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment left by a user on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, user_id: Uuid, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            body,
            created_at: Utc::now(),
        }
    }
}
