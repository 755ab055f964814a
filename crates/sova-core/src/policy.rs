//! Visibility and authorization decisions for posts, comments and users.
//!
//! Every decision is a pure function of the actor, the post (when the action
//! targets one) and the evaluation time carried by [`Policy`]. Callers load
//! the actor and post beforehand and enforce the verdict.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Post, Role};
use crate::error::AccessDenied;

/// The identity making a request, resolved once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Authenticated { id: Uuid, role: Role },
}

impl Actor {
    pub fn authenticated(id: Uuid, role: Role) -> Self {
        Actor::Authenticated { id, role }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Actor::Anonymous)
    }

    pub fn id(&self) -> Option<Uuid> {
        match self {
            Actor::Authenticated { id, .. } => Some(*id),
            Actor::Anonymous => None,
        }
    }

    /// Owner of the post, or an admin.
    fn owns_or_admin(&self, post: &Post) -> bool {
        match self {
            Actor::Authenticated { id, role } => post.is_owned_by(*id) || role.is_admin(),
            Actor::Anonymous => false,
        }
    }
}

/// Restriction applied to post listings before pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    /// Drafts and published posts alike.
    Unrestricted,
    /// Only posts with `published_at <= at`.
    PublishedAsOf(DateTime<Utc>),
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            PostFilter::Unrestricted => true,
            PostFilter::PublishedAsOf(at) => post.is_published_at(*at),
        }
    }
}

/// Authorization policy evaluated at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct Policy {
    now: DateTime<Utc>,
}

impl Policy {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn current() -> Self {
        Self::at(Utc::now())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn can_list_posts(&self, actor: &Actor) -> PostFilter {
        match actor {
            Actor::Authenticated {
                role: Role::Admin | Role::Editor,
                ..
            } => PostFilter::Unrestricted,
            Actor::Anonymous => PostFilter::PublishedAsOf(self.now),
        }
    }

    pub fn can_view_post(&self, actor: &Actor, post: &Post) -> bool {
        post.is_published_at(self.now) || actor.owns_or_admin(post)
    }

    pub fn can_create_post(&self, actor: &Actor) -> bool {
        matches!(
            actor,
            Actor::Authenticated {
                role: Role::Admin | Role::Editor,
                ..
            }
        )
    }

    pub fn can_update_post(&self, actor: &Actor, post: &Post) -> bool {
        actor.owns_or_admin(post)
    }

    pub fn can_delete_post(&self, actor: &Actor, post: &Post) -> bool {
        actor.owns_or_admin(post)
    }

    /// Commenting needs any authenticated actor. Visibility of the parent post
    /// is a separate check the caller makes with [`Policy::can_view_post`].
    pub fn can_comment(&self, actor: &Actor) -> bool {
        !actor.is_anonymous()
    }

    pub fn can_list_all_users(&self, actor: &Actor) -> bool {
        matches!(
            actor,
            Actor::Authenticated {
                role: Role::Admin,
                ..
            }
        )
    }

    /// Turn a decision into a result. Anonymous actors are told to
    /// authenticate; resolved actors are forbidden.
    pub fn authorize(&self, actor: &Actor, allowed: bool) -> Result<(), AccessDenied> {
        match (allowed, actor) {
            (true, _) => Ok(()),
            (false, Actor::Anonymous) => Err(AccessDenied::Unauthenticated),
            (false, Actor::Authenticated { .. }) => Err(AccessDenied::Forbidden),
        }
    }
}
