//! Domain entities - the core business objects.

mod comment;
mod page;
mod post;
mod role;
mod slug;
mod user;

pub use comment::Comment;
pub use page::{Page, PageRequest};
pub use post::{NewPost, Post, PostChanges};
pub use role::Role;
pub use slug::slugify;
pub use user::User;
