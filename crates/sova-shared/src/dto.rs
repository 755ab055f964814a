//! Data Transfer Objects - request/response types for the API.
//!
//! Request types validate themselves and hand back trimmed, parsed values.
//! Errors are collected per field so a client sees every problem at once.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Wire format of `published_at` in requests, interpreted as UTC.
pub const PUBLISHED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MAX_NAME_LEN: usize = 255;
const MAX_EMAIL_LEN: usize = 255;
const MIN_PASSWORD_LEN: usize = 6;
const MAX_TITLE_LEN: usize = 255;
const MAX_IMAGE_PATH_LEN: usize = 2048;
const MAX_COMMENT_LEN: usize = 2000;
const ROLES: [&str; 2] = ["admin", "editor"];

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn require(field: &str, value: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(format!("The {field} field is required."));
    }
}

fn max_len(field: &str, value: &str, max: usize, errors: &mut Vec<String>) {
    if char_len(value) > max {
        errors.push(format!(
            "The {field} may not be greater than {max} characters."
        ));
    }
}

fn trimmed_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a `published_at` value in [`PUBLISHED_AT_FORMAT`].
pub fn parse_published_at(value: &str) -> Result<DateTime<Utc>, String> {
    NaiveDateTime::parse_from_str(value.trim(), PUBLISHED_AT_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| "The published at does not match the format Y-m-d H:i:s.".to_string())
}

/// Emails are stored and looked up trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// A registration that passed validation.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    /// `None` when the client did not ask for a role.
    pub role: Option<String>,
}

impl RegisterUserRequest {
    pub fn validate(self) -> Result<ValidRegistration, Vec<String>> {
        let mut errors = Vec::new();
        let name = self.name.trim().to_string();
        let email = normalize_email(&self.email);

        require("name", &name, &mut errors);
        max_len("name", &name, MAX_NAME_LEN, &mut errors);

        if email.is_empty() {
            errors.push("The email field is required.".to_string());
        } else if !is_valid_email(&email) {
            errors.push("The email must be a valid email address.".to_string());
        }
        max_len("email", &email, MAX_EMAIL_LEN, &mut errors);

        if self.password.is_empty() {
            errors.push("The password field is required.".to_string());
        } else if char_len(&self.password) < MIN_PASSWORD_LEN {
            errors.push(format!(
                "The password must be at least {MIN_PASSWORD_LEN} characters."
            ));
        }

        if let Some(role) = &self.role {
            if !ROLES.contains(&role.as_str()) {
                errors.push("The selected role is invalid.".to_string());
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidRegistration {
            name,
            email,
            password: self.password,
            role: self.role,
        })
    }
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.email.trim().is_empty() {
            errors.push("The email field is required.".to_string());
        } else if !is_valid_email(self.email.trim()) {
            errors.push("The email must be a valid email address.".to_string());
        }
        if self.password.is_empty() {
            errors.push("The password field is required.".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// The email in the form it is stored under.
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// A post creation that passed validation.
#[derive(Debug, Clone)]
pub struct ValidPost {
    pub title: String,
    pub body: String,
    pub image_path: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl CreatePostRequest {
    pub fn validate(self) -> Result<ValidPost, Vec<String>> {
        let mut errors = Vec::new();
        let title = self.title.trim().to_string();
        let body = self.body.trim().to_string();
        let image_path = trimmed_optional(self.image_path);

        require("title", &title, &mut errors);
        max_len("title", &title, MAX_TITLE_LEN, &mut errors);
        require("body", &body, &mut errors);
        if let Some(path) = &image_path {
            max_len("image path", path, MAX_IMAGE_PATH_LEN, &mut errors);
        }

        let published_at = match trimmed_optional(self.published_at) {
            Some(raw) => match parse_published_at(&raw) {
                Ok(at) => Some(at),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
            None => None,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidPost {
            title,
            body,
            image_path,
            published_at,
        })
    }
}

/// Request to update a post. Absent fields are left unchanged; `null` clears
/// `image_path` and `published_at`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub image_path: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub published_at: Option<Option<String>>,
}

/// A post update that passed validation.
#[derive(Debug, Clone, Default)]
pub struct ValidPostPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image_path: Option<Option<String>>,
    pub published_at: Option<Option<DateTime<Utc>>>,
}

impl UpdatePostRequest {
    pub fn validate(self) -> Result<ValidPostPatch, Vec<String>> {
        let mut errors = Vec::new();
        let title = self.title.map(|t| t.trim().to_string());
        let body = self.body.map(|b| b.trim().to_string());
        let image_path = self.image_path.map(trimmed_optional);

        if let Some(title) = &title {
            require("title", title, &mut errors);
            max_len("title", title, MAX_TITLE_LEN, &mut errors);
        }
        if let Some(body) = &body {
            require("body", body, &mut errors);
        }
        if let Some(Some(path)) = &image_path {
            max_len("image path", path, MAX_IMAGE_PATH_LEN, &mut errors);
        }

        let published_at = match self.published_at.map(trimmed_optional) {
            Some(Some(raw)) => match parse_published_at(&raw) {
                Ok(at) => Some(Some(at)),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
            Some(None) => Some(None),
            None => None,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidPostPatch {
            title,
            body,
            image_path,
            published_at,
        })
    }
}

/// Request to comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub body: String,
}

impl CreateCommentRequest {
    /// Returns the trimmed comment body.
    pub fn validate(self) -> Result<String, Vec<String>> {
        let mut errors = Vec::new();
        let body = self.body.trim().to_string();

        require("body", &body, &mut errors);
        max_len("body", &body, MAX_COMMENT_LEN, &mut errors);

        if errors.is_empty() { Ok(body) } else { Err(errors) }
    }
}

/// Query string of the post listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<u64>,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

/// Author or commenter attached to a post or comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub slug: Option<String>,
    pub image_path: Option<String>,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub body: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// A single post together with its comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Response containing an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}
