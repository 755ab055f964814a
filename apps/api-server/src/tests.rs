//! HTTP flows over in-memory state.

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use std::sync::Arc;

use sova_core::domain::{Comment, NewPost, Post, Role, User};
use sova_core::ports::{PasswordService, RateLimiter, TokenService};
use sova_infra::{
    Argon2PasswordService, InMemoryRateLimiter, JwtConfig, JwtTokenService, PasswordConfig,
    RateLimitConfig,
};

use crate::handlers;
use crate::state::AppState;

struct Harness {
    state: AppState,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
    limiter: Arc<dyn RateLimiter>,
}

impl Harness {
    fn new() -> Self {
        let limiter = InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 1000,
            window: std::time::Duration::from_secs(60),
        })
        .unwrap();

        Self {
            state: AppState::in_memory(),
            tokens: Arc::new(JwtTokenService::new(JwtConfig {
                secret: "test-secret".to_string(),
                issuer: "sova-test".to_string(),
                ttl: Duration::hours(1),
            })),
            passwords: Arc::new(
                Argon2PasswordService::with_config(PasswordConfig {
                    memory_kib: 1024,
                    iterations: 1,
                    parallelism: 1,
                })
                .unwrap(),
            ),
            limiter: Arc::new(limiter),
        }
    }

    async fn user(&self, name: &str, role: Role) -> (User, String) {
        let user = self
            .state
            .users
            .create(User::new(
                name.to_string(),
                format!("{}@example.com", name.to_lowercase()),
                "unused-hash".to_string(),
                role,
            ))
            .await
            .unwrap();
        let token = self
            .tokens
            .generate_token(user.id, &user.email, user.role)
            .unwrap();
        (user, format!("Bearer {token}"))
    }

    async fn post(&self, owner: &User, title: &str, published_hours_ago: Option<i64>) -> Post {
        let post = Post::new(
            owner.id,
            NewPost {
                title: title.to_string(),
                body: format!("Body of {title}"),
                image_path: None,
                published_at: published_hours_ago.map(|h| Utc::now() - Duration::hours(h)),
            },
        );
        self.state.posts.create(post).await.unwrap()
    }
}

macro_rules! init_app {
    ($harness:expr) => {{
        let limiter = $harness.limiter.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new($harness.state.clone()))
                .app_data(web::Data::new($harness.tokens.clone()))
                .app_data(web::Data::new($harness.passwords.clone()))
                .configure(move |cfg| handlers::configure_routes(cfg, limiter)),
        )
        .await
    }};
}

fn get(uri: &str, auth: Option<&str>) -> test::TestRequest {
    with_auth(test::TestRequest::get().uri(uri), auth)
}

fn with_auth(req: test::TestRequest, auth: Option<&str>) -> test::TestRequest {
    match auth {
        Some(token) => req.insert_header(("Authorization", token.to_string())),
        None => req,
    }
}

#[actix_web::test]
async fn test_health_reports_memory_storage() {
    let h = Harness::new();
    let app = init_app!(h);

    let body: Value = test::call_and_read_body_json(&app, get("/api/health", None).to_request()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[actix_web::test]
async fn test_anonymous_listing_hides_drafts_and_scheduled_posts() {
    let h = Harness::new();
    let (editor, token) = h.user("Ed", Role::Editor).await;
    h.post(&editor, "Published", Some(2)).await;
    h.post(&editor, "Draft", None).await;
    h.post(&editor, "Scheduled", Some(-24)).await;
    let app = init_app!(h);

    let body: Value = test::call_and_read_body_json(&app, get("/api/posts", None).to_request()).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["title"], "Published");
    assert_eq!(body["data"][0]["user"]["name"], "Ed");

    let body: Value =
        test::call_and_read_body_json(&app, get("/api/posts", Some(&token)).to_request()).await;
    assert_eq!(body["total"], 3);
}

#[actix_web::test]
async fn test_listing_paginates_ten_per_page() {
    let h = Harness::new();
    let (editor, _) = h.user("Ed", Role::Editor).await;
    for i in 0..12 {
        h.post(&editor, &format!("Post {i}"), Some(1)).await;
    }
    let app = init_app!(h);

    let body: Value =
        test::call_and_read_body_json(&app, get("/api/posts?page=2", None).to_request()).await;
    assert_eq!(body["current_page"], 2);
    assert_eq!(body["last_page"], 2);
    assert_eq!(body["per_page"], 10);
    assert_eq!(body["total"], 12);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_listing_out_of_range_page_is_empty() {
    let h = Harness::new();
    let (editor, _) = h.user("Ed", Role::Editor).await;
    h.post(&editor, "Only", Some(1)).await;
    let app = init_app!(h);

    let uri = format!("/api/posts?page={}", u64::MAX);
    let resp = test::call_service(&app, get(&uri, None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 1);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_draft_view_depends_on_actor() {
    let h = Harness::new();
    let (owner, owner_token) = h.user("Owner", Role::Editor).await;
    let (_, other_token) = h.user("Other", Role::Editor).await;
    let (_, admin_token) = h.user("Admin", Role::Admin).await;
    h.post(&owner, "Secret Draft", None).await;
    let app = init_app!(h);

    let uri = "/api/posts/secret-draft";
    let resp = test::call_service(&app, get(uri, None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(&app, get(uri, Some(&other_token)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(&app, get(uri, Some(&owner_token)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, get(uri, Some(&admin_token)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_show_includes_comments_and_unknown_slug_is_not_found() {
    let h = Harness::new();
    let (editor, token) = h.user("Ed", Role::Editor).await;
    let post = h.post(&editor, "Hello World", Some(1)).await;
    let app = init_app!(h);

    let req = with_auth(test::TestRequest::post(), Some(&token))
        .uri(&format!("/api/posts/{}/comments", post.id))
        .set_json(json!({ "body": "Nice post" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value =
        test::call_and_read_body_json(&app, get("/api/posts/hello-world", None).to_request()).await;
    assert_eq!(body["title"], "Hello World");
    assert_eq!(body["user"]["name"], "Ed");
    assert_eq!(body["comments"][0]["body"], "Nice post");
    assert_eq!(body["comments"][0]["user"]["name"], "Ed");

    let resp = test::call_service(&app, get("/api/posts/no-such-post", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_anonymous_create_is_unauthorized_even_with_invalid_body() {
    let h = Harness::new();
    let app = init_app!(h);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({ "title": "T", "body": "B" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_malformed_input_is_bad_request() {
    let h = Harness::new();
    let (_, token) = h.user("Ed", Role::Editor).await;
    let app = init_app!(h);

    let req = with_auth(test::TestRequest::post(), Some(&token))
        .uri("/api/posts")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);

    let resp = test::call_service(&app, get("/api/posts?page=abc", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_editor_creates_post_with_slug() {
    let h = Harness::new();
    let (_, token) = h.user("Ed", Role::Editor).await;
    let app = init_app!(h);

    let req = with_auth(test::TestRequest::post(), Some(&token))
        .uri("/api/posts")
        .set_json(json!({
            "title": "Rust & Friends",
            "body": "Hello",
            "published_at": "2024-01-01 00:00:00"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["slug"], "rust-friends");
    assert_eq!(body["user"]["name"], "Ed");
    assert!(body["published_at"].as_str().unwrap().starts_with("2024-01-01T00:00:00"));
}

#[actix_web::test]
async fn test_post_validation_errors() {
    let h = Harness::new();
    let (editor, token) = h.user("Ed", Role::Editor).await;
    h.post(&editor, "Taken", Some(1)).await;
    let app = init_app!(h);

    let req = with_auth(test::TestRequest::post(), Some(&token))
        .uri("/api/posts")
        .set_json(json!({ "body": "", "published_at": "yesterday" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    let errors = body["errors"].as_array().unwrap();
    assert!(errors.contains(&json!("The title field is required.")));
    assert!(errors.contains(&json!("The body field is required.")));

    let req = with_auth(test::TestRequest::post(), Some(&token))
        .uri("/api/posts")
        .set_json(json!({ "title": "Taken", "body": "Again" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"][0], "The title has already been taken.");
}

#[actix_web::test]
async fn test_non_owner_cannot_update_or_delete_but_admin_can() {
    let h = Harness::new();
    let (owner, _) = h.user("Owner", Role::Editor).await;
    let (_, other_token) = h.user("Other", Role::Editor).await;
    let (_, admin_token) = h.user("Admin", Role::Admin).await;
    let post = h.post(&owner, "Original", Some(1)).await;
    let app = init_app!(h);
    let uri = format!("/api/posts/{}", post.id);

    let req = with_auth(test::TestRequest::put(), Some(&other_token))
        .uri(&uri)
        .set_json(json!({ "title": "Hijacked" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = with_auth(test::TestRequest::delete(), Some(&other_token))
        .uri(&uri)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = with_auth(test::TestRequest::put(), Some(&admin_token))
        .uri(&uri)
        .set_json(json!({ "title": "Edited By Admin" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["slug"], "edited-by-admin");
    assert_eq!(body["user_id"], owner.id.to_string());

    let req = with_auth(test::TestRequest::delete(), Some(&admin_token))
        .uri(&uri)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    assert!(h.state.posts.find_by_id(post.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_update_null_unpublishes_and_missing_post_is_not_found() {
    let h = Harness::new();
    let (owner, token) = h.user("Owner", Role::Editor).await;
    let post = h.post(&owner, "Live", Some(1)).await;
    let app = init_app!(h);

    let req = with_auth(test::TestRequest::put(), Some(&token))
        .uri(&format!("/api/posts/{}", post.id))
        .set_json(json!({ "published_at": null }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["published_at"].is_null());
    assert_eq!(body["title"], "Live");

    let resp = test::call_service(&app, get("/api/posts/live", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = with_auth(test::TestRequest::put(), Some(&token))
        .uri(&format!("/api/posts/{}", uuid::Uuid::new_v4()))
        .set_json(json!({ "title": "Nope" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_removes_comments() {
    let h = Harness::new();
    let (owner, token) = h.user("Owner", Role::Editor).await;
    let post = h.post(&owner, "Doomed", Some(1)).await;
    h.state
        .comments
        .create(Comment::new(post.id, owner.id, "first".to_string()))
        .await
        .unwrap();
    let app = init_app!(h);

    let req = with_auth(test::TestRequest::delete(), Some(&token))
        .uri(&format!("/api/posts/{}", post.id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    assert!(h.state.comments.find_by_post_id(post.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_comment_authorization() {
    let h = Harness::new();
    let (owner, _) = h.user("Owner", Role::Editor).await;
    let (_, other_token) = h.user("Other", Role::Editor).await;
    let published = h.post(&owner, "Open", Some(1)).await;
    let draft = h.post(&owner, "Hidden", None).await;
    let app = init_app!(h);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comments", published.id))
        .set_json(json!({ "body": "hi" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = with_auth(test::TestRequest::post(), Some(&other_token))
        .uri(&format!("/api/posts/{}/comments", draft.id))
        .set_json(json!({ "body": "hi" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = with_auth(test::TestRequest::post(), Some(&other_token))
        .uri(&format!("/api/posts/{}/comments", uuid::Uuid::new_v4()))
        .set_json(json!({ "body": "hi" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = with_auth(test::TestRequest::post(), Some(&other_token))
        .uri(&format!("/api/posts/{}/comments", published.id))
        .set_json(json!({ "body": "   " }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[actix_web::test]
async fn test_user_listing_is_admin_only() {
    let h = Harness::new();
    let (_, editor_token) = h.user("Ed", Role::Editor).await;
    let (_, admin_token) = h.user("Admin", Role::Admin).await;
    let app = init_app!(h);

    let resp = test::call_service(&app, get("/api/users", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(&app, get("/api/users", Some(&editor_token)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: Value =
        test::call_and_read_body_json(&app, get("/api/users", Some(&admin_token)).to_request())
            .await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert!(body[0].get("password_hash").is_none());
}

#[actix_web::test]
async fn test_register_login_and_logout() {
    let h = Harness::new();
    let (owner, _) = h.user("Owner", Role::Editor).await;
    h.post(&owner, "Unpublished", None).await;
    let app = init_app!(h);

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({ "name": "Ada", "email": "ada@example.com", "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["role"], "editor");

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({ "name": "Ada", "email": "ada@example.com", "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "ada@example.com", "password": "wrong-one" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"][0], "The credentials are incorrect.");

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "ada@example.com", "password": "secret1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["token_type"], "Bearer");
    let bearer = format!("Bearer {}", body["token"].as_str().unwrap());

    let body: Value =
        test::call_and_read_body_json(&app, get("/api/user", Some(&bearer)).to_request()).await;
    assert_eq!(body["email"], "ada@example.com");

    let body: Value =
        test::call_and_read_body_json(&app, get("/api/posts", Some(&bearer)).to_request()).await;
    assert_eq!(body["total"], 1);

    let req = with_auth(test::TestRequest::post(), Some(&bearer))
        .uri("/api/logout")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let resp = test::call_service(&app, get("/api/user", Some(&bearer)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // A revoked token reads as anonymous on public routes.
    let body: Value =
        test::call_and_read_body_json(&app, get("/api/posts", Some(&bearer)).to_request()).await;
    assert_eq!(body["total"], 0);
}

#[actix_web::test]
async fn test_email_case_is_ignored_on_register_and_login() {
    let h = Harness::new();
    let app = init_app!(h);

    let register = |email: &str| {
        test::TestRequest::post()
            .uri("/api/register")
            .set_json(json!({ "name": "Ada", "email": email, "password": "secret1" }))
            .to_request()
    };

    let resp = test::call_service(&app, register("Ada@Example.com")).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "ada@example.com");

    let resp = test::call_service(&app, register("ADA@example.COM")).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "ADA@EXAMPLE.COM", "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_register_validation_errors() {
    let h = Harness::new();
    let app = init_app!(h);

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({ "name": "", "email": "nope", "password": "123", "role": "reader" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"].as_array().unwrap().len(), 4);
}

#[actix_web::test]
async fn test_auth_routes_are_rate_limited() {
    let mut h = Harness::new();
    h.limiter = Arc::new(
        InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 1,
            window: std::time::Duration::from_secs(60),
        })
        .unwrap(),
    );
    let app = init_app!(h);

    let login = || {
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": "x@example.com", "password": "whatever" }))
            .to_request()
    };

    let resp = test::call_service(&app, login()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = test::call_service(&app, login()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key("Retry-After"));

    let resp = test::call_service(&app, get("/api/health", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
