//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod posts;
mod users;
mod views;

use actix_web::web;
use std::sync::Arc;

use sova_core::ports::RateLimiter;

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes. Registration and login share
/// `auth_limiter`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, auth_limiter: Arc<dyn RateLimiter>) {
    // Malformed bodies and query strings answer with problem documents too.
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    );

    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::resource("/register")
                    .wrap(RateLimitMiddleware::new(auth_limiter.clone()))
                    .route(web::post().to(auth::register)),
            )
            .service(
                web::resource("/login")
                    .wrap(RateLimitMiddleware::new(auth_limiter))
                    .route(web::post().to(auth::login)),
            )
            // Token required
            .route("/logout", web::post().to(auth::logout))
            .route("/user", web::get().to(auth::me))
            .route("/users", web::get().to(users::index))
            // Posts: visibility decided per actor
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::index))
                    .route(web::post().to(posts::store)),
            )
            .route("/posts/{id}/comments", web::post().to(comments::store))
            .service(
                web::resource("/posts/{key}")
                    .route(web::get().to(posts::show))
                    .route(web::put().to(posts::update))
                    .route(web::delete().to(posts::destroy)),
            ),
    );
}
