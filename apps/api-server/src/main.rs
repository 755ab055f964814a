//! # Sova API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

#[cfg(test)]
mod tests;

use config::AppConfig;
use observability::RequestIdMiddleware;
use sova_core::ports::{PasswordService, RateLimiter, TokenService};
use sova_infra::{Argon2PasswordService, InMemoryRateLimiter, JwtTokenService};
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env())
        .map_err(|e| std::io::Error::other(e))?;

    let config = AppConfig::from_env();

    tracing::info!(
        host = %config.host,
        port = config.port,
        "Starting Sova API Server"
    );

    let state = AppState::new(config.database.as_ref()).await;

    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
    let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
    let auth_limiter: Arc<dyn RateLimiter> = Arc::new(
        InMemoryRateLimiter::from_env()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?,
    );

    HttpServer::new(move || {
        let auth_limiter = auth_limiter.clone();
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(token_service.clone()))
            .app_data(web::Data::new(password_service.clone()))
            .configure(move |cfg| handlers::configure_routes(cfg, auth_limiter))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
