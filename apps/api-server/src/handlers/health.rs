//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub timestamp: String,
}

/// GET /api/health
///
/// Reports `degraded` with a 503 when the configured database stops answering.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let (status, storage) = match &state.db {
        Some(db) if ping(db).await => ("ok", "postgres"),
        Some(_) => ("degraded", "postgres"),
        None => ("ok", "memory"),
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        storage,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if status == "ok" {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[cfg(feature = "postgres")]
async fn ping(db: &sova_infra::DatabaseConnections) -> bool {
    match db.main.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Database ping failed");
            false
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn ping(_db: &sova_infra::DatabaseConnections) -> bool {
    true
}
