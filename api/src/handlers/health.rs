//! Health check handler.

use actix_web::{web, HttpResponse};
use tracing::warn;

use crate::dto::{DatabaseHealth, HealthResponse};
use crate::state::AppState;

/// Handler for `GET /health`
///
/// Reports 503 when a configured database does not answer.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = match &state.database {
        Some(pool) => {
            let healthy = match pool.health_check().await {
                Ok(healthy) => healthy,
                Err(e) => {
                    warn!(error = %e, "Database health check failed");
                    false
                }
            };
            let stats = pool.get_statistics();
            Some(DatabaseHealth {
                healthy,
                connections: stats.connections,
                idle_connections: stats.idle_connections,
                max_connections: stats.max_connections,
            })
        }
        None => None,
    };

    let healthy = database.as_ref().map_or(true, |db| db.healthy);
    let body = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        service: "cts",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database,
    };

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
