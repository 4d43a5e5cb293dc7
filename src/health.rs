use actix_web::{web, HttpResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::Database;

// ============================================================================
// Health Check Abstractions
// ============================================================================
//
// A component reports its own health; GET /health aggregates them. Today the
// only probed component is the database.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    #[serde(flatten)]
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
        }
    }
}

#[async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn check_health(&self) -> ComponentHealth;
}

#[async_trait]
impl HealthCheckable for Database {
    async fn check_health(&self) -> ComponentHealth {
        let status = match self.ping().await {
            Ok(()) => HealthStatus::Healthy,
            Err(err) => {
                tracing::warn!(error = %err, "Database health probe failed");
                HealthStatus::Unhealthy(err.to_string())
            }
        };
        ComponentHealth::new("database", status)
    }
}

#[derive(Serialize)]
struct HealthReport {
    status: &'static str,
    service: &'static str,
    database: ComponentHealth,
}

pub async fn health_handler(database: web::Data<dyn HealthCheckable>) -> HttpResponse {
    let database = database.check_health().await;
    let healthy = database.status.is_healthy();

    let report = HealthReport {
        status: if healthy { "healthy" } else { "unhealthy" },
        service: "medorder",
        database,
    };

    if healthy {
        HttpResponse::Ok().json(report)
    } else {
        HttpResponse::ServiceUnavailable().json(report)
    }
}
