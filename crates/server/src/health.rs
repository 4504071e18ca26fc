//! `GET /health`: the service is up, and says whether the store can serve the dashboard.

use abmdesk_db::migrations::MIGRATOR;
use abmdesk_db::DbPool;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    Degraded,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub readiness: Readiness,
    pub detail: String,
}

impl ProbeReport {
    fn ready(detail: impl Into<String>) -> Self {
        Self { readiness: Readiness::Ready, detail: detail.into() }
    }

    fn degraded(detail: impl Into<String>) -> Self {
        Self { readiness: Readiness::Degraded, detail: detail.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub database: ProbeReport,
    pub schema: ProbeReport,
    pub checked_at: String,
}

impl HealthResponse {
    fn is_ready(&self) -> bool {
        self.database.readiness == Readiness::Ready && self.schema.readiness == Readiness::Ready
    }
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(db_pool)
}

pub async fn health(State(pool): State<DbPool>) -> (StatusCode, Json<HealthResponse>) {
    let database = probe_database(&pool).await;
    let schema = match database.readiness {
        Readiness::Ready => probe_schema(&pool).await,
        Readiness::Degraded => ProbeReport::degraded("skipped: database unreachable"),
    };

    let mut response = HealthResponse {
        status: "ok",
        message: "Backend server is running",
        database,
        schema,
        checked_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    if response.is_ready() {
        return (StatusCode::OK, Json(response));
    }

    response.status = "degraded";
    tracing::warn!(
        event_name = "system.health.degraded",
        database = %response.database.detail,
        schema = %response.schema.detail,
        "health probe reported degraded store"
    );
    (StatusCode::SERVICE_UNAVAILABLE, Json(response))
}

async fn probe_database(pool: &DbPool) -> ProbeReport {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => ProbeReport::ready("reachable"),
        Err(error) => ProbeReport::degraded(format!("query failed: {error}")),
    }
}

/// Ready once every embedded migration has been applied successfully.
async fn probe_schema(pool: &DbPool) -> ProbeReport {
    let expected =
        MIGRATOR.iter().filter(|migration| migration.migration_type.is_up_migration()).count();
    let applied =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await;

    match applied {
        Ok(applied) if applied as usize >= expected => {
            ProbeReport::ready(format!("{applied} of {expected} migrations applied"))
        }
        Ok(applied) => ProbeReport::degraded(format!(
            "{applied} of {expected} migrations applied; run `abmdesk migrate`"
        )),
        Err(_) => ProbeReport::degraded("schema not initialized; run `abmdesk migrate`"),
    }
}
