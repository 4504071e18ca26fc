use abmdesk_core::config::{AppConfig, ConfigError};
use abmdesk_db::{connect_from_config, migrations, DbPool};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    config.validate()?;
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_from_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    Ok(Application { config, db_pool })
}

#[cfg(test)]
mod tests {
    use abmdesk_core::config::{ApiTarget, AppConfig};

    use crate::bootstrap::bootstrap_with_config;

    fn config(database_url: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = database_url.to_string();
        config.database.max_connections = 1;
        config
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_when_workflow_target_has_no_url() {
        let mut config = config("sqlite::memory:");
        config.api.target = ApiTarget::Workflow;

        let result = bootstrap_with_config(config).await;

        let message = result.err().expect("error").to_string();
        assert!(message.contains("api.workflow_base_url"));
    }

    #[tokio::test]
    async fn bootstrap_applies_review_schema() {
        let app = bootstrap_with_config(config("sqlite::memory:"))
            .await
            .expect("bootstrap should succeed with valid config");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('abm_user', 'reportee', 'discount_request', 'abm_budget')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("expected review tables to be available after bootstrap");
        assert_eq!(table_count, 4);

        app.db_pool.close().await;
    }
}
