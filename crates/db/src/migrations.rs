use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sqlx::Row;

    use super::{run_pending, MIGRATOR};
    use crate::{connect_with_settings, DbPool};

    const REVIEW_TABLES: [&str; 4] = ["abm_user", "reportee", "discount_request", "abm_budget"];

    async fn migrated_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");
        pool
    }

    /// Review tables and indexes by name, with their DDL. Internal tables are skipped.
    async fn review_schema(pool: &DbPool) -> BTreeMap<String, String> {
        sqlx::query(
            "SELECT name, IFNULL(sql, '') AS ddl FROM sqlite_master
             WHERE type IN ('table', 'index')
               AND name NOT LIKE 'sqlite_%'
               AND name <> '_sqlx_migrations'",
        )
        .fetch_all(pool)
        .await
        .expect("read sqlite_master")
        .into_iter()
        .map(|row| (row.get::<String, _>("name"), row.get::<String, _>("ddl")))
        .collect()
    }

    #[tokio::test]
    async fn migrations_create_review_tables() {
        let pool = migrated_pool().await;
        let schema = review_schema(&pool).await;

        for table in REVIEW_TABLES {
            assert!(schema.contains_key(table), "table {table} should exist");
        }
        for index in [
            "idx_reportee_abm_user_name",
            "idx_discount_request_abm_user_name",
            "idx_discount_request_created_at",
        ] {
            assert!(schema.contains_key(index), "index {index} should exist");
        }
    }

    #[tokio::test]
    async fn status_column_rejects_unknown_values() {
        let pool = migrated_pool().await;

        let result = sqlx::query(
            "INSERT INTO discount_request (
                eligible, customer_id, customer_name, customer_contact, campaign_type,
                order_qty, discount_type, requested_by, requested_by_user_name,
                requested_by_contact, abm_id, abm_user_name, created_at, abm_status
             ) VALUES (1, 1, 'c', '0', 'Volume', 10, 'Custom', 1, 'se', '0', 1, 'abm',
                       '2026-10-12T09:00:00Z', 'Approve')",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err(), "CHECK constraint should reject legacy status vocabulary");
    }

    #[tokio::test]
    async fn undo_drops_review_schema_and_rerun_restores_it() {
        let pool = migrated_pool().await;
        let migrated = review_schema(&pool).await;

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");
        assert_eq!(review_schema(&pool).await, BTreeMap::new());

        run_pending(&pool).await.expect("re-run migrations");
        assert_eq!(review_schema(&pool).await, migrated);
    }
}
