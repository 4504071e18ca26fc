use super::{ReviewerRepository, RepositoryError};
use crate::DbPool;

pub struct SqlReviewerRepository {
    pool: DbPool,
}

impl SqlReviewerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ReviewerRepository for SqlReviewerRepository {
    async fn exists(&self, username: &str) -> Result<bool, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM abm_user WHERE username = ? AND deleted = 0")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn register(&self, id: i64, username: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO abm_user (id, username, deleted) VALUES (?, ?, 0)
             ON CONFLICT(id) DO UPDATE SET username = excluded.username, deleted = 0",
        )
        .bind(id)
        .bind(username)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqlReviewerRepository;
    use crate::repositories::ReviewerRepository;
    use crate::{connect_with_settings, migrations};

    async fn repo() -> (SqlReviewerRepository, crate::DbPool) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        (SqlReviewerRepository::new(pool.clone()), pool)
    }

    #[tokio::test]
    async fn registered_reviewer_exists() {
        let (repo, _pool) = repo().await;
        repo.register(3, "abm.meera").await.expect("register");

        assert!(repo.exists("abm.meera").await.expect("exists"));
        assert!(!repo.exists("abm.nobody").await.expect("exists"));
    }

    #[tokio::test]
    async fn deleted_reviewer_does_not_exist() {
        let (repo, pool) = repo().await;
        repo.register(4, "abm.retired").await.expect("register");
        sqlx::query("UPDATE abm_user SET deleted = 1 WHERE id = 4")
            .execute(&pool)
            .await
            .expect("soft delete");

        assert!(!repo.exists("abm.retired").await.expect("exists"));
    }

    #[tokio::test]
    async fn username_match_is_exact() {
        let (repo, _pool) = repo().await;
        repo.register(5, "abm.meera").await.expect("register");

        assert!(!repo.exists("ABM.MEERA").await.expect("exists"));
        assert!(!repo.exists(" abm.meera").await.expect("exists"));
    }
}
