use sqlx::Row;

use abmdesk_core::domain::reportee::Reportee;

use super::{decode_err, RepositoryError, ReporteeRepository};
use crate::DbPool;

pub struct SqlReporteeRepository {
    pool: DbPool,
}

impl SqlReporteeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_reportee(row: &sqlx::sqlite::SqliteRow) -> Result<Reportee, RepositoryError> {
    Ok(Reportee {
        se_id: row.try_get("se_id").map_err(decode_err)?,
        se_user_name: row.try_get("se_user_name").map_err(decode_err)?,
        abm_id: row.try_get("abm_id").map_err(decode_err)?,
        abm_user_name: row.try_get("abm_user_name").map_err(decode_err)?,
    })
}

#[async_trait::async_trait]
impl ReporteeRepository for SqlReporteeRepository {
    async fn list_for_reviewer(
        &self,
        abm_user_name: &str,
    ) -> Result<Vec<Reportee>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT DISTINCT se_id, se_user_name, abm_id, abm_user_name
             FROM reportee
             WHERE abm_user_name = ?
             ORDER BY se_user_name",
        )
        .bind(abm_user_name)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_reportee).collect()
    }

    async fn save(&self, reportee: Reportee) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO reportee (se_id, se_user_name, abm_id, abm_user_name)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(se_id, abm_id) DO UPDATE SET
                 se_user_name = excluded.se_user_name,
                 abm_user_name = excluded.abm_user_name",
        )
        .bind(reportee.se_id)
        .bind(&reportee.se_user_name)
        .bind(reportee.abm_id)
        .bind(&reportee.abm_user_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use abmdesk_core::domain::reportee::Reportee;

    use super::SqlReporteeRepository;
    use crate::repositories::ReporteeRepository;
    use crate::{connect_with_settings, migrations};

    fn reportee(se_id: i64, se: &str, abm: &str) -> Reportee {
        Reportee {
            se_id,
            se_user_name: se.to_string(),
            abm_id: if abm == "abm.meera" { 3 } else { 4 },
            abm_user_name: abm.to_string(),
        }
    }

    #[tokio::test]
    async fn lists_only_the_reviewers_reportees_sorted_by_name() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = SqlReporteeRepository::new(pool);

        repo.save(reportee(9, "se.kiran", "abm.meera")).await.expect("save");
        repo.save(reportee(7, "se.arjun", "abm.meera")).await.expect("save");
        repo.save(reportee(8, "se.divya", "abm.rahul")).await.expect("save");
        repo.save(reportee(7, "se.arjun", "abm.meera")).await.expect("idempotent save");

        let listed = repo.list_for_reviewer("abm.meera").await.expect("list");
        let names: Vec<&str> = listed.iter().map(|r| r.se_user_name.as_str()).collect();

        assert_eq!(names, vec!["se.arjun", "se.kiran"]);
    }
}
