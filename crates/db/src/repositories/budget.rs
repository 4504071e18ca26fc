use rust_decimal::Decimal;
use sqlx::Row;

use abmdesk_core::domain::budget::{self, BudgetFigures};
use abmdesk_core::week::YearWeek;

use super::{decode_err, BudgetRepository, RepositoryError};
use crate::DbPool;

pub struct SqlBudgetRepository {
    pool: DbPool,
}

impl SqlBudgetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Unparsable or missing amounts read as zero.
fn parse_amount(value: Option<String>) -> Decimal {
    value.as_deref().map_or(Decimal::ZERO, budget::parse_amount)
}

#[async_trait::async_trait]
impl BudgetRepository for SqlBudgetRepository {
    async fn find(
        &self,
        abm_user_name: &str,
        year_week: YearWeek,
    ) -> Result<Option<BudgetFigures>, RepositoryError> {
        let row = sqlx::query(
            "SELECT allocated_budget, consumed_budget
             FROM abm_budget
             WHERE abm_user_name = ? AND year_week = ?",
        )
        .bind(abm_user_name)
        .bind(year_week.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let allocated: Option<String> = row.try_get("allocated_budget").map_err(decode_err)?;
        let consumed: Option<String> = row.try_get("consumed_budget").map_err(decode_err)?;
        Ok(Some(BudgetFigures::new(parse_amount(allocated), parse_amount(consumed))))
    }

    async fn save(
        &self,
        abm_user_name: &str,
        year_week: YearWeek,
        figures: BudgetFigures,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO abm_budget (abm_user_name, year_week, allocated_budget, consumed_budget)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(abm_user_name, year_week) DO UPDATE SET
                 allocated_budget = excluded.allocated_budget,
                 consumed_budget = excluded.consumed_budget",
        )
        .bind(abm_user_name)
        .bind(year_week.to_string())
        .bind(figures.allocated_budget.to_string())
        .bind(figures.consumed_budget.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
