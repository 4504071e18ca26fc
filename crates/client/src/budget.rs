use std::sync::Arc;

use tracing::info;

use abmdesk_core::domain::budget::BudgetSummary;
use abmdesk_core::domain::session::Session;
use abmdesk_core::week::WeekWindow;

use crate::errors::ClientError;
use crate::gateway::DashboardApi;

/// Weekly budget panel. A week with no row reads as zero allocated and zero consumed.
pub struct BudgetService {
    api: Arc<dyn DashboardApi>,
}

impl BudgetService {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self { api }
    }

    pub async fn summary(
        &self,
        session: &Session,
        window: WeekWindow,
    ) -> Result<BudgetSummary, ClientError> {
        let year_week = window.year_week();
        let figures = self.api.fetch_budget(session.username(), year_week).await?;
        if figures.is_none() {
            info!(
                event_name = "budget.week.missing",
                reviewer = session.username(),
                year_week = %year_week,
                "no budget row for week"
            );
        }
        Ok(BudgetSummary::new(window, figures.unwrap_or_default()))
    }

    pub async fn current(&self, session: &Session) -> Result<BudgetSummary, ClientError> {
        self.summary(session, WeekWindow::current()).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use abmdesk_core::domain::budget::{BudgetFigures, BudgetStanding};
    use abmdesk_core::domain::session::Session;
    use abmdesk_core::week::{WeekWindow, YearWeek};

    use super::BudgetService;
    use crate::testing::{created_at, ScriptedApi};

    fn window() -> WeekWindow {
        let wednesday = NaiveDate::from_ymd_opt(2026, 10, 14)
            .and_then(|date| date.and_hms_opt(11, 0, 0))
            .expect("valid date");
        WeekWindow::containing(wednesday)
    }

    fn session(name: &str) -> Session {
        Session::new(name, created_at()).expect("session")
    }

    #[tokio::test]
    async fn over_budget_week_reports_negative_balance() {
        let week = YearWeek { year: 2026, week: 42 };
        let api = Arc::new(ScriptedApi {
            budget: Some((week, BudgetFigures::new(Decimal::from(1000), Decimal::from(1200)))),
            ..ScriptedApi::default()
        });

        let summary =
            BudgetService::new(api.clone()).summary(&session("abm.rahul"), window()).await.expect("budget");

        assert_eq!(summary.balance, Decimal::from(-200));
        assert_eq!(summary.standing, BudgetStanding::OverBudget);
        let lookups = api.budget_lookups.lock().map(|l| l.clone()).unwrap_or_default();
        assert_eq!(lookups, vec![("abm.rahul".to_string(), week)]);
    }

    #[tokio::test]
    async fn missing_week_reads_as_zero() {
        let api = Arc::new(ScriptedApi::default());

        let summary =
            BudgetService::new(api).summary(&session("abm.meera"), window()).await.expect("budget");

        assert_eq!(summary.figures, BudgetFigures::default());
        assert_eq!(summary.balance, Decimal::ZERO);
        assert_eq!(summary.standing, BudgetStanding::WithinBudget);
    }
}
