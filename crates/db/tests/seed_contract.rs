use abmdesk_core::domain::request::DiscountRequest;
use abmdesk_core::review::{ActionSet, ADMIN_APPROVAL_REASON};
use abmdesk_core::week::YearWeek;
use abmdesk_db::repositories::{
    DiscountRequestRepository, ReporteeRepository, ReviewerRepository,
    SqlDiscountRequestRepository, SqlReporteeRepository, SqlReviewerRepository,
};
use abmdesk_db::{connect_with_settings, migrations, DemoDataset, DbPool};
use chrono::{TimeZone, Utc};

type SeedContractTestResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

async fn seeded_pool() -> SeedContractTestResult<DbPool> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30)
        .await
        .map_err(|err| format!("connect: {err}"))?;
    migrations::run_pending(&pool).await.map_err(|err| format!("migrate: {err}"))?;
    let now = Utc
        .with_ymd_and_hms(2026, 10, 15, 12, 0, 0)
        .single()
        .ok_or_else(|| "invalid seed time".to_string())?;
    DemoDataset::load(&pool, now, YearWeek { year: 2026, week: 42 })
        .await
        .map_err(|err| format!("seed: {err}"))?;
    Ok(pool)
}

async fn requests_for(pool: &DbPool, reviewer: &str) -> SeedContractTestResult<Vec<DiscountRequest>> {
    SqlDiscountRequestRepository::new(pool.clone())
        .list_for_reviewer(reviewer)
        .await
        .map_err(|err| format!("list: {err}"))
}

#[tokio::test]
async fn demo_data_covers_every_row_control_shape() -> SeedContractTestResult {
    let pool = seeded_pool().await?;
    let requests = requests_for(&pool, "abm.meera").await?;

    let open_eligible = requests
        .iter()
        .filter(|r| r.permitted_actions() == ActionSet::ELIGIBLE)
        .count();
    let escalatable = requests
        .iter()
        .filter(|r| r.permitted_actions() == ActionSet::ADMIN_ESCALATION)
        .count();
    let locked_non_eligible = requests
        .iter()
        .filter(|r| !r.eligible && !r.is_terminal() && r.permitted_actions().is_empty())
        .count();
    let terminal = requests.iter().filter(|r| r.is_terminal()).count();

    require!(open_eligible >= 2, "need open eligible rows, got {open_eligible}");
    require!(escalatable >= 1, "need an admin-approval row, got {escalatable}");
    require!(locked_non_eligible >= 1, "need a non-actionable row, got {locked_non_eligible}");
    require!(terminal >= 1, "need a reviewed row, got {terminal}");
    Ok(())
}

#[tokio::test]
async fn demo_requests_are_newest_first_and_scoped_to_reviewer() -> SeedContractTestResult {
    let pool = seeded_pool().await?;
    let requests = requests_for(&pool, "abm.meera").await?;

    require!(
        requests.windows(2).all(|pair| pair[0].created_at >= pair[1].created_at),
        "requests must be ordered newest first"
    );
    require!(
        requests.iter().all(|r| r.abm_user_name == "abm.meera"),
        "requests must belong to the signed-in reviewer"
    );
    require!(
        requests
            .iter()
            .filter(|r| r.eligibility_reason.as_deref() == Some(ADMIN_APPROVAL_REASON))
            .all(|r| !r.eligible),
        "admin-approval reason only appears on non-eligible rows"
    );
    Ok(())
}

#[tokio::test]
async fn demo_reviewers_and_reportees_are_queryable() -> SeedContractTestResult {
    let pool = seeded_pool().await?;

    let reviewers = SqlReviewerRepository::new(pool.clone());
    require!(
        reviewers.exists("abm.meera").await.map_err(|err| err.to_string())?,
        "abm.meera should be a reviewer"
    );
    require!(
        !reviewers.exists("se.arjun").await.map_err(|err| err.to_string())?,
        "sales executives are not reviewers"
    );

    let reportees = SqlReporteeRepository::new(pool.clone())
        .list_for_reviewer("abm.meera")
        .await
        .map_err(|err| err.to_string())?;
    let names: Vec<&str> = reportees.iter().map(|r| r.se_user_name.as_str()).collect();
    require!(names == ["se.arjun", "se.kiran", "se.priya"], "unexpected reportees {names:?}");
    Ok(())
}
