use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use abmdesk_core::domain::budget::BudgetFigures;
use abmdesk_core::domain::reportee::Reportee;
use abmdesk_core::domain::request::{AbmReview, AbmStatus, AdminOverlay, DiscountRequest, RequestId};
use abmdesk_core::review::ADMIN_APPROVAL_REASON;
use abmdesk_core::week::YearWeek;

use crate::connection::DbPool;
use crate::repositories::{
    BudgetRepository, DiscountRequestRepository, RepositoryError, ReporteeRepository,
    ReviewerRepository, SqlBudgetRepository, SqlDiscountRequestRepository, SqlReporteeRepository,
    SqlReviewerRepository,
};

const REVIEWERS: &[(i64, &str)] = &[(3, "abm.meera"), (4, "abm.rahul")];

const REPORTEES: &[(i64, &str, i64, &str)] = &[
    (7, "se.arjun", 3, "abm.meera"),
    (9, "se.kiran", 3, "abm.meera"),
    (11, "se.priya", 3, "abm.meera"),
    (8, "se.divya", 4, "abm.rahul"),
];

/// One demo request. `hours_ago` is relative to the seeding time.
#[derive(Debug, Clone, Copy)]
struct SeedRequest {
    id: i64,
    eligible: bool,
    eligibility_reason: Option<&'static str>,
    customer: &'static str,
    campaign: &'static str,
    order_qty: f64,
    discount_type: &'static str,
    discount_value: Option<f64>,
    se: (i64, &'static str),
    abm: (i64, &'static str),
    hours_ago: i64,
    reviewed: Option<AbmStatus>,
}

const SEED_REQUESTS: &[SeedRequest] = &[
    SeedRequest {
        id: 1001,
        eligible: true,
        eligibility_reason: None,
        customer: "ABC Manufacturing",
        campaign: "Volume Discount",
        order_qty: 500.0,
        discount_type: "Re 1 per kg",
        discount_value: Some(1.0),
        se: (7, "se.arjun"),
        abm: (3, "abm.meera"),
        hours_ago: 2,
        reviewed: None,
    },
    SeedRequest {
        id: 1002,
        eligible: false,
        eligibility_reason: Some(ADMIN_APPROVAL_REASON),
        customer: "Sunrise Agro Foods",
        campaign: "New Customer",
        order_qty: 1200.0,
        discount_type: "Custom",
        discount_value: Some(1.5),
        se: (9, "se.kiran"),
        abm: (3, "abm.meera"),
        hours_ago: 5,
        reviewed: None,
    },
    SeedRequest {
        id: 1003,
        eligible: false,
        eligibility_reason: Some("Customer credit on hold"),
        customer: "Delta Polymers",
        campaign: "Volume Discount",
        order_qty: 300.0,
        discount_type: "Rs 0.75 per kg",
        discount_value: Some(0.75),
        se: (7, "se.arjun"),
        abm: (3, "abm.meera"),
        hours_ago: 9,
        reviewed: None,
    },
    SeedRequest {
        id: 1004,
        eligible: true,
        eligibility_reason: None,
        customer: "Krishna Textiles",
        campaign: "Festive Offer",
        order_qty: 750.0,
        discount_type: "Rs 0.75 per kg",
        discount_value: Some(0.75),
        se: (11, "se.priya"),
        abm: (3, "abm.meera"),
        hours_ago: 26,
        reviewed: Some(AbmStatus::Accepted),
    },
    SeedRequest {
        id: 1005,
        eligible: true,
        eligibility_reason: None,
        customer: "Metro Packaging",
        campaign: "Volume Discount",
        order_qty: 2000.0,
        discount_type: "Re 1 per kg",
        discount_value: Some(1.0),
        se: (9, "se.kiran"),
        abm: (3, "abm.meera"),
        hours_ago: 30,
        reviewed: None,
    },
    SeedRequest {
        id: 1006,
        eligible: false,
        eligibility_reason: Some(ADMIN_APPROVAL_REASON),
        customer: "Coastal Chemicals",
        campaign: "Retention",
        order_qty: 950.0,
        discount_type: "Custom",
        discount_value: Some(2.0),
        se: (11, "se.priya"),
        abm: (3, "abm.meera"),
        hours_ago: 49,
        reviewed: Some(AbmStatus::Escalated),
    },
    SeedRequest {
        id: 1007,
        eligible: true,
        eligibility_reason: None,
        customer: "Green Valley Dairy",
        campaign: "New Customer",
        order_qty: 420.0,
        discount_type: "Re 1 per kg",
        discount_value: Some(1.0),
        se: (7, "se.arjun"),
        abm: (3, "abm.meera"),
        hours_ago: 52,
        reviewed: None,
    },
    SeedRequest {
        id: 1008,
        eligible: true,
        eligibility_reason: None,
        customer: "Northern Steelworks",
        campaign: "Volume Discount",
        order_qty: 5000.0,
        discount_type: "Custom",
        discount_value: Some(1.25),
        se: (8, "se.divya"),
        abm: (4, "abm.rahul"),
        hours_ago: 4,
        reviewed: None,
    },
];

/// Deterministic demo data: two reviewers, their reportees, a mix of open and
/// reviewed requests, and a budget row for the seeding week.
pub struct DemoDataset;

impl DemoDataset {
    pub async fn load(
        pool: &DbPool,
        now: DateTime<Utc>,
        year_week: YearWeek,
    ) -> Result<SeedResult, RepositoryError> {
        Self::clean(pool).await?;

        let reviewers = SqlReviewerRepository::new(pool.clone());
        for (id, username) in REVIEWERS {
            reviewers.register(*id, username).await?;
        }

        let reportees = SqlReporteeRepository::new(pool.clone());
        for (se_id, se_user_name, abm_id, abm_user_name) in REPORTEES {
            reportees
                .save(Reportee {
                    se_id: *se_id,
                    se_user_name: se_user_name.to_string(),
                    abm_id: *abm_id,
                    abm_user_name: abm_user_name.to_string(),
                })
                .await?;
        }

        let requests = SqlDiscountRequestRepository::new(pool.clone());
        for seed in SEED_REQUESTS {
            requests.insert(seed.build(now)).await?;
        }

        let budgets = SqlBudgetRepository::new(pool.clone());
        budgets
            .save(
                "abm.meera",
                year_week,
                BudgetFigures::new(Decimal::new(100_000, 0), Decimal::new(42_500, 0)),
            )
            .await?;
        budgets
            .save(
                "abm.rahul",
                year_week,
                BudgetFigures::new(Decimal::new(1_000, 0), Decimal::new(1_200, 0)),
            )
            .await?;

        Ok(SeedResult {
            reviewers: REVIEWERS.iter().map(|(_, name)| *name).collect(),
            requests_seeded: SEED_REQUESTS.len(),
            year_week,
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let reviewers = SqlReviewerRepository::new(pool.clone());
        for (_, username) in REVIEWERS {
            checks.push((*username, reviewers.exists(username).await?));
        }

        let ids = sql_id_list(SEED_REQUESTS.iter().map(|seed| seed.id));
        let request_count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(1) FROM discount_request WHERE request_id IN {ids}"))
                .fetch_one(pool)
                .await?;
        checks.push(("discount-requests", request_count == SEED_REQUESTS.len() as i64));

        let reportee_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(1) FROM reportee WHERE abm_user_name IN ('abm.meera', 'abm.rahul')",
        )
        .fetch_one(pool)
        .await?;
        checks.push(("reportees", reportee_count == REPORTEES.len() as i64));

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }

    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        let ids = sql_id_list(SEED_REQUESTS.iter().map(|seed| seed.id));
        sqlx::query(&format!("DELETE FROM discount_request WHERE request_id IN {ids}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM reportee WHERE abm_user_name IN ('abm.meera', 'abm.rahul')")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM abm_budget WHERE abm_user_name IN ('abm.meera', 'abm.rahul')")
            .execute(&mut *tx)
            .await?;
        let reviewer_ids = sql_id_list(REVIEWERS.iter().map(|(id, _)| *id));
        sqlx::query(&format!("DELETE FROM abm_user WHERE id IN {reviewer_ids}"))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

impl SeedRequest {
    fn build(&self, now: DateTime<Utc>) -> DiscountRequest {
        let created_at = now - Duration::hours(self.hours_ago);
        let review = match self.reviewed {
            Some(status) => AbmReview {
                abm_status: Some(status),
                abm_remarks: (status == AbmStatus::Escalated)
                    .then(|| "Strategic account, needs admin sign-off".to_string()),
                abm_reviewed_at: Some(created_at + Duration::minutes(95)),
                ..AbmReview::default()
            },
            None => AbmReview::default(),
        };
        let admin = match self.reviewed {
            Some(AbmStatus::Escalated) => AdminOverlay {
                status: Some("PENDING_ADMIN".to_string()),
                ..AdminOverlay::default()
            },
            _ => AdminOverlay::default(),
        };

        DiscountRequest {
            request_id: RequestId(self.id),
            eligible: self.eligible,
            eligibility_reason: self.eligibility_reason.map(str::to_string),
            customer_id: 40_000 + self.id,
            customer_name: self.customer.to_string(),
            customer_contact: format!("98765{:05}", self.id),
            campaign_type: self.campaign.to_string(),
            sku_id: Some(501),
            sku_name: Some("Premium Widget A".to_string()),
            order_qty: self.order_qty,
            discount_value: self.discount_value,
            discount_type: self.discount_type.to_string(),
            reason: Some("Competitive pricing pressure".to_string()),
            requested_by: self.se.0,
            requested_by_user_name: self.se.1.to_string(),
            requested_by_contact: format!("91234{:05}", self.se.0),
            abm_id: self.abm.0,
            abm_user_name: self.abm.1.to_string(),
            created_at,
            review,
            admin,
        }
    }
}

fn sql_id_list(ids: impl Iterator<Item = i64>) -> String {
    let joined = ids.map(|id| id.to_string()).collect::<Vec<_>>().join(",");
    format!("({joined})")
}

#[derive(Debug)]
pub struct SeedResult {
    pub reviewers: Vec<&'static str>,
    pub requests_seeded: usize,
    pub year_week: YearWeek,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
