use async_trait::async_trait;
use thiserror::Error;

use abmdesk_core::domain::budget::BudgetFigures;
use abmdesk_core::domain::reportee::Reportee;
use abmdesk_core::domain::request::DiscountRequest;
use abmdesk_core::review::UpdatePayload;
use abmdesk_core::week::YearWeek;

pub mod budget;
pub mod discount_request;
pub mod memory;
pub mod reportee;
pub mod reviewer;

pub use budget::SqlBudgetRepository;
pub use discount_request::SqlDiscountRequestRepository;
pub use memory::{
    InMemoryBudgetRepository, InMemoryDiscountRequestRepository, InMemoryReporteeRepository,
    InMemoryReviewerRepository,
};
pub use reportee::SqlReporteeRepository;
pub use reviewer::SqlReviewerRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ReviewerRepository: Send + Sync {
    /// True when an active (not deleted) reviewer has this exact username.
    async fn exists(&self, username: &str) -> Result<bool, RepositoryError>;
    async fn register(&self, id: i64, username: &str) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ReporteeRepository: Send + Sync {
    async fn list_for_reviewer(
        &self,
        abm_user_name: &str,
    ) -> Result<Vec<Reportee>, RepositoryError>;
    async fn save(&self, reportee: Reportee) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait DiscountRequestRepository: Send + Sync {
    /// Newest first.
    async fn list_for_reviewer(
        &self,
        abm_user_name: &str,
    ) -> Result<Vec<DiscountRequest>, RepositoryError>;

    async fn insert(&self, request: DiscountRequest) -> Result<(), RepositoryError>;

    /// Writes the same review fields to every listed id and returns the number of rows touched.
    /// Unknown ids are skipped; an empty id list touches nothing.
    async fn apply_review(&self, payload: &UpdatePayload) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait BudgetRepository: Send + Sync {
    async fn find(
        &self,
        abm_user_name: &str,
        year_week: YearWeek,
    ) -> Result<Option<BudgetFigures>, RepositoryError>;

    async fn save(
        &self,
        abm_user_name: &str,
        year_week: YearWeek,
        figures: BudgetFigures,
    ) -> Result<(), RepositoryError>;
}

pub(crate) fn decode_err(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

pub(crate) fn parse_timestamp(
    column: &str,
    value: &str,
) -> Result<chrono::DateTime<chrono::Utc>, RepositoryError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|error| RepositoryError::Decode(format!("{column} `{value}`: {error}")))
}

/// Fixed-width UTC text so lexical order in SQL matches time order.
pub(crate) fn format_timestamp(value: chrono::DateTime<chrono::Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
