pub mod config;
pub mod domain;
pub mod errors;
pub mod listing;
pub mod review;
pub mod turnaround;
pub mod week;
pub mod wire;

pub use domain::budget::{BudgetFigures, BudgetStanding, BudgetSummary};
pub use domain::reportee::Reportee;
pub use domain::request::{AbmReview, AbmStatus, AdminOverlay, DiscountRequest, RequestId};
pub use domain::session::Session;
pub use errors::{DomainError, ValidationError};
pub use listing::{ActionLocks, Pagination, RequestFilter, RequestListView, SeUserFilter};
pub use review::{
    ActionResult, ActionSet, BulkAction, ModifyTerms, ReviewAction, ReviewDecision, RowControls,
    UpdatePayload,
};
pub use turnaround::Turnaround;
pub use week::{WeekWindow, YearWeek};
