use thiserror::Error;

use crate::domain::request::RequestId;
use crate::review::ReviewAction;

/// Input problems caught before anything is sent over the network.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("username is required")]
    MissingUsername,
    #[error("request {request_id} has already been reviewed")]
    AlreadyReviewed { request_id: RequestId },
    #[error("{action} is not permitted for request {request_id}")]
    ActionNotPermitted { request_id: RequestId, action: ReviewAction },
    #[error("at least one of order quantity, discount type or discount value must be provided")]
    EmptyModification,
    #[error("unsupported discount type `{0}`")]
    UnsupportedDiscountType(String),
    #[error("discount value is required when the discount type is `Custom`")]
    CustomDiscountValueRequired,
    #[error("discount value can only be set together with the `Custom` discount type")]
    DiscountValueRequiresCustomType,
    #[error("remarks are required to escalate a request")]
    MissingRemarks,
    #[error("remarks must be at most {max} characters")]
    RemarksTooLong { max: usize },
    #[error("no selected request qualifies for bulk {action}")]
    EmptySelection { action: ReviewAction },
    #[error("invalid year-week key `{0}` (expected YYYY-WW)")]
    InvalidYearWeek(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown review status `{0}`")]
    UnknownStatus(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
