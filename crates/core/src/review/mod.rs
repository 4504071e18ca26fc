//! Reviewer decisions on discount requests.
//!
//! A request is open until the reviewing manager records one of four
//! decisions, after which it is terminal. Which decisions are on offer
//! depends only on eligibility, the eligibility reason, and whether a
//! decision already exists.

pub mod controls;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::request::{AbmStatus, DiscountRequest, RequestId};
use crate::errors::ValidationError;
use crate::turnaround::Turnaround;

pub use controls::{row_controls, ButtonState, RowControls};

/// Eligibility reason under which a non-eligible request may still be escalated.
pub const ADMIN_APPROVAL_REASON: &str = "Requires Admin Approval";

pub const MAX_REMARKS_CHARS: usize = 200;

pub const CUSTOM_DISCOUNT_TYPE: &str = "Custom";

pub const DISCOUNT_TYPES: [&str; 3] = ["Re 1 per kg", "Rs 0.75 per kg", CUSTOM_DISCOUNT_TYPE];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Accept,
    Reject,
    Modify,
    Escalate,
}

impl ReviewAction {
    pub fn status(self) -> AbmStatus {
        match self {
            Self::Accept => AbmStatus::Accepted,
            Self::Reject => AbmStatus::Rejected,
            Self::Modify => AbmStatus::Modified,
            Self::Escalate => AbmStatus::Escalated,
        }
    }

    pub fn from_status(status: AbmStatus) -> Self {
        match status {
            AbmStatus::Accepted => Self::Accept,
            AbmStatus::Rejected => Self::Reject,
            AbmStatus::Modified => Self::Modify,
            AbmStatus::Escalated => Self::Escalate,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Accept => "Accept",
            Self::Reject => "Reject",
            Self::Modify => "Modify",
            Self::Escalate => "Escalate",
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionSet(&'static [ReviewAction]);

impl ActionSet {
    pub const NONE: Self = Self(&[]);
    pub const ELIGIBLE: Self =
        Self(&[ReviewAction::Accept, ReviewAction::Reject, ReviewAction::Modify]);
    pub const ADMIN_ESCALATION: Self =
        Self(&[ReviewAction::Escalate, ReviewAction::Reject, ReviewAction::Modify]);

    pub fn contains(&self, action: ReviewAction) -> bool {
        self.0.contains(&action)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn actions(&self) -> &'static [ReviewAction] {
        self.0
    }
}

pub fn permitted_actions(
    eligible: bool,
    eligibility_reason: Option<&str>,
    status: Option<AbmStatus>,
) -> ActionSet {
    if status.is_some() {
        return ActionSet::NONE;
    }
    if eligible {
        return ActionSet::ELIGIBLE;
    }
    match eligibility_reason {
        Some(ADMIN_APPROVAL_REASON) => ActionSet::ADMIN_ESCALATION,
        _ => ActionSet::NONE,
    }
}

/// Buttons a row shows, enabled or not. Non-eligible rows trade Accept for Escalate.
pub fn displayed_actions(eligible: bool) -> [ReviewAction; 3] {
    if eligible {
        [ReviewAction::Accept, ReviewAction::Reject, ReviewAction::Modify]
    } else {
        [ReviewAction::Escalate, ReviewAction::Reject, ReviewAction::Modify]
    }
}

/// Reviewer overrides captured by the modify form. Unset fields go out as null.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyTerms {
    #[serde(rename = "orderKg")]
    pub order_qty: Option<f64>,
    pub discount_type: Option<String>,
    pub discount_value: Option<f64>,
}

impl ModifyTerms {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.order_qty.is_none() && self.discount_type.is_none() && self.discount_value.is_none()
        {
            return Err(ValidationError::EmptyModification);
        }

        match self.discount_type.as_deref() {
            Some(kind) if !DISCOUNT_TYPES.contains(&kind) => {
                Err(ValidationError::UnsupportedDiscountType(kind.to_string()))
            }
            Some(CUSTOM_DISCOUNT_TYPE) if self.discount_value.is_none() => {
                Err(ValidationError::CustomDiscountValueRequired)
            }
            Some(CUSTOM_DISCOUNT_TYPE) => Ok(()),
            _ if self.discount_value.is_some() => {
                Err(ValidationError::DiscountValueRequiresCustomType)
            }
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReviewDecision {
    Accept,
    Reject { remarks: Option<String> },
    Modify(ModifyTerms),
    Escalate { remarks: String },
}

impl ReviewDecision {
    pub fn action(&self) -> ReviewAction {
        match self {
            Self::Accept => ReviewAction::Accept,
            Self::Reject { .. } => ReviewAction::Reject,
            Self::Modify(_) => ReviewAction::Modify,
            Self::Escalate { .. } => ReviewAction::Escalate,
        }
    }

    pub fn status(&self) -> AbmStatus {
        self.action().status()
    }

    /// Checks the decision against the row before anything is sent.
    pub fn validate_for(&self, request: &DiscountRequest) -> Result<(), ValidationError> {
        if request.is_terminal() {
            return Err(ValidationError::AlreadyReviewed { request_id: request.request_id });
        }
        if !request.permitted_actions().contains(self.action()) {
            return Err(ValidationError::ActionNotPermitted {
                request_id: request.request_id,
                action: self.action(),
            });
        }

        match self {
            Self::Accept => Ok(()),
            Self::Modify(terms) => terms.validate(),
            Self::Reject { remarks } => match remarks {
                Some(remarks) => check_remarks_length(remarks),
                None => Ok(()),
            },
            Self::Escalate { remarks } => {
                if remarks.trim().is_empty() {
                    return Err(ValidationError::MissingRemarks);
                }
                check_remarks_length(remarks)
            }
        }
    }

    fn remarks(&self) -> Option<String> {
        match self {
            Self::Reject { remarks } => {
                remarks.as_deref().map(str::trim).filter(|r| !r.is_empty()).map(str::to_string)
            }
            Self::Escalate { remarks } => Some(remarks.trim().to_string()),
            Self::Accept | Self::Modify(_) => None,
        }
    }
}

fn check_remarks_length(remarks: &str) -> Result<(), ValidationError> {
    if remarks.trim().chars().count() > MAX_REMARKS_CHARS {
        return Err(ValidationError::RemarksTooLong { max: MAX_REMARKS_CHARS });
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Accept,
    Reject,
}

impl BulkAction {
    pub fn action(self) -> ReviewAction {
        match self {
            Self::Accept => ReviewAction::Accept,
            Self::Reject => ReviewAction::Reject,
        }
    }

    /// Bulk accept is limited to eligible rows; bulk reject only needs an open row.
    pub fn admits(self, request: &DiscountRequest) -> bool {
        if request.is_terminal() {
            return false;
        }
        match self {
            Self::Accept => request.eligible,
            Self::Reject => true,
        }
    }
}

/// Body of `POST /update-discount-request`. Every field is always present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    pub ids: Vec<RequestId>,
    pub abm_status: AbmStatus,
    pub abm_order_qty: Option<f64>,
    pub abm_discount_type: Option<String>,
    pub abm_discount_value: Option<f64>,
    pub abm_remarks: Option<String>,
    pub abm_reviewed_by: String,
    pub abm_reviewed_at: DateTime<Utc>,
}

impl UpdatePayload {
    pub fn for_decision(
        request_id: RequestId,
        decision: &ReviewDecision,
        reviewer: &str,
        reviewed_at: DateTime<Utc>,
    ) -> Self {
        let terms = match decision {
            ReviewDecision::Modify(terms) => terms.clone(),
            _ => ModifyTerms::default(),
        };

        Self {
            ids: vec![request_id],
            abm_status: decision.status(),
            abm_order_qty: terms.order_qty,
            abm_discount_type: terms.discount_type,
            abm_discount_value: terms.discount_value,
            abm_remarks: decision.remarks(),
            abm_reviewed_by: reviewer.to_string(),
            abm_reviewed_at: reviewed_at,
        }
    }

    pub fn for_bulk(
        ids: Vec<RequestId>,
        action: BulkAction,
        reviewer: &str,
        reviewed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            ids,
            abm_status: action.action().status(),
            abm_order_qty: None,
            abm_discount_type: None,
            abm_discount_value: None,
            abm_remarks: None,
            abm_reviewed_by: reviewer.to_string(),
            abm_reviewed_at: reviewed_at,
        }
    }
}

/// A decision known to be recorded, either just submitted or read back from the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub request_id: RequestId,
    pub action: ReviewAction,
    pub timestamp: DateTime<Utc>,
    pub tat: Option<Turnaround>,
}

impl ActionResult {
    pub fn recorded(request: &DiscountRequest, action: ReviewAction, at: DateTime<Utc>) -> Self {
        Self {
            request_id: request.request_id,
            action,
            timestamp: at,
            tat: Some(Turnaround::between(request.created_at, at)),
        }
    }

    pub fn from_store(request: &DiscountRequest) -> Option<Self> {
        let status = request.review.abm_status?;
        let action = ReviewAction::from_status(status);
        Some(match request.review.abm_reviewed_at {
            Some(reviewed_at) => Self::recorded(request, action, reviewed_at),
            None => Self {
                request_id: request.request_id,
                action,
                timestamp: request.created_at,
                tat: None,
            },
        })
    }

    pub fn badge(&self) -> &'static str {
        self.action.status().label()
    }
}
