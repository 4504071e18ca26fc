use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::review::{permitted_actions, ActionSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub i64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reviewer decision recorded on a request. A request without one is still open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbmStatus {
    Accepted,
    Rejected,
    Modified,
    Escalated,
}

impl AbmStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Modified => "MODIFIED",
            Self::Escalated => "ESCALATED",
        }
    }

    /// Badge text shown once the decision is recorded.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
            Self::Modified => "Modified",
            Self::Escalated => "Escalated",
        }
    }
}

impl fmt::Display for AbmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AbmStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            "MODIFIED" => Ok(Self::Modified),
            "ESCALATED" => Ok(Self::Escalated),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Fields written by the reviewing manager. All empty until the first decision.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbmReview {
    pub abm_status: Option<AbmStatus>,
    pub abm_order_qty: Option<f64>,
    pub abm_discount_value: Option<f64>,
    pub abm_discount_type: Option<String>,
    pub abm_remarks: Option<String>,
    pub abm_reviewed_at: Option<DateTime<Utc>>,
}

/// Second approval stage owned by another system; read-only here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverlay {
    pub status: Option<String>,
    pub admin_status: Option<String>,
    pub admin_remarks: Option<String>,
    pub admin_discount_value: Option<f64>,
    pub admin_discount_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRequest {
    pub request_id: RequestId,
    #[serde(with = "eligible_flag")]
    pub eligible: bool,
    pub eligibility_reason: Option<String>,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_contact: String,
    pub campaign_type: String,
    pub sku_id: Option<i64>,
    pub sku_name: Option<String>,
    pub order_qty: f64,
    pub discount_value: Option<f64>,
    pub discount_type: String,
    pub reason: Option<String>,
    pub requested_by: i64,
    pub requested_by_user_name: String,
    pub requested_by_contact: String,
    #[serde(rename = "ABM_Id")]
    pub abm_id: i64,
    #[serde(rename = "ABM_UserName")]
    pub abm_user_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub review: AbmReview,
    #[serde(flatten)]
    pub admin: AdminOverlay,
}

impl DiscountRequest {
    /// A reviewed request accepts no further action from this system.
    pub fn is_terminal(&self) -> bool {
        self.review.abm_status.is_some()
    }

    pub fn permitted_actions(&self) -> ActionSet {
        permitted_actions(self.eligible, self.eligibility_reason.as_deref(), self.review.abm_status)
    }
}

/// The store keeps eligibility as a 0/1 column and the wire format mirrors it.
mod eligible_flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Flag {
            Int(i64),
            Bool(bool),
        }

        match Flag::deserialize(deserializer)? {
            Flag::Int(0) | Flag::Bool(false) => Ok(false),
            Flag::Int(1) | Flag::Bool(true) => Ok(true),
            Flag::Int(other) => {
                Err(de::Error::custom(format!("eligible must be 0 or 1, got {other}")))
            }
        }
    }
}
