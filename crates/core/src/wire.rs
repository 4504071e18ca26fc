//! Request and response bodies of the five dashboard endpoints, shared by the
//! local service and the reviewer client. Field names follow the workflow host.

use serde::{Deserialize, Serialize};

use crate::domain::budget::BudgetFigures;
use crate::week::YearWeek;

pub const CHECK_USER_PATH: &str = "/check-abm-user";
pub const REPORTEES_PATH: &str = "/get-reportees";
pub const FETCH_REQUESTS_PATH: &str = "/fetch-requests";
pub const UPDATE_REQUEST_PATH: &str = "/update-discount-request";
pub const BUDGET_PATH: &str = "/get-abm-budget";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckUserQuery {
    pub username: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckUserResponse {
    pub status: CheckStatus,
    pub message: String,
}

impl CheckUserResponse {
    pub fn found() -> Self {
        Self { status: CheckStatus::Success, message: "User found".to_string() }
    }

    pub fn not_found() -> Self {
        Self { status: CheckStatus::Error, message: "User not found".to_string() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: CheckStatus::Error, message: message.into() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporteesBody {
    #[serde(rename = "ABM_UserName")]
    pub abm_user_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequestsBody {
    pub username: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetBody {
    pub abm_username: Option<String>,
    /// `YYYY-WW`; kept as text so a malformed key is reported as a bad request.
    pub year_week: Option<String>,
}

impl BudgetBody {
    pub fn new(abm_username: &str, year_week: YearWeek) -> Self {
        Self { abm_username: Some(abm_username.to_string()), year_week: Some(year_week.to_string()) }
    }
}

/// Shape of `/update-discount-request` replies and of every `{success:false}` failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutcomeResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: Some(message.into()), error: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()), error: None }
    }

    pub fn failed_with_cause(message: impl Into<String>, cause: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()), error: Some(cause.into()) }
    }
}

/// `/get-abm-budget` answers with zero or one row.
pub type BudgetRows = Vec<BudgetFigures>;
