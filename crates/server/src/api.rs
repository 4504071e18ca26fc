//! Local stand-in for the workflow host's webhooks.
//!
//! JSON endpoints (nested under `/webhook`):
//! - `GET /check-abm-user?username=`: is the username a registered reviewer
//! - `POST /get-reportees`: sales engineers reporting to a reviewer
//! - `POST /fetch-requests`: a reviewer's requests, newest first
//! - `POST /update-discount-request`: record one decision on one or many requests
//! - `POST /get-abm-budget`: a reviewer's budget row for one week

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use abmdesk_core::domain::reportee::Reportee;
use abmdesk_core::domain::request::DiscountRequest;
use abmdesk_core::review::UpdatePayload;
use abmdesk_core::week::YearWeek;
use abmdesk_core::wire::{
    BudgetBody, BudgetRows, CheckUserQuery, CheckUserResponse, FetchRequestsBody,
    OutcomeResponse, ReporteesBody, BUDGET_PATH, CHECK_USER_PATH, FETCH_REQUESTS_PATH,
    REPORTEES_PATH, UPDATE_REQUEST_PATH,
};
use abmdesk_db::repositories::{
    BudgetRepository, DiscountRequestRepository, RepositoryError, ReporteeRepository,
    ReviewerRepository, SqlBudgetRepository, SqlDiscountRequestRepository,
    SqlReporteeRepository, SqlReviewerRepository,
};
use abmdesk_db::DbPool;

pub const WEBHOOK_PREFIX: &str = "/webhook";

#[derive(Clone)]
pub struct ApiState {
    reviewers: Arc<dyn ReviewerRepository>,
    reportees: Arc<dyn ReporteeRepository>,
    requests: Arc<dyn DiscountRequestRepository>,
    budgets: Arc<dyn BudgetRepository>,
}

impl ApiState {
    pub fn new(
        reviewers: Arc<dyn ReviewerRepository>,
        reportees: Arc<dyn ReporteeRepository>,
        requests: Arc<dyn DiscountRequestRepository>,
        budgets: Arc<dyn BudgetRepository>,
    ) -> Self {
        Self { reviewers, reportees, requests, budgets }
    }

    pub fn from_pool(pool: DbPool) -> Self {
        Self::new(
            Arc::new(SqlReviewerRepository::new(pool.clone())),
            Arc::new(SqlReporteeRepository::new(pool.clone())),
            Arc::new(SqlDiscountRequestRepository::new(pool.clone())),
            Arc::new(SqlBudgetRepository::new(pool)),
        )
    }
}

type Failure<T> = (StatusCode, Json<T>);

pub fn router(state: ApiState) -> Router {
    let webhooks = Router::new()
        .route(CHECK_USER_PATH, get(check_user))
        .route(REPORTEES_PATH, post(fetch_reportees))
        .route(FETCH_REQUESTS_PATH, post(fetch_requests))
        .route(UPDATE_REQUEST_PATH, post(update_request))
        .route(BUDGET_PATH, post(fetch_budget))
        .with_state(state);

    Router::new().nest(WEBHOOK_PREFIX, webhooks)
}

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn bad_request(message: &str) -> Failure<OutcomeResponse> {
    (StatusCode::BAD_REQUEST, Json(OutcomeResponse::failed(message)))
}

fn store_failure(message: &str, error: RepositoryError) -> Failure<OutcomeResponse> {
    error!(event_name = "api.store.error", error = %error, "{message}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(OutcomeResponse::failed_with_cause(message, error.to_string())),
    )
}

async fn check_user(
    State(state): State<ApiState>,
    Query(query): Query<CheckUserQuery>,
) -> Result<Json<CheckUserResponse>, Failure<CheckUserResponse>> {
    let Some(username) = required(query.username.as_deref()) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(CheckUserResponse::error("Username is required")),
        ));
    };

    match state.reviewers.exists(username).await {
        Ok(true) => Ok(Json(CheckUserResponse::found())),
        Ok(false) => Ok(Json(CheckUserResponse::not_found())),
        Err(error) => {
            error!(event_name = "api.check_user.error", username, error = %error, "reviewer lookup failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CheckUserResponse::error("Failed to validate user")),
            ))
        }
    }
}

async fn fetch_reportees(
    State(state): State<ApiState>,
    Json(body): Json<ReporteesBody>,
) -> Result<Json<Vec<Reportee>>, Failure<OutcomeResponse>> {
    let abm_user_name = required(body.abm_user_name.as_deref())
        .ok_or_else(|| bad_request("ABM_UserName is required"))?;

    state
        .reportees
        .list_for_reviewer(abm_user_name)
        .await
        .map(Json)
        .map_err(|error| store_failure("Failed to fetch reportees", error))
}

async fn fetch_requests(
    State(state): State<ApiState>,
    Json(body): Json<FetchRequestsBody>,
) -> Result<Json<Vec<DiscountRequest>>, Failure<OutcomeResponse>> {
    let username =
        required(body.username.as_deref()).ok_or_else(|| bad_request("Username is required"))?;

    state
        .requests
        .list_for_reviewer(username)
        .await
        .map(Json)
        .map_err(|error| store_failure("Failed to fetch requests", error))
}

/// Takes raw JSON so a missing id list and a malformed payload both answer 400
/// with the `{success, message}` shape.
async fn update_request(
    State(state): State<ApiState>,
    Json(body): Json<Value>,
) -> Result<Json<OutcomeResponse>, Failure<OutcomeResponse>> {
    let has_ids =
        body.get("ids").and_then(Value::as_array).is_some_and(|ids| !ids.is_empty());
    if !has_ids {
        return Err(bad_request("Request IDs are required"));
    }

    let payload: UpdatePayload = serde_json::from_value(body).map_err(|error| {
        (
            StatusCode::BAD_REQUEST,
            Json(OutcomeResponse::failed_with_cause("Invalid update payload", error.to_string())),
        )
    })?;

    let correlation_id = Uuid::new_v4().to_string();
    let updated = state
        .requests
        .apply_review(&payload)
        .await
        .map_err(|error| store_failure("Failed to update request", error))?;

    if updated < payload.ids.len() as u64 {
        warn!(
            event_name = "api.update.partial",
            correlation_id = %correlation_id,
            request_count = payload.ids.len(),
            updated,
            "some request ids did not match a stored request"
        );
    }
    info!(
        event_name = "api.update.applied",
        correlation_id = %correlation_id,
        reviewer = %payload.abm_reviewed_by,
        abm_status = %payload.abm_status,
        request_count = payload.ids.len(),
        "review recorded"
    );
    Ok(Json(OutcomeResponse::ok("Request updated successfully")))
}

async fn fetch_budget(
    State(state): State<ApiState>,
    Json(body): Json<BudgetBody>,
) -> Result<Json<BudgetRows>, Failure<OutcomeResponse>> {
    let abm_username = required(body.abm_username.as_deref())
        .ok_or_else(|| bad_request("abmUsername is required"))?;
    let year_week = required(body.year_week.as_deref())
        .ok_or_else(|| bad_request("yearWeek is required"))?
        .parse::<YearWeek>()
        .map_err(|error| {
            (
                StatusCode::BAD_REQUEST,
                Json(OutcomeResponse::failed_with_cause("Invalid yearWeek", error.to_string())),
            )
        })?;

    let row = state
        .budgets
        .find(abm_username, year_week)
        .await
        .map_err(|error| store_failure("Failed to fetch budget", error))?;
    Ok(Json(row.into_iter().collect()))
}
