use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use abmdesk_core::config::ApiConfig;
use abmdesk_core::domain::budget::BudgetFigures;
use abmdesk_core::domain::reportee::Reportee;
use abmdesk_core::domain::request::DiscountRequest;
use abmdesk_core::review::UpdatePayload;
use abmdesk_core::week::YearWeek;
use abmdesk_core::wire::{
    BudgetBody, BudgetRows, CheckStatus, CheckUserResponse, FetchRequestsBody, OutcomeResponse,
    ReporteesBody, BUDGET_PATH, CHECK_USER_PATH, FETCH_REQUESTS_PATH, REPORTEES_PATH,
    UPDATE_REQUEST_PATH,
};

use crate::errors::ClientError;

/// The five calls the dashboard makes. Implemented over HTTP and by test doubles.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn check_user(&self, username: &str) -> Result<bool, ClientError>;
    async fn fetch_requests(&self, username: &str) -> Result<Vec<DiscountRequest>, ClientError>;
    async fn fetch_reportees(&self, abm_user_name: &str) -> Result<Vec<Reportee>, ClientError>;
    async fn update(&self, payload: &UpdatePayload) -> Result<(), ClientError>;
    async fn fetch_budget(
        &self,
        abm_user_name: &str,
        year_week: YearWeek,
    ) -> Result<Option<BudgetFigures>, ClientError>;
}

#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ClientError::Configuration(error.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url().ok_or_else(|| {
            ClientError::Configuration("no base URL configured for the selected api target".into())
        })?;
        Self::new(base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, endpoint: &'static str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!(event_name = "client.request", endpoint, "posting to dashboard endpoint");
        let response = self.client.post(self.url(endpoint)).json(body).send().await?;
        decode(endpoint, response).await
    }
}

async fn decode<T: DeserializeOwned>(
    endpoint: &'static str,
    response: Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            message: error_message(&body).unwrap_or_else(|| format!("{endpoint} returned {status}")),
        });
    }

    serde_json::from_str(&body)
        .map_err(|error| ClientError::Parse { endpoint, detail: error.to_string() })
}

/// Pulls `message` out of an error body, falling back to the raw text.
fn error_message(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value.get("message").and_then(Value::as_str).map(str::to_string),
        Err(_) => Some(body.trim().to_string()).filter(|text| !text.is_empty()),
    }
}

fn require_array(endpoint: &'static str, value: Value) -> Result<Value, ClientError> {
    if value.is_array() {
        Ok(value)
    } else {
        Err(ClientError::Parse { endpoint, detail: "expected a JSON array".to_string() })
    }
}

#[async_trait]
impl DashboardApi for HttpGateway {
    async fn check_user(&self, username: &str) -> Result<bool, ClientError> {
        let response = self
            .client
            .get(self.url(CHECK_USER_PATH))
            .query(&[("username", username)])
            .send()
            .await?;
        let body: CheckUserResponse = decode(CHECK_USER_PATH, response).await?;
        Ok(body.status == CheckStatus::Success)
    }

    async fn fetch_requests(&self, username: &str) -> Result<Vec<DiscountRequest>, ClientError> {
        let body = FetchRequestsBody { username: Some(username.to_string()) };
        let value = require_array(FETCH_REQUESTS_PATH, self.post_json(FETCH_REQUESTS_PATH, &body).await?)?;
        serde_json::from_value(value).map_err(|error| ClientError::Parse {
            endpoint: FETCH_REQUESTS_PATH,
            detail: error.to_string(),
        })
    }

    async fn fetch_reportees(&self, abm_user_name: &str) -> Result<Vec<Reportee>, ClientError> {
        let body = ReporteesBody { abm_user_name: Some(abm_user_name.to_string()) };
        let value = require_array(REPORTEES_PATH, self.post_json(REPORTEES_PATH, &body).await?)?;
        serde_json::from_value(value).map_err(|error| ClientError::Parse {
            endpoint: REPORTEES_PATH,
            detail: error.to_string(),
        })
    }

    async fn update(&self, payload: &UpdatePayload) -> Result<(), ClientError> {
        let outcome: OutcomeResponse = self.post_json(UPDATE_REQUEST_PATH, payload).await?;
        if outcome.success {
            Ok(())
        } else {
            Err(ClientError::Rejected(
                outcome.message.unwrap_or_else(|| "update was not applied".to_string()),
            ))
        }
    }

    async fn fetch_budget(
        &self,
        abm_user_name: &str,
        year_week: YearWeek,
    ) -> Result<Option<BudgetFigures>, ClientError> {
        let body = BudgetBody::new(abm_user_name, year_week);
        let value = require_array(BUDGET_PATH, self.post_json(BUDGET_PATH, &body).await?)?;
        let rows: BudgetRows = serde_json::from_value(value)
            .map_err(|error| ClientError::Parse { endpoint: BUDGET_PATH, detail: error.to_string() })?;
        Ok(rows.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};

    use abmdesk_core::domain::request::RequestId;
    use abmdesk_core::review::{BulkAction, UpdatePayload};
    use abmdesk_core::week::YearWeek;

    use super::{DashboardApi, HttpGateway};
    use crate::errors::ClientError;

    async fn serve(router: Router) -> HttpGateway {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        HttpGateway::new(format!("http://{addr}/webhook/"), Duration::from_secs(5)).expect("gateway")
    }

    fn request_row(id: i64) -> Value {
        json!({
            "requestId": id,
            "eligible": 1,
            "customerId": 4411,
            "customerName": "ABC Manufacturing",
            "customerContact": "9876543212",
            "campaignType": "Volume Discount",
            "orderQty": 500,
            "discountValue": 1,
            "discountType": "Re 1 per kg",
            "requestedBy": 7,
            "requestedByUserName": "se.arjun",
            "requestedByContact": "9876543211",
            "ABM_Id": 3,
            "ABM_UserName": "abm.meera",
            "createdAt": "2026-10-12T09:00:00Z",
            "abmStatus": null
        })
    }

    #[tokio::test]
    async fn check_user_reads_status_field() {
        let router = Router::new().route(
            "/webhook/check-abm-user",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                if query.get("username").map(String::as_str) == Some("abm.meera") {
                    Json(json!({"status": "success", "message": "User found"}))
                } else {
                    Json(json!({"status": "error", "message": "User not found"}))
                }
            }),
        );
        let gateway = serve(router).await;

        assert!(gateway.check_user("abm.meera").await.expect("check"));
        assert!(!gateway.check_user("abm.nobody").await.expect("check"));
    }

    #[tokio::test]
    async fn fetch_requests_decodes_rows() {
        let router = Router::new().route(
            "/webhook/fetch-requests",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body, json!({"username": "abm.meera"}));
                Json(json!([request_row(2), request_row(1)]))
            }),
        );
        let gateway = serve(router).await;

        let requests = gateway.fetch_requests("abm.meera").await.expect("fetch");
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].request_id, RequestId(2));
        assert!(requests[0].eligible);
    }

    #[tokio::test]
    async fn reportees_that_are_not_an_array_are_a_parse_error() {
        let router = Router::new().route(
            "/webhook/get-reportees",
            post(|| async {
                Json(json!({"SE_Id": 7, "SE_UserName": "se.arjun", "ABM_Id": 3, "ABM_UserName": "abm.meera"}))
            }),
        );
        let gateway = serve(router).await;

        let error = gateway.fetch_reportees("abm.meera").await.expect_err("must fail");
        assert!(matches!(error, ClientError::Parse { endpoint: "/get-reportees", .. }));
    }

    #[tokio::test]
    async fn update_sends_every_field_and_surfaces_server_message() {
        let router = Router::new().route(
            "/webhook/update-discount-request",
            post(|Json(body): Json<Value>| async move {
                let object = body.as_object().cloned().unwrap_or_default();
                for key in ["abmOrderQty", "abmDiscountType", "abmDiscountValue", "abmRemarks"] {
                    assert!(object.contains_key(key), "{key} must be present");
                }
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"success": false, "message": "Failed to update request"})),
                )
            }),
        );
        let gateway = serve(router).await;
        let payload = UpdatePayload::for_bulk(
            vec![RequestId(1)],
            BulkAction::Accept,
            "abm.meera",
            Utc.with_ymd_and_hms(2026, 10, 13, 9, 0, 0).single().expect("ts"),
        );

        let error = gateway.update(&payload).await.expect_err("must fail");
        assert!(matches!(error, ClientError::Status { status: 500, .. }));
        assert_eq!(error.user_message(), "Failed to update request");
    }

    #[tokio::test]
    async fn update_with_success_false_is_rejected() {
        let router = Router::new().route(
            "/webhook/update-discount-request",
            post(|| async { Json(json!({"success": false, "message": "stale request"})) }),
        );
        let gateway = serve(router).await;
        let payload = UpdatePayload::for_bulk(
            vec![RequestId(1)],
            BulkAction::Reject,
            "abm.meera",
            Utc.with_ymd_and_hms(2026, 10, 13, 9, 0, 0).single().expect("ts"),
        );

        let error = gateway.update(&payload).await.expect_err("must fail");
        assert_eq!(error.user_message(), "stale request");
    }

    #[tokio::test]
    async fn budget_takes_first_row_or_none() {
        let router = Router::new().route(
            "/webhook/get-abm-budget",
            post(|Json(body): Json<Value>| async move {
                if body["yearWeek"] == "2026-42" {
                    Json(json!([{"allocatedBudget": 1000, "consumedBudget": 1200}]))
                } else {
                    Json(json!([]))
                }
            }),
        );
        let gateway = serve(router).await;

        let figures = gateway
            .fetch_budget("abm.meera", YearWeek { year: 2026, week: 42 })
            .await
            .expect("fetch")
            .expect("row");
        assert_eq!(figures.balance(), Decimal::from(-200));

        let missing =
            gateway.fetch_budget("abm.meera", YearWeek { year: 2026, week: 43 }).await.expect("fetch");
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn budget_row_with_null_amounts_reads_as_zero() {
        let router = Router::new().route(
            "/webhook/get-abm-budget",
            post(|| async { Json(json!([{"allocatedBudget": null, "consumedBudget": "450"}])) }),
        );
        let gateway = serve(router).await;

        let figures = gateway
            .fetch_budget("abm.meera", YearWeek { year: 2026, week: 42 })
            .await
            .expect("fetch")
            .expect("row");
        assert_eq!(figures.allocated_budget, Decimal::ZERO);
        assert_eq!(figures.balance(), Decimal::from(-450));
    }

    #[tokio::test]
    async fn non_json_body_is_a_parse_error() {
        let router = Router::new().route("/webhook/fetch-requests", post(|| async { "<html>oops</html>" }));
        let gateway = serve(router).await;

        let error = gateway.fetch_requests("abm.meera").await.expect_err("must fail");
        assert!(matches!(error, ClientError::Parse { .. }));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let gateway =
            HttpGateway::new("http://127.0.0.1:9/webhook", Duration::from_secs(2)).expect("gateway");

        let error = gateway.check_user("abm.meera").await.expect_err("must fail");
        assert!(matches!(error, ClientError::Transport(_)));
    }
}
