//! Scripted `DashboardApi` for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use abmdesk_core::domain::budget::BudgetFigures;
use abmdesk_core::domain::reportee::Reportee;
use abmdesk_core::domain::request::{AbmReview, AdminOverlay, DiscountRequest, RequestId};
use abmdesk_core::review::UpdatePayload;
use abmdesk_core::week::YearWeek;

use crate::clock::Clock;
use crate::errors::ClientError;
use crate::gateway::DashboardApi;

#[derive(Default)]
pub struct ScriptedApi {
    pub reviewers: Vec<String>,
    pub requests: Option<Vec<DiscountRequest>>,
    pub reportees: Option<Vec<Reportee>>,
    pub budget: Option<(YearWeek, BudgetFigures)>,
    pub update_failure: Option<String>,
    pub updates: Mutex<Vec<UpdatePayload>>,
    pub budget_lookups: Mutex<Vec<(String, YearWeek)>>,
}

impl ScriptedApi {
    pub fn sent_updates(&self) -> Vec<UpdatePayload> {
        self.updates.lock().map(|updates| updates.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DashboardApi for ScriptedApi {
    async fn check_user(&self, username: &str) -> Result<bool, ClientError> {
        Ok(self.reviewers.iter().any(|name| name == username))
    }

    async fn fetch_requests(&self, _username: &str) -> Result<Vec<DiscountRequest>, ClientError> {
        self.requests
            .clone()
            .ok_or_else(|| ClientError::Transport("requests endpoint unreachable".to_string()))
    }

    async fn fetch_reportees(&self, _abm_user_name: &str) -> Result<Vec<Reportee>, ClientError> {
        self.reportees.clone().ok_or_else(|| ClientError::Parse {
            endpoint: "/get-reportees",
            detail: "expected a JSON array".to_string(),
        })
    }

    async fn update(&self, payload: &UpdatePayload) -> Result<(), ClientError> {
        if let Ok(mut updates) = self.updates.lock() {
            updates.push(payload.clone());
        }
        match &self.update_failure {
            Some(message) => Err(ClientError::Status { status: 500, message: message.clone() }),
            None => Ok(()),
        }
    }

    async fn fetch_budget(
        &self,
        abm_user_name: &str,
        year_week: YearWeek,
    ) -> Result<Option<BudgetFigures>, ClientError> {
        if let Ok(mut lookups) = self.budget_lookups.lock() {
            lookups.push((abm_user_name.to_string(), year_week));
        }
        Ok(self.budget.filter(|(week, _)| *week == year_week).map(|(_, figures)| figures))
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 12, 9, 0, 0).single().expect("valid timestamp")
}

pub fn request(id: i64, eligible: bool) -> DiscountRequest {
    DiscountRequest {
        request_id: RequestId(id),
        eligible,
        eligibility_reason: None,
        customer_id: 4400 + id,
        customer_name: format!("Customer {id}"),
        customer_contact: "9876543210".to_string(),
        campaign_type: "Volume Discount".to_string(),
        sku_id: None,
        sku_name: None,
        order_qty: 500.0,
        discount_value: Some(1.0),
        discount_type: "Re 1 per kg".to_string(),
        reason: None,
        requested_by: 7,
        requested_by_user_name: "se.arjun".to_string(),
        requested_by_contact: "9876543211".to_string(),
        abm_id: 3,
        abm_user_name: "abm.meera".to_string(),
        created_at: created_at(),
        review: AbmReview::default(),
        admin: AdminOverlay::default(),
    }
}
