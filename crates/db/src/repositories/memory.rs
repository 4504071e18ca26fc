use std::collections::{BTreeMap, HashMap, HashSet};

use tokio::sync::RwLock;

use abmdesk_core::domain::budget::BudgetFigures;
use abmdesk_core::domain::reportee::Reportee;
use abmdesk_core::domain::request::{DiscountRequest, RequestId};
use abmdesk_core::review::UpdatePayload;
use abmdesk_core::week::YearWeek;

use super::{
    BudgetRepository, DiscountRequestRepository, RepositoryError, ReporteeRepository,
    ReviewerRepository,
};

#[derive(Default)]
pub struct InMemoryReviewerRepository {
    reviewers: RwLock<HashMap<i64, String>>,
    deleted: RwLock<HashSet<i64>>,
}

impl InMemoryReviewerRepository {
    pub async fn mark_deleted(&self, id: i64) {
        self.deleted.write().await.insert(id);
    }
}

#[async_trait::async_trait]
impl ReviewerRepository for InMemoryReviewerRepository {
    async fn exists(&self, username: &str) -> Result<bool, RepositoryError> {
        let reviewers = self.reviewers.read().await;
        let deleted = self.deleted.read().await;
        Ok(reviewers.iter().any(|(id, name)| name == username && !deleted.contains(id)))
    }

    async fn register(&self, id: i64, username: &str) -> Result<(), RepositoryError> {
        self.reviewers.write().await.insert(id, username.to_string());
        self.deleted.write().await.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryReporteeRepository {
    reportees: RwLock<HashMap<(i64, i64), Reportee>>,
}

#[async_trait::async_trait]
impl ReporteeRepository for InMemoryReporteeRepository {
    async fn list_for_reviewer(
        &self,
        abm_user_name: &str,
    ) -> Result<Vec<Reportee>, RepositoryError> {
        let reportees = self.reportees.read().await;
        let mut listed: Vec<Reportee> = reportees
            .values()
            .filter(|reportee| reportee.abm_user_name == abm_user_name)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.se_user_name.cmp(&b.se_user_name));
        Ok(listed)
    }

    async fn save(&self, reportee: Reportee) -> Result<(), RepositoryError> {
        let mut reportees = self.reportees.write().await;
        reportees.insert((reportee.se_id, reportee.abm_id), reportee);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryDiscountRequestRepository {
    requests: RwLock<BTreeMap<RequestId, DiscountRequest>>,
}

#[async_trait::async_trait]
impl DiscountRequestRepository for InMemoryDiscountRequestRepository {
    async fn list_for_reviewer(
        &self,
        abm_user_name: &str,
    ) -> Result<Vec<DiscountRequest>, RepositoryError> {
        let requests = self.requests.read().await;
        let mut listed: Vec<DiscountRequest> = requests
            .values()
            .filter(|request| request.abm_user_name == abm_user_name)
            .cloned()
            .collect();
        listed.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| b.request_id.cmp(&a.request_id))
        });
        Ok(listed)
    }

    async fn insert(&self, request: DiscountRequest) -> Result<(), RepositoryError> {
        let mut requests = self.requests.write().await;
        requests.insert(request.request_id, request);
        Ok(())
    }

    async fn apply_review(&self, payload: &UpdatePayload) -> Result<u64, RepositoryError> {
        let mut requests = self.requests.write().await;
        let mut touched = 0;
        for id in &payload.ids {
            if let Some(request) = requests.get_mut(id) {
                request.review.abm_status = Some(payload.abm_status);
                request.review.abm_order_qty = payload.abm_order_qty;
                request.review.abm_discount_type = payload.abm_discount_type.clone();
                request.review.abm_discount_value = payload.abm_discount_value;
                request.review.abm_remarks = payload.abm_remarks.clone();
                request.review.abm_reviewed_at = Some(payload.abm_reviewed_at);
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[derive(Default)]
pub struct InMemoryBudgetRepository {
    budgets: RwLock<HashMap<(String, YearWeek), BudgetFigures>>,
}

#[async_trait::async_trait]
impl BudgetRepository for InMemoryBudgetRepository {
    async fn find(
        &self,
        abm_user_name: &str,
        year_week: YearWeek,
    ) -> Result<Option<BudgetFigures>, RepositoryError> {
        let budgets = self.budgets.read().await;
        Ok(budgets.get(&(abm_user_name.to_string(), year_week)).copied())
    }

    async fn save(
        &self,
        abm_user_name: &str,
        year_week: YearWeek,
        figures: BudgetFigures,
    ) -> Result<(), RepositoryError> {
        let mut budgets = self.budgets.write().await;
        budgets.insert((abm_user_name.to_string(), year_week), figures);
        Ok(())
    }
}
