//! Submits review decisions and tracks which rows are locked.
//!
//! A row is locked from the moment a submission starts until the process ends:
//! while the call is in flight, and afterwards because a decision was recorded.
//! A failed call releases the lock and leaves no trace.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};
use uuid::Uuid;

use abmdesk_core::domain::request::{DiscountRequest, RequestId};
use abmdesk_core::domain::session::Session;
use abmdesk_core::errors::ValidationError;
use abmdesk_core::listing::ActionLocks;
use abmdesk_core::review::{ActionResult, BulkAction, ReviewDecision, UpdatePayload};

use crate::clock::Clock;
use crate::errors::ReviewError;
use crate::gateway::DashboardApi;

#[derive(Default)]
struct ExecutorState {
    results: HashMap<RequestId, ActionResult>,
    in_flight: HashSet<RequestId>,
}

pub struct ActionExecutor {
    api: Arc<dyn DashboardApi>,
    clock: Arc<dyn Clock>,
    state: Mutex<ExecutorState>,
}

/// Releases in-flight marks when the submission ends, however it ends.
struct InFlight<'a> {
    executor: &'a ActionExecutor,
    ids: Vec<RequestId>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.executor.state();
        for id in &self.ids {
            state.in_flight.remove(id);
        }
    }
}

impl ActionExecutor {
    pub fn new(api: Arc<dyn DashboardApi>, clock: Arc<dyn Clock>) -> Self {
        Self { api, clock, state: Mutex::new(ExecutorState::default()) }
    }

    fn state(&self) -> MutexGuard<'_, ExecutorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks every id in flight, or none if any is already locked.
    fn claim(&self, ids: &[RequestId]) -> Result<InFlight<'_>, ReviewError> {
        let mut state = self.state();
        if let Some(id) = ids
            .iter()
            .find(|id| state.results.contains_key(id) || state.in_flight.contains(id))
        {
            return Err(ReviewError::Locked(*id));
        }
        state.in_flight.extend(ids.iter().copied());
        Ok(InFlight { executor: self, ids: ids.to_vec() })
    }

    pub async fn execute_action(
        &self,
        request: &DiscountRequest,
        decision: ReviewDecision,
        session: &Session,
    ) -> Result<ActionResult, ReviewError> {
        decision.validate_for(request)?;
        let _in_flight = self.claim(&[request.request_id])?;

        let correlation_id = Uuid::new_v4().to_string();
        let action = decision.action();
        let acted_at = self.clock.now();
        let payload =
            UpdatePayload::for_decision(request.request_id, &decision, session.username(), acted_at);

        if let Err(error) = self.api.update(&payload).await {
            warn!(
                event_name = "review.action.failed",
                correlation_id = %correlation_id,
                reviewer = session.username(),
                request_id = %request.request_id,
                action = %action,
                error = %error,
                "review action was not recorded"
            );
            return Err(error.into());
        }

        let result = ActionResult::recorded(request, action, acted_at);
        self.state().results.insert(request.request_id, result.clone());
        info!(
            event_name = "review.action.recorded",
            correlation_id = %correlation_id,
            reviewer = session.username(),
            request_id = %request.request_id,
            action = %action,
            "review action recorded"
        );
        Ok(result)
    }

    /// Sends one update for every row the action admits. Rows it does not admit,
    /// and rows already locked, are left out rather than failing the batch.
    pub async fn execute_bulk(
        &self,
        requests: &[&DiscountRequest],
        action: BulkAction,
        session: &Session,
    ) -> Result<Vec<ActionResult>, ReviewError> {
        let targets: Vec<&DiscountRequest> = requests
            .iter()
            .copied()
            .filter(|request| action.admits(request) && !self.is_action_disabled(request.request_id))
            .collect();
        if targets.is_empty() {
            return Err(ValidationError::EmptySelection { action: action.action() }.into());
        }

        let ids: Vec<RequestId> = targets.iter().map(|request| request.request_id).collect();
        let _in_flight = self.claim(&ids)?;

        let correlation_id = Uuid::new_v4().to_string();
        let acted_at = self.clock.now();
        let payload = UpdatePayload::for_bulk(ids, action, session.username(), acted_at);

        if let Err(error) = self.api.update(&payload).await {
            warn!(
                event_name = "review.bulk.failed",
                correlation_id = %correlation_id,
                reviewer = session.username(),
                request_count = payload.ids.len(),
                action = %action.action(),
                error = %error,
                "bulk review was not recorded"
            );
            return Err(error.into());
        }

        let results: Vec<ActionResult> = targets
            .iter()
            .map(|request| ActionResult::recorded(request, action.action(), acted_at))
            .collect();
        {
            let mut state = self.state();
            for result in &results {
                state.results.insert(result.request_id, result.clone());
            }
        }
        info!(
            event_name = "review.bulk.recorded",
            correlation_id = %correlation_id,
            reviewer = session.username(),
            request_count = results.len(),
            action = %action.action(),
            "bulk review recorded"
        );
        Ok(results)
    }

    pub fn is_action_disabled(&self, request_id: RequestId) -> bool {
        let state = self.state();
        state.results.contains_key(&request_id) || state.in_flight.contains(&request_id)
    }

    pub fn is_in_flight(&self, request_id: RequestId) -> bool {
        self.state().in_flight.contains(&request_id)
    }

    pub fn result_for(&self, request_id: RequestId) -> Option<ActionResult> {
        self.state().results.get(&request_id).cloned()
    }

    /// Seeds results for rows the store already reports as reviewed. Local results win.
    pub fn reconcile(&self, requests: &[DiscountRequest]) {
        let mut state = self.state();
        for request in requests {
            if state.results.contains_key(&request.request_id) {
                continue;
            }
            if let Some(result) = ActionResult::from_store(request) {
                state.results.insert(request.request_id, result);
            }
        }
    }
}

impl ActionLocks for ActionExecutor {
    fn is_action_disabled(&self, request_id: RequestId) -> bool {
        ActionExecutor::is_action_disabled(self, request_id)
    }
}
