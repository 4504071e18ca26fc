//! Loads everything the request list needs for one reviewer.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use abmdesk_core::domain::reportee::Reportee;
use abmdesk_core::domain::request::DiscountRequest;
use abmdesk_core::domain::session::Session;

use crate::errors::{ClientError, DashboardError};
use crate::gateway::DashboardApi;

/// Requests and reportees are fetched independently; either may be missing.
#[derive(Debug, Default)]
pub struct DashboardData {
    pub requests: Vec<DiscountRequest>,
    pub reportees: Vec<Reportee>,
    pub request_error: Option<ClientError>,
    pub reportee_error: Option<ClientError>,
}

impl DashboardData {
    pub fn is_partial(&self) -> bool {
        self.request_error.is_some() || self.reportee_error.is_some()
    }
}

pub struct DashboardLoader {
    api: Arc<dyn DashboardApi>,
}

impl DashboardLoader {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self { api }
    }

    pub async fn load(&self, session: &Session) -> Result<DashboardData, DashboardError> {
        let correlation_id = Uuid::new_v4().to_string();
        let username = session.username();
        let (requests, reportees) =
            tokio::join!(self.api.fetch_requests(username), self.api.fetch_reportees(username));

        let data = match (requests, reportees) {
            (Err(requests), Err(reportees)) => {
                warn!(
                    event_name = "dashboard.load.failed",
                    correlation_id = %correlation_id,
                    reviewer = username,
                    requests_error = %requests,
                    reportees_error = %reportees,
                    "dashboard sources unavailable"
                );
                return Err(DashboardError::BothSourcesFailed { requests, reportees });
            }
            (requests, reportees) => {
                let (requests, request_error) = split(requests);
                let (reportees, reportee_error) = split(reportees);
                DashboardData { requests, reportees, request_error, reportee_error }
            }
        };

        if let Some(error) = &data.request_error {
            warn!(
                event_name = "dashboard.load.partial",
                correlation_id = %correlation_id,
                reviewer = username,
                source = "requests",
                error = %error,
                "request list unavailable"
            );
        }
        if let Some(error) = &data.reportee_error {
            warn!(
                event_name = "dashboard.load.partial",
                correlation_id = %correlation_id,
                reviewer = username,
                source = "reportees",
                error = %error,
                "reportee list unavailable"
            );
        }
        info!(
            event_name = "dashboard.load.completed",
            correlation_id = %correlation_id,
            reviewer = username,
            request_count = data.requests.len(),
            reportee_count = data.reportees.len(),
            "dashboard loaded"
        );
        Ok(data)
    }
}

fn split<T>(result: Result<Vec<T>, ClientError>) -> (Vec<T>, Option<ClientError>) {
    match result {
        Ok(rows) => (rows, None),
        Err(error) => (Vec::new(), Some(error)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use abmdesk_core::domain::reportee::Reportee;
    use abmdesk_core::domain::session::Session;

    use super::DashboardLoader;
    use crate::errors::{ClientError, DashboardError};
    use crate::testing::{created_at, request, ScriptedApi};

    fn session() -> Session {
        Session::new("abm.meera", created_at()).expect("session")
    }

    fn reportee() -> Reportee {
        Reportee {
            se_id: 7,
            se_user_name: "se.arjun".to_string(),
            abm_id: 3,
            abm_user_name: "abm.meera".to_string(),
        }
    }

    #[tokio::test]
    async fn loads_both_sources() {
        let api = ScriptedApi {
            requests: Some(vec![request(1, true), request(2, false)]),
            reportees: Some(vec![reportee()]),
            ..ScriptedApi::default()
        };

        let data = DashboardLoader::new(Arc::new(api)).load(&session()).await.expect("load");

        assert_eq!(data.requests.len(), 2);
        assert_eq!(data.reportees.len(), 1);
        assert!(!data.is_partial());
    }

    #[tokio::test]
    async fn reportee_failure_still_shows_requests() {
        let api = ScriptedApi { requests: Some(vec![request(1, true)]), ..ScriptedApi::default() };

        let data = DashboardLoader::new(Arc::new(api)).load(&session()).await.expect("load");

        assert_eq!(data.requests.len(), 1);
        assert!(data.reportees.is_empty());
        assert!(matches!(data.reportee_error, Some(ClientError::Parse { .. })));
        assert!(data.request_error.is_none());
    }

    #[tokio::test]
    async fn request_failure_still_shows_reportees() {
        let api = ScriptedApi { reportees: Some(vec![reportee()]), ..ScriptedApi::default() };

        let data = DashboardLoader::new(Arc::new(api)).load(&session()).await.expect("load");

        assert!(data.requests.is_empty());
        assert_eq!(data.reportees.len(), 1);
        assert!(matches!(data.request_error, Some(ClientError::Transport(_))));
    }

    #[tokio::test]
    async fn both_failing_is_an_error() {
        let error = DashboardLoader::new(Arc::new(ScriptedApi::default()))
            .load(&session())
            .await
            .expect_err("both fail");

        assert!(matches!(error, DashboardError::BothSourcesFailed { .. }));
    }
}
