//! Wiring shared by the commands that act as the signed-in reviewer.

use std::sync::Arc;

use tokio::runtime::Runtime;

use abmdesk_client::{
    ActionExecutor, Clock, ClientError, DashboardApi, FileSessionStore, HttpGateway, ReviewError,
    SessionError, SessionGate, SystemClock,
};
use abmdesk_core::config::{AppConfig, LoadOptions};
use abmdesk_core::domain::request::DiscountRequest;
use abmdesk_core::domain::session::Session;

use super::{CommandResult, Failure};

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

pub(crate) fn runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

pub(crate) struct Reviewer {
    pub api: Arc<dyn DashboardApi>,
    pub clock: Arc<dyn Clock>,
    pub gate: SessionGate,
}

impl Reviewer {
    pub fn from_config(config: &AppConfig) -> Result<Self, Failure> {
        let gateway = HttpGateway::from_config(&config.api)
            .map_err(|error| ("api_config", error.to_string(), 2u8))?;
        let api: Arc<dyn DashboardApi> = Arc::new(gateway);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let gate = SessionGate::new(
            api.clone(),
            Arc::new(FileSessionStore::new(config.session.path.clone())),
            clock.clone(),
        );
        Ok(Self { api, clock, gate })
    }

    pub fn session(&self) -> Result<Session, Failure> {
        self.gate.current().map_err(session_failure)
    }

    pub fn executor(&self) -> ActionExecutor {
        ActionExecutor::new(self.api.clone(), self.clock.clone())
    }

    pub async fn requests(&self, session: &Session) -> Result<Vec<DiscountRequest>, Failure> {
        self.api.fetch_requests(session.username()).await.map_err(client_failure)
    }
}

pub(crate) fn session_failure(error: SessionError) -> Failure {
    match error {
        SessionError::NotLoggedIn => {
            ("not_logged_in", "no reviewer is signed in; run `abmdesk login <username>`".to_string(), 7)
        }
        SessionError::UnknownUser(_) => ("unknown_user", error.to_string(), 7),
        SessionError::Validation(error) => ("validation", error.to_string(), 8),
        SessionError::Storage(message) => ("session_storage", message, 7),
        SessionError::Gateway(error) => client_failure(error),
    }
}

pub(crate) fn review_failure(error: ReviewError) -> Failure {
    match error {
        ReviewError::Validation(error) => ("validation", error.to_string(), 8),
        ReviewError::Locked(_) => ("locked", error.to_string(), 8),
        ReviewError::Gateway(error) => client_failure(error),
    }
}

pub(crate) fn client_failure(error: ClientError) -> Failure {
    let error_class = match &error {
        ClientError::Transport(_) => "transport",
        ClientError::Status { .. } => "http_status",
        ClientError::Rejected(_) => "rejected",
        ClientError::Parse { .. } => "parse",
        ClientError::Configuration(_) => "api_config",
    };
    (error_class, error.user_message(), 9)
}
