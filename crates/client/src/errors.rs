use thiserror::Error;

use abmdesk_core::domain::request::RequestId;
use abmdesk_core::errors::ValidationError;

/// Failure talking to the dashboard endpoints. Parse failures count as transport failures.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("server rejected the update: {0}")]
    Rejected(String),
    #[error("malformed response from {endpoint}: {detail}")]
    Parse { endpoint: &'static str, detail: String },
    #[error("client configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Text shown to the reviewer; server-provided messages pass through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::Rejected(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("request {0} is locked while a previous action is pending or recorded")]
    Locked(RequestId),
    #[error(transparent)]
    Gateway(#[from] ClientError),
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("could not load requests ({requests}) or reportees ({reportees})")]
    BothSourcesFailed { requests: ClientError, reportees: ClientError },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no reviewer is signed in")]
    NotLoggedIn,
    #[error("`{0}` is not a registered reviewer")]
    UnknownUser(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("session file error: {0}")]
    Storage(String),
    #[error(transparent)]
    Gateway(#[from] ClientError),
}

#[cfg(test)]
mod tests {
    use super::ClientError;

    #[test]
    fn server_message_is_surfaced_verbatim() {
        let error = ClientError::Status { status: 500, message: "Failed to update request".to_string() };
        assert_eq!(error.user_message(), "Failed to update request");
        assert_eq!(error.to_string(), "Failed to update request");
    }
}
