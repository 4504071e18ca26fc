use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// The signed-in reviewer. Created at login, dropped at logout, read-only in between.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    username: String,
    established_at: DateTime<Utc>,
}

impl Session {
    pub fn new(username: &str, established_at: DateTime<Utc>) -> Result<Self, ValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::MissingUsername);
        }
        Ok(Self { username: username.to_string(), established_at })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::Session;
    use crate::errors::ValidationError;

    #[test]
    fn trims_username() {
        let session = Session::new("  abm.meera ", Utc::now()).expect("session");
        assert_eq!(session.username(), "abm.meera");
    }

    #[test]
    fn blank_username_is_rejected() {
        assert_eq!(Session::new("   ", Utc::now()), Err(ValidationError::MissingUsername));
    }
}
