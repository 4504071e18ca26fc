pub mod action;
pub mod budget;
pub mod bulk;
pub mod config;
pub mod migrate;
pub mod requests;
pub mod seed;
pub mod session;

mod reviewer;

use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// `(error_class, message, exit_code)` carried out of an async command body.
pub(crate) type Failure = (&'static str, String, u8);

pub(crate) fn finish(command: &str, result: Result<String, Failure>) -> CommandResult {
    match result {
        Ok(message) => CommandResult::success(command, message),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure(command, error_class, message, exit_code)
        }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::{finish, CommandResult};

    #[test]
    fn failure_payload_carries_class_and_exit_code() {
        let result = CommandResult::failure("accept", "validation", "remarks are required", 8);

        assert_eq!(result.exit_code, 8);
        let payload: Value = serde_json::from_str(&result.output).expect("json");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "validation");
    }

    #[test]
    fn finish_maps_success_to_ok_status() {
        let result = finish("logout", Ok("signed out".to_string()));

        assert_eq!(result.exit_code, 0);
        let payload: Value = serde_json::from_str(&result.output).expect("json");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["error_class"], Value::Null);
    }
}
