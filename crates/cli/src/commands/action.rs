//! Single-row review commands: accept, reject, modify, escalate.

use abmdesk_core::config::AppConfig;
use abmdesk_core::domain::request::RequestId;
use abmdesk_core::review::{ActionResult, ReviewDecision};

use crate::commands::reviewer::{load_config, review_failure, runtime, Reviewer};
use crate::commands::{finish, CommandResult, Failure};

pub fn run(command: &str, request_id: i64, decision: ReviewDecision) -> CommandResult {
    match load_config(command) {
        Ok(config) => run_with(&config, command, request_id, decision),
        Err(result) => result,
    }
}

pub fn run_with(
    config: &AppConfig,
    command: &str,
    request_id: i64,
    decision: ReviewDecision,
) -> CommandResult {
    let runtime = match runtime(command) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let reviewer = Reviewer::from_config(config)?;
        let session = reviewer.session()?;
        let requests = reviewer.requests(&session).await?;
        let request = requests
            .iter()
            .find(|request| request.request_id == RequestId(request_id))
            .ok_or_else(|| {
                (
                    "request_not_found",
                    format!("request {request_id} is not assigned to {}", session.username()),
                    8u8,
                )
            })?;

        let recorded = reviewer
            .executor()
            .execute_action(request, decision, &session)
            .await
            .map_err(review_failure)?;
        Ok::<String, Failure>(describe(&recorded))
    });

    finish(command, result)
}

pub(crate) fn describe(result: &ActionResult) -> String {
    let mut line = format!(
        "request {} {} at {}",
        result.request_id,
        result.badge().to_ascii_lowercase(),
        result.timestamp.to_rfc3339()
    );
    if let Some(tat) = result.tat {
        line.push_str(&format!(" (TAT {tat})"));
    }
    line
}
