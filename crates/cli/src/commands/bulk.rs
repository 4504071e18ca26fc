use std::collections::BTreeSet;

use abmdesk_core::config::AppConfig;
use abmdesk_core::domain::request::RequestId;
use abmdesk_core::listing::RequestListView;
use abmdesk_core::review::{ActionResult, BulkAction};

use crate::commands::reviewer::{load_config, review_failure, runtime, Reviewer};
use crate::commands::{finish, CommandResult, Failure};

fn command_name(action: BulkAction) -> &'static str {
    match action {
        BulkAction::Accept => "bulk-accept",
        BulkAction::Reject => "bulk-reject",
    }
}

pub fn run(action: BulkAction, ids: &[i64]) -> CommandResult {
    match load_config(command_name(action)) {
        Ok(config) => run_with(&config, action, ids),
        Err(result) => result,
    }
}

/// Selects the given rows the way the list view does, then submits one batch
/// for those the action admits. Ids that cannot be selected are reported, not fatal.
pub fn run_with(config: &AppConfig, action: BulkAction, ids: &[i64]) -> CommandResult {
    let command = command_name(action);
    let runtime = match runtime(command) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let reviewer = Reviewer::from_config(config)?;
        let session = reviewer.session()?;
        let requests = reviewer.requests(&session).await?;

        let executor = reviewer.executor();
        executor.reconcile(&requests);

        let mut view = RequestListView::new(requests);
        let wanted: BTreeSet<RequestId> = ids.iter().copied().map(RequestId).collect();
        for id in &wanted {
            view.toggle_selection(*id, &executor);
        }

        let targets = view.bulk_targets(action, &executor);
        let recorded =
            executor.execute_bulk(&targets, action, &session).await.map_err(review_failure)?;
        Ok::<String, Failure>(summarize(action, &recorded, &wanted))
    });

    finish(command, result)
}

fn summarize(action: BulkAction, recorded: &[ActionResult], wanted: &BTreeSet<RequestId>) -> String {
    let verb = action.action().status().label().to_ascii_lowercase();
    let stamped: Vec<String> = recorded
        .iter()
        .map(|result| match result.tat {
            Some(tat) => format!("#{} ({tat})", result.request_id),
            None => format!("#{}", result.request_id),
        })
        .collect();
    let mut message = format!("{} request(s) {verb}: {}", recorded.len(), stamped.join(", "));

    let skipped: Vec<String> = wanted
        .iter()
        .filter(|id| !recorded.iter().any(|result| result.request_id == **id))
        .map(|id| format!("#{id}"))
        .collect();
    if !skipped.is_empty() {
        message.push_str(&format!("; skipped {}", skipped.join(", ")));
    }
    message
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{TimeZone, Utc};

    use abmdesk_core::domain::request::RequestId;
    use abmdesk_core::review::{ActionResult, BulkAction, ReviewAction};
    use abmdesk_core::turnaround::Turnaround;

    use super::summarize;

    #[test]
    fn summary_lists_stamped_and_skipped_ids() {
        let at = Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).single().expect("timestamp");
        let recorded = vec![ActionResult {
            request_id: RequestId(1001),
            action: ReviewAction::Accept,
            timestamp: at,
            tat: Some(Turnaround { days: 0, hours: 2, minutes: 0 }),
        }];
        let wanted: BTreeSet<RequestId> = [RequestId(1001), RequestId(1002)].into_iter().collect();

        assert_eq!(
            summarize(BulkAction::Accept, &recorded, &wanted),
            "1 request(s) accepted: #1001 (2 hour(s), 0 min(s)); skipped #1002"
        );
    }
}
