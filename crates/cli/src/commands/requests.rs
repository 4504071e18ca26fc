//! Renders one page of the reviewer's request list.

use abmdesk_client::{DashboardData, DashboardError, DashboardLoader};
use abmdesk_core::config::AppConfig;
use abmdesk_core::domain::request::DiscountRequest;
use abmdesk_core::listing::{RequestListView, SeUserFilter};
use abmdesk_core::review::{row_controls, RowControls};

use crate::commands::reviewer::{client_failure, load_config, runtime, Reviewer};
use crate::commands::{finish, CommandResult, Failure};

#[derive(Clone, Debug, Default)]
pub struct ListArgs {
    pub search: String,
    pub se_user: String,
    pub page: usize,
}

pub fn run(args: &ListArgs) -> CommandResult {
    match load_config("requests") {
        Ok(config) => run_with(&config, args),
        Err(result) => result,
    }
}

pub fn run_with(config: &AppConfig, args: &ListArgs) -> CommandResult {
    let runtime = match runtime("requests") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let reviewer = Reviewer::from_config(config)?;
        let session = reviewer.session()?;
        let data = DashboardLoader::new(reviewer.api.clone())
            .load(&session)
            .await
            .map_err(|DashboardError::BothSourcesFailed { requests, .. }| client_failure(requests))?;

        let executor = reviewer.executor();
        executor.reconcile(&data.requests);

        let mut view = RequestListView::new(data.requests.clone());
        view.set_search(args.search.as_str());
        view.set_se_user(SeUserFilter::parse(&args.se_user));
        view.go_to_page(args.page.max(1));

        let mut lines = vec![page_header(&view, args)];
        if let Some(error) = &data.request_error {
            lines.push(format!("requests unavailable: {}", error.user_message()));
        }
        for request in view.page() {
            let local = executor.result_for(request.request_id);
            let controls = row_controls(
                request,
                local.as_ref(),
                executor.is_in_flight(request.request_id),
                view.bulk_mode_active(),
            );
            lines.push(render_row(request, &controls));
        }
        let reportees = data.reportee_error.is_none().then_some(data.reportees.as_slice());
        lines.push(format!("se users: {}", joined_or_none(&view.se_user_options(reportees))));
        lines.push(reportee_line(&data));
        Ok::<String, Failure>(lines.join("\n"))
    });

    finish("requests", result)
}

fn page_header(view: &RequestListView, args: &ListArgs) -> String {
    format!(
        "page {} of {} ({} of {} requests; search \"{}\", se {})",
        view.current_page(),
        view.total_pages().max(1),
        view.filtered().len(),
        view.requests().len(),
        args.search.trim(),
        match SeUserFilter::parse(&args.se_user) {
            SeUserFilter::All => "all".to_string(),
            SeUserFilter::User(name) => name,
        }
    )
}

fn render_row(request: &DiscountRequest, controls: &RowControls) -> String {
    let discount = match request.discount_value {
        Some(value) => format!("{} ({value})", request.discount_type),
        None => request.discount_type.clone(),
    };
    let eligibility = if request.eligible {
        "eligible".to_string()
    } else {
        format!(
            "not eligible: {}",
            request.eligibility_reason.as_deref().unwrap_or("no reason given")
        )
    };

    let state = match controls {
        RowControls::Taken { badge, taken_at, tat } => {
            let mut state = format!("{badge} {}", taken_at.format("%Y-%m-%d %H:%M"));
            if let Some(tat) = tat {
                state.push_str(&format!(" (TAT {tat})"));
            }
            state
        }
        RowControls::Buttons { buttons, .. } => {
            let enabled: Vec<&str> = buttons
                .iter()
                .filter(|button| button.enabled)
                .map(|button| button.action.label())
                .collect();
            if enabled.is_empty() {
                "no actions".to_string()
            } else {
                format!("actions: {}", enabled.join(", "))
            }
        }
    };

    let mut line = format!(
        "- #{} {} ({}) | {} | {} | {} kg | {} | {} | {}",
        request.request_id,
        request.customer_name,
        request.customer_id,
        request.requested_by_user_name,
        request.campaign_type,
        request.order_qty,
        discount,
        eligibility,
        state
    );
    if let Some(admin) = request.admin.admin_status.as_deref().or(request.admin.status.as_deref()) {
        line.push_str(&format!(" | admin: {admin}"));
    }
    line
}

fn reportee_line(data: &DashboardData) -> String {
    match &data.reportee_error {
        Some(error) => format!("reportees unavailable: {}", error.user_message()),
        None => {
            let names: Vec<String> =
                data.reportees.iter().map(|reportee| reportee.se_user_name.clone()).collect();
            format!("reportees: {}", joined_or_none(&names))
        }
    }
}

fn joined_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use abmdesk_core::domain::request::DiscountRequest;
    use abmdesk_core::listing::RequestListView;
    use abmdesk_core::review::{row_controls, ADMIN_APPROVAL_REASON};

    use super::{page_header, render_row, ListArgs};

    fn request(id: i64, eligible: bool, reason: Option<&str>, status: Option<&str>) -> DiscountRequest {
        serde_json::from_value(json!({
            "requestId": id,
            "eligible": if eligible { 1 } else { 0 },
            "eligibilityReason": reason,
            "customerId": 41001,
            "customerName": "ABC Manufacturing",
            "customerContact": "9876501001",
            "campaignType": "Volume Discount",
            "orderQty": 500.0,
            "discountValue": 1.0,
            "discountType": "Re 1 per kg",
            "requestedBy": 7,
            "requestedByUserName": "se.arjun",
            "requestedByContact": "9123400007",
            "ABM_Id": 3,
            "ABM_UserName": "abm.meera",
            "createdAt": "2026-10-12T09:00:00Z",
            "abmStatus": status,
            "abmReviewedAt": status.map(|_| "2026-10-12T10:30:00Z"),
        }))
        .expect("request")
    }

    #[test]
    fn open_eligible_row_lists_its_actions() {
        let row = request(1001, true, None, None);
        let line = render_row(&row, &row_controls(&row, None, false, false));

        assert_eq!(
            line,
            "- #1001 ABC Manufacturing (41001) | se.arjun | Volume Discount | 500 kg | Re 1 per kg (1) | eligible | actions: Accept, Reject, Modify"
        );
    }

    #[test]
    fn admin_sentinel_row_offers_escalation() {
        let row = request(1002, false, Some(ADMIN_APPROVAL_REASON), None);
        let line = render_row(&row, &row_controls(&row, None, false, false));

        assert!(line.ends_with("not eligible: Requires Admin Approval | actions: Escalate, Reject, Modify"));
    }

    #[test]
    fn other_ineligible_reason_has_no_actions() {
        let row = request(1003, false, Some("Customer credit on hold"), None);
        let line = render_row(&row, &row_controls(&row, None, false, false));

        assert!(line.ends_with("| no actions"));
    }

    #[test]
    fn reviewed_row_shows_badge_and_tat() {
        let row = request(1004, true, None, Some("ACCEPTED"));
        let line = render_row(&row, &row_controls(&row, None, false, false));

        assert!(line.ends_with("| Accepted 2026-10-12 10:30 (TAT 1 hour(s), 30 min(s))"));
    }

    #[test]
    fn bulk_mode_disables_row_buttons() {
        let row = request(1005, true, None, None);
        let line = render_row(&row, &row_controls(&row, None, false, true));

        assert!(line.ends_with("| no actions"));
    }

    #[test]
    fn empty_result_still_reports_one_page() {
        let mut view = RequestListView::new(vec![request(1001, true, None, None)]);
        view.set_search("no such customer");
        let args = ListArgs {
            search: "no such customer".to_string(),
            se_user: "all".to_string(),
            page: 1,
        };

        assert!(page_header(&view, &args).starts_with("page 1 of 1 (0 of 1 requests"));
        assert!(page_header(&RequestListView::new(Vec::new()), &ListArgs::default())
            .starts_with("page 1 of 1 (0 of 0 requests"));
    }
}
