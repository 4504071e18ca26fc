use chrono::{NaiveDate, NaiveTime};

use abmdesk_client::BudgetService;
use abmdesk_core::config::AppConfig;
use abmdesk_core::domain::budget::{BudgetStanding, BudgetSummary};
use abmdesk_core::week::WeekWindow;

use crate::commands::reviewer::{client_failure, load_config, runtime, Reviewer};
use crate::commands::{finish, CommandResult, Failure};

pub fn run(week_of: Option<NaiveDate>) -> CommandResult {
    match load_config("budget") {
        Ok(config) => run_with(&config, week_of),
        Err(result) => result,
    }
}

pub fn run_with(config: &AppConfig, week_of: Option<NaiveDate>) -> CommandResult {
    let runtime = match runtime("budget") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let window = match week_of {
        Some(date) => WeekWindow::containing(date.and_time(NaiveTime::MIN)),
        None => WeekWindow::current(),
    };

    let result = runtime.block_on(async {
        let reviewer = Reviewer::from_config(config)?;
        let session = reviewer.session()?;
        let summary = BudgetService::new(reviewer.api.clone())
            .summary(&session, window)
            .await
            .map_err(client_failure)?;
        Ok::<String, Failure>(describe(&summary))
    });

    finish("budget", result)
}

fn describe(summary: &BudgetSummary) -> String {
    let standing = match summary.standing {
        BudgetStanding::WithinBudget => "within budget",
        BudgetStanding::OverBudget => "over budget",
    };
    format!(
        "week {} ({} to {}): allocated {}, consumed {}, balance {} ({standing})",
        summary.window.year_week(),
        summary.window.start.format("%Y-%m-%d %H:%M:%S%.3f"),
        summary.window.end.format("%Y-%m-%d %H:%M:%S%.3f"),
        summary.figures.allocated_budget,
        summary.figures.consumed_budget,
        summary.balance
    )
}
