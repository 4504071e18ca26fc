pub mod commands;

use std::process::ExitCode;

use abmdesk_core::config::{AppConfig, LoadOptions, LogFormat};
use abmdesk_core::review::{BulkAction, ModifyTerms, ReviewDecision};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::commands::requests::ListArgs;

#[derive(Debug, Parser)]
#[command(
    name = "abmdesk",
    about = "ABM discount review desk",
    long_about = "Review ABM discount requests against the local service or the workflow host, and operate the local store.",
    after_help = "Examples:\n  abmdesk login abm.meera\n  abmdesk requests --se se.arjun --page 2\n  abmdesk modify 1001 --order-kg 300\n  abmdesk bulk-accept 1001 1005"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations to the local store")]
    Migrate,
    #[command(about = "Load the deterministic demo reviewers, requests and budgets")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Sign in as a registered reviewer")]
    Login { username: String },
    #[command(about = "Forget the signed-in reviewer")]
    Logout,
    #[command(about = "List the signed-in reviewer's requests, ten per page")]
    Requests {
        #[arg(long, default_value = "", help = "Match customer id, customer name or SE name")]
        search: String,
        #[arg(long, default_value = "all", help = "Only requests raised by this SE")]
        se: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    #[command(about = "Accept an eligible request")]
    Accept { id: i64 },
    #[command(about = "Reject an open request")]
    Reject {
        id: i64,
        #[arg(long)]
        remarks: Option<String>,
    },
    #[command(about = "Accept an open request with changed terms")]
    Modify {
        id: i64,
        #[arg(long = "order-kg")]
        order_kg: Option<f64>,
        #[arg(long)]
        discount_type: Option<String>,
        #[arg(long)]
        discount_value: Option<f64>,
    },
    #[command(about = "Send a request that requires admin approval to the admin")]
    Escalate {
        id: i64,
        #[arg(long)]
        remarks: String,
    },
    #[command(about = "Accept every listed eligible request in one update")]
    BulkAccept {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    #[command(about = "Reject every listed open request in one update")]
    BulkReject {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    #[command(about = "Show the reviewer's budget for the current or a given week")]
    Budget {
        #[arg(long, help = "Any date inside the week, YYYY-MM-DD")]
        week_of: Option<NaiveDate>,
    },
}

/// Logs go to stderr so stdout carries only the JSON outcome line.
fn init_logging() {
    use tracing::Level;

    let Ok(config) = AppConfig::load(LoadOptions::default()) else {
        return;
    };
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::WARN);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => commands::config::run(),
        Command::Login { username } => commands::session::login(&username),
        Command::Logout => commands::session::logout(),
        Command::Requests { search, se, page } => {
            commands::requests::run(&ListArgs { search, se_user: se, page })
        }
        Command::Accept { id } => commands::action::run("accept", id, ReviewDecision::Accept),
        Command::Reject { id, remarks } => {
            commands::action::run("reject", id, ReviewDecision::Reject { remarks })
        }
        Command::Modify { id, order_kg, discount_type, discount_value } => commands::action::run(
            "modify",
            id,
            ReviewDecision::Modify(ModifyTerms { order_qty: order_kg, discount_type, discount_value }),
        ),
        Command::Escalate { id, remarks } => {
            commands::action::run("escalate", id, ReviewDecision::Escalate { remarks })
        }
        Command::BulkAccept { ids } => commands::bulk::run(BulkAction::Accept, &ids),
        Command::BulkReject { ids } => commands::bulk::run(BulkAction::Reject, &ids),
        Command::Budget { week_of } => commands::budget::run(week_of),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn modify_flags_parse_into_optional_terms() {
        let cli = Cli::try_parse_from(["abmdesk", "modify", "1001", "--order-kg", "300"])
            .expect("parse");

        match cli.command {
            Command::Modify { id, order_kg, discount_type, discount_value } => {
                assert_eq!(id, 1001);
                assert_eq!(order_kg, Some(300.0));
                assert_eq!(discount_type, None);
                assert_eq!(discount_value, None);
            }
            other => panic!("expected modify, got {other:?}"),
        }
    }

    #[test]
    fn bulk_commands_need_at_least_one_id() {
        assert!(Cli::try_parse_from(["abmdesk", "bulk-accept"]).is_err());
        assert!(Cli::try_parse_from(["abmdesk", "bulk-reject", "1001", "1002"]).is_ok());
    }

    #[test]
    fn budget_accepts_a_calendar_date() {
        let cli =
            Cli::try_parse_from(["abmdesk", "budget", "--week-of", "2026-10-18"]).expect("parse");
        assert!(matches!(cli.command, Command::Budget { week_of: Some(_) }));
    }
}
