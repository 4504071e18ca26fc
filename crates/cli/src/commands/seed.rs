use abmdesk_core::config::AppConfig;
use abmdesk_core::week::WeekWindow;
use abmdesk_db::{connect_from_config, migrations, DemoDataset, SeedResult};
use chrono::Utc;

use crate::commands::reviewer::{load_config, runtime};
use crate::commands::{finish, CommandResult, Failure};

pub fn run() -> CommandResult {
    match load_config("seed") {
        Ok(config) => run_with(&config),
        Err(result) => result,
    }
}

pub fn run_with(config: &AppConfig) -> CommandResult {
    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_from_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let seeded = DemoDataset::load(&pool, Utc::now(), WeekWindow::current().year_week())
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = DemoDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let failed_checks = verification
            .checks
            .iter()
            .filter_map(|(check, passed)| (!passed).then_some(*check))
            .collect::<Vec<_>>();

        pool.close().await;
        if verification.all_present {
            Ok::<String, Failure>(seed_summary(&seeded))
        } else {
            Err(("seed_verification", verification_message(&failed_checks), 6u8))
        }
    });

    finish("seed", result)
}

fn seed_summary(seeded: &SeedResult) -> String {
    format!(
        "demo dataset loaded: {} requests for reviewers {} with budgets for week {}",
        seeded.requests_seeded,
        seeded.reviewers.join(", "),
        seeded.year_week
    )
}

fn verification_message(failed_checks: &[&str]) -> String {
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use abmdesk_core::week::YearWeek;
    use abmdesk_db::SeedResult;

    use super::{seed_summary, verification_message};

    #[test]
    fn verification_error_message_targets_failed_checks() {
        assert_eq!(
            verification_message(&["discount-requests", "reportees"]),
            "Seed verification failed for checks: discount-requests, reportees"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        assert_eq!(verification_message(&[]), "Some seed data failed to load");
    }

    #[test]
    fn summary_names_reviewers_and_week() {
        let seeded = SeedResult {
            reviewers: vec!["abm.meera", "abm.rahul"],
            requests_seeded: 8,
            year_week: YearWeek { year: 2026, week: 42 },
        };

        assert_eq!(
            seed_summary(&seeded),
            "demo dataset loaded: 8 requests for reviewers abm.meera, abm.rahul with budgets for week 2026-42"
        );
    }
}
