use abmdesk_core::config::AppConfig;
use abmdesk_db::{connect_from_config, migrations};

use crate::commands::reviewer::{load_config, runtime};
use crate::commands::{finish, CommandResult, Failure};

pub fn run() -> CommandResult {
    match load_config("migrate") {
        Ok(config) => run_with(&config),
        Err(result) => result,
    }
}

pub fn run_with(config: &AppConfig) -> CommandResult {
    let runtime = match runtime("migrate") {
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
        pool.close().await;
        Ok::<String, Failure>("applied pending migrations".to_string())
    });

    finish("migrate", result)
}
