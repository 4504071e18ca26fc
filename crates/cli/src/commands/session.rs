use abmdesk_core::config::AppConfig;

use crate::commands::reviewer::{load_config, runtime, session_failure, Reviewer};
use crate::commands::{finish, CommandResult, Failure};

pub fn login(username: &str) -> CommandResult {
    match load_config("login") {
        Ok(config) => login_with(&config, username),
        Err(result) => result,
    }
}

pub fn login_with(config: &AppConfig, username: &str) -> CommandResult {
    let runtime = match runtime("login") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let reviewer = Reviewer::from_config(config)?;
        let session = reviewer.gate.login(username).await.map_err(session_failure)?;
        Ok::<String, Failure>(format!("signed in as {}", session.username()))
    });

    finish("login", result)
}

pub fn logout() -> CommandResult {
    match load_config("logout") {
        Ok(config) => logout_with(&config),
        Err(result) => result,
    }
}

pub fn logout_with(config: &AppConfig) -> CommandResult {
    let result = Reviewer::from_config(config)
        .and_then(|reviewer| reviewer.gate.logout().map_err(session_failure))
        .map(|()| "signed out".to_string());

    finish("logout", result)
}
