use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use abmdesk_core::config::{AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    CommandResult::success(
        "config",
        render(&config, config_file_doc.as_ref(), config_file_path.as_deref()),
    )
}

fn render(config: &AppConfig, file_doc: Option<&Value>, file_path: Option<&Path>) -> String {
    let fields = [
        field("database.url", config.database.url.clone(), &["ABMDESK_DATABASE_URL"]),
        field(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["ABMDESK_DATABASE_MAX_CONNECTIONS"],
        ),
        field(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["ABMDESK_DATABASE_TIMEOUT_SECS"],
        ),
        field(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["ABMDESK_SERVER_BIND_ADDRESS"],
        ),
        field("server.port", config.server.port.to_string(), &["ABMDESK_SERVER_PORT", "PORT"]),
        field(
            "server.cors_allow_origin",
            config.server.cors_allow_origin.clone(),
            &["ABMDESK_SERVER_CORS_ALLOW_ORIGIN", "CORS_ORIGIN"],
        ),
        field(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["ABMDESK_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        field("api.target", format!("{:?}", config.api.target), &["ABMDESK_API_TARGET"]),
        field(
            "api.local_base_url",
            config.api.local_base_url.clone(),
            &["ABMDESK_API_LOCAL_BASE_URL"],
        ),
        field(
            "api.workflow_base_url",
            config.api.workflow_base_url.clone().unwrap_or_else(|| "<unset>".to_string()),
            &["ABMDESK_API_WORKFLOW_BASE_URL"],
        ),
        field("api.timeout_secs", config.api.timeout_secs.to_string(), &["ABMDESK_API_TIMEOUT_SECS"]),
        field("session.path", config.session.path.display().to_string(), &["ABMDESK_SESSION_PATH"]),
        field(
            "logging.level",
            config.logging.level.clone(),
            &["ABMDESK_LOGGING_LEVEL", "ABMDESK_LOG_LEVEL"],
        ),
        field(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["ABMDESK_LOGGING_FORMAT", "ABMDESK_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in fields {
        lines.push(render_line(key, &value, field_source(key, env_keys, file_doc, file_path)));
    }
    lines.push(format!(
        "- api base url in use = {}",
        config.api.base_url().unwrap_or("<unset>")
    ));
    lines.join("\n")
}

type Field = (&'static str, String, &'static [&'static str]);

fn field(key: &'static str, value: String, env_keys: &'static [&'static str]) -> Field {
    (key, value, env_keys)
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("abmdesk.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/abmdesk.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use abmdesk_core::config::AppConfig;
    use toml::Value;

    use super::{contains_path, field_source, render};

    #[test]
    fn file_keys_are_attributed_to_the_file() {
        let doc: Value = "[api]\ntarget = \"local\"\n".parse().expect("toml");

        assert!(contains_path(&doc, "api.target"));
        assert!(!contains_path(&doc, "api.timeout_secs"));
        assert_eq!(
            field_source(
                "api.target",
                &["ABMDESK_TEST_UNSET_KEY"],
                Some(&doc),
                Some(Path::new("abmdesk.toml"))
            ),
            "file (abmdesk.toml)"
        );
    }

    #[test]
    fn defaults_render_every_section() {
        let rendered = render(&AppConfig::default(), None, None);

        assert!(rendered.contains("- server.port = 3001 (source: "));
        assert!(rendered.contains("- api.target = Local"));
        assert!(rendered.contains("- api base url in use = http://127.0.0.1:3001/webhook"));
        assert!(rendered.contains("- session.path = .abmdesk/session"));
    }
}
