use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub cors_allow_origin: String,
    pub graceful_shutdown_secs: u64,
}

/// Where the reviewer client sends its five dashboard calls.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub target: ApiTarget,
    pub local_base_url: String,
    pub workflow_base_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiTarget {
    Local,
    Workflow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub server_port: Option<u16>,
    pub api_target: Option<ApiTarget>,
    pub api_base_url: Option<String>,
    pub session_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://abmdesk.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 3001,
                cors_allow_origin: "http://localhost:5173".to_string(),
                graceful_shutdown_secs: 15,
            },
            api: ApiConfig {
                target: ApiTarget::Local,
                local_base_url: "http://127.0.0.1:3001/webhook".to_string(),
                workflow_base_url: None,
                timeout_secs: 30,
            },
            session: SessionConfig { path: PathBuf::from(".abmdesk/session") },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for ApiTarget {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "workflow" => Ok(Self::Workflow),
            other => Err(ConfigError::Validation(format!(
                "unsupported api target `{other}` (expected local|workflow)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl ApiConfig {
    /// Base URL for the selected target, without a trailing slash.
    pub fn base_url(&self) -> Option<&str> {
        let url = match self.target {
            ApiTarget::Local => Some(self.local_base_url.as_str()),
            ApiTarget::Workflow => self.workflow_base_url.as_deref(),
        };
        url.map(|url| url.trim_end_matches('/'))
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("abmdesk.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(cors_allow_origin) = server.cors_allow_origin {
                self.server.cors_allow_origin = cors_allow_origin;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(api) = patch.api {
            if let Some(target) = api.target {
                self.api.target = target;
            }
            if let Some(local_base_url) = api.local_base_url {
                self.api.local_base_url = local_base_url;
            }
            if let Some(workflow_base_url) = api.workflow_base_url {
                self.api.workflow_base_url = Some(workflow_base_url);
            }
            if let Some(timeout_secs) = api.timeout_secs {
                self.api.timeout_secs = timeout_secs;
            }
        }

        if let Some(session) = patch.session {
            if let Some(path) = session.path {
                self.session.path = path;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ABMDESK_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("ABMDESK_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_env("ABMDESK_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("ABMDESK_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_env("ABMDESK_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("ABMDESK_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        // `PORT` and `CORS_ORIGIN` are what hosting platforms inject.
        let port = read_env("ABMDESK_SERVER_PORT")
            .map(|value| ("ABMDESK_SERVER_PORT", value))
            .or_else(|| read_env("PORT").map(|value| ("PORT", value)));
        if let Some((key, value)) = port {
            self.server.port = parse_env(key, &value)?;
        }
        let cors = read_env("ABMDESK_SERVER_CORS_ALLOW_ORIGIN").or_else(|| read_env("CORS_ORIGIN"));
        if let Some(value) = cors {
            self.server.cors_allow_origin = value;
        }
        if let Some(value) = read_env("ABMDESK_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_env("ABMDESK_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("ABMDESK_API_TARGET") {
            self.api.target = value.parse()?;
        }
        if let Some(value) = read_env("ABMDESK_API_LOCAL_BASE_URL") {
            self.api.local_base_url = value;
        }
        if let Some(value) = read_env("ABMDESK_API_WORKFLOW_BASE_URL") {
            self.api.workflow_base_url = Some(value);
        }
        if let Some(value) = read_env("ABMDESK_API_TIMEOUT_SECS") {
            self.api.timeout_secs = parse_env("ABMDESK_API_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("ABMDESK_SESSION_PATH") {
            self.session.path = PathBuf::from(value);
        }

        let log_level =
            read_env("ABMDESK_LOGGING_LEVEL").or_else(|| read_env("ABMDESK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("ABMDESK_LOGGING_FORMAT").or_else(|| read_env("ABMDESK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(target) = overrides.api_target {
            self.api.target = target;
        }
        if let Some(base_url) = overrides.api_base_url {
            match self.api.target {
                ApiTarget::Local => self.api.local_base_url = base_url,
                ApiTarget::Workflow => self.api.workflow_base_url = Some(base_url),
            }
        }
        if let Some(path) = overrides.session_path {
            self.session.path = path;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_api(&self.api)?;
        validate_session(&self.session)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("abmdesk.toml"), PathBuf::from("config/abmdesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Expands `${VAR}` references from the process environment.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let end = tail.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &tail[..end];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        output.push_str(&value);
        rest = &tail[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if !is_http_url(&server.cors_allow_origin) {
        return Err(ConfigError::Validation(
            "server.cors_allow_origin must start with http:// or https://".to_string(),
        ));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_api(api: &ApiConfig) -> Result<(), ConfigError> {
    if api.timeout_secs == 0 || api.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "api.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    match api.target {
        ApiTarget::Local => {
            if !is_http_url(&api.local_base_url) {
                return Err(ConfigError::Validation(
                    "api.local_base_url must start with http:// or https://".to_string(),
                ));
            }
        }
        ApiTarget::Workflow => {
            let valid = api.workflow_base_url.as_deref().map(is_http_url).unwrap_or(false);
            if !valid {
                return Err(ConfigError::Validation(
                    "api.workflow_base_url is required when api.target is `workflow` and must start with http:// or https://".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn validate_session(session: &SessionConfig) -> Result<(), ConfigError> {
    if session.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("session.path must not be empty".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("http://") || value.starts_with("https://")
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    api: Option<ApiPatch>,
    session: Option<SessionPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    cors_allow_origin: Option<String>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiPatch {
    target: Option<ApiTarget>,
    local_base_url: Option<String>,
    workflow_base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
