use std::str::FromStr;

use anyhow::Result;
use anyhow::anyhow;
use chrono::FixedOffset;
use serde::Deserialize;

/// Status labels used when `[tasks] statuses` is not configured.
pub const DEFAULT_STATUSES: [&str; 4] = ["Pending", "In Progress", "Completed", "Cancelled"];

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub tasks: TaskSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

/// Application-wide settings that are not tied to a single subsystem.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// Server time zone as a fixed UTC offset, e.g. `+02:00`.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

impl Default for AppSettings {
    fn default() -> Self { Self { utc_offset: default_utc_offset() } }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskSettings {
    /// Ordered status labels shared by tasks and subtasks.
    #[serde(default = "default_statuses")]
    pub statuses: Vec<String>,
}

impl Default for TaskSettings {
    fn default() -> Self { Self { statuses: default_statuses() } }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_utc_offset() -> String { "+00:00".into() }
fn default_statuses() -> Vec<String> { DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect() }

/// `CONFIG_PATH`, defaulting to `config.toml`.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

/// Parse `path` if it exists. `Ok(None)` only when the file is missing;
/// unreadable or malformed files are errors.
pub fn load_if_present(path: &str) -> Result<Option<AppConfig>> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse(&content).map(Some).map_err(|e| e.context(format!("invalid config file {path}"))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow::Error::new(e).context(format!("cannot read config file {path}"))),
    }
}

/// Config file if present, otherwise defaults filled from the environment. Not validated.
pub fn load_file_or_env(path: &str) -> Result<AppConfig> {
    Ok(load_if_present(path)?.unwrap_or_else(AppConfig::from_env))
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Config file if present, otherwise defaults filled from the environment.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = load_file_or_env(&config_path())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn from_env() -> Self {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") { cfg.server.host = host; }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        cfg.database = DatabaseConfig::from_env();
        if let Ok(offset) = std::env::var("APP_UTC_OFFSET") { cfg.app.utc_offset = offset; }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.app.validate()?;
        self.tasks.normalize_and_validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let mut cfg = DatabaseConfig::default();
        cfg.normalize_from_env();
        cfg
    }

    pub fn normalize_from_env(&mut self) {
        // An empty URL in TOML falls back to DATABASE_URL
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.to_lowercase().starts_with("sqlite:")
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AppSettings {
    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::from_str(self.utc_offset.trim())
            .map_err(|e| anyhow!("app.utc_offset `{}` is not a valid UTC offset: {e}", self.utc_offset))
    }

    fn validate(&self) -> Result<()> {
        self.offset().map(|_| ())
    }
}

impl TaskSettings {
    fn normalize_and_validate(&mut self) -> Result<()> {
        let mut seen: Vec<String> = Vec::with_capacity(self.statuses.len());
        for label in self.statuses.drain(..) {
            let label = label.trim().to_string();
            if label.is_empty() {
                return Err(anyhow!("tasks.statuses must not contain empty labels"));
            }
            if seen.contains(&label) {
                return Err(anyhow!("tasks.statuses contains duplicate label `{label}`"));
            }
            seen.push(label);
        }
        if seen.is_empty() {
            return Err(anyhow!("tasks.statuses must list at least one status"));
        }
        self.statuses = seen;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let mut cfg = parse(r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [database]
            url = "sqlite://data/taskboard.db?mode=rwc"

            [app]
            utc_offset = "+02:00"

            [tasks]
            statuses = ["Todo", "Doing", "Done"]
        "#).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert!(cfg.database.is_sqlite());
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.app.offset().unwrap().local_minus_utc(), 7200);
        assert_eq!(cfg.tasks.statuses, vec!["Todo", "Doing", "Done"]);
    }

    #[test]
    fn missing_sections_take_defaults() {
        let cfg = parse(r#"
            [database]
            url = "postgres://localhost/taskboard"
        "#).unwrap();
        assert_eq!(cfg.app.utc_offset, "+00:00");
        assert_eq!(cfg.tasks.statuses.len(), DEFAULT_STATUSES.len());
        assert_eq!(cfg.tasks.statuses[1], "In Progress");
    }

    #[test]
    fn database_section_may_be_omitted() {
        let mut cfg = parse("[server]\nhost = \"127.0.0.1\"\nport = 8080\n").unwrap();
        cfg.database.url = "sqlite::memory:".into();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.database.acquire_timeout_secs, 30);
    }

    #[test]
    fn rejects_unknown_database_scheme() {
        let cfg = DatabaseConfig { url: "mysql://localhost/x".into(), min_connections: 1, max_connections: 2, connect_timeout_secs: 1, acquire_timeout_secs: 1, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_statuses() {
        let mut tasks = TaskSettings { statuses: vec!["Open".into(), " Open ".into()] };
        assert!(tasks.normalize_and_validate().is_err());
    }

    #[test]
    fn rejects_bad_offset() {
        let app = AppSettings { utc_offset: "Europe/Paris".into() };
        assert!(app.offset().is_err());
    }

    fn temp_config(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("taskboard-{}-{name}.toml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_falls_back_to_env_defaults() {
        let path = std::env::temp_dir().join("taskboard-no-such-config.toml");
        assert!(load_if_present(path.to_str().unwrap()).unwrap().is_none());
        let cfg = load_file_or_env(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.tasks.statuses, default_statuses());
    }

    #[test]
    fn malformed_file_is_an_error_not_a_fallback() {
        let path = temp_config("broken", "[tasks]\nstatuses = [\"Todo\", \n");
        let err = load_file_or_env(path.to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid config file"), "{err:#}");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn present_file_is_used() {
        let path = temp_config("custom", "[tasks]\nstatuses = [\"Open\", \"Closed\"]\n");
        let cfg = load_file_or_env(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.tasks.statuses, vec!["Open", "Closed"]);
        std::fs::remove_file(path).ok();
    }
}
