//! Handles settings for the application. Configuration is read from a TOML
//! file (default `settings.toml`) layered with `APP_*` environment
//! variables, e.g. `APP_SERVER__PORT=8080`. Every field has a working
//! default, so the binary starts without any configuration at all.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    /// Log level directive applied to the workspace crates.
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        App {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            bind: None,
            port: 8000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
    pub idle_timeout_secs: u64,
    /// Interval between background liveness pings. `0` disables the probe.
    pub keepalive_secs: u64,
}

impl Default for Database {
    fn default() -> Self {
        Database {
            url: "sqlite:./centavo.db?mode=rwc".to_string(),
            max_connections: 5,
            idle_timeout_secs: 300,
            keepalive_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Auth {
    pub session_ttl_minutes: i64,
}

impl Default for Auth {
    fn default() -> Self {
        Auth {
            session_ttl_minutes: 30,
        }
    }
}

/// Relay used for mailing reports. The defaults let the server start
/// without a relay; delivery then fails per request, nothing else does.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Smtp {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl Default for Smtp {
    fn default() -> Self {
        Smtp {
            host: "localhost".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from: "centavo@localhost".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
    pub auth: Auth,
    pub smtp: Smtp,
}

impl Settings {
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(config_file).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_section() {
        let settings = Settings::new("does-not-exist").unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.database.max_connections, 5);
        assert_eq!(settings.database.keepalive_secs, 30);
        assert_eq!(settings.auth.session_ttl_minutes, 30);
        assert_eq!(settings.smtp.port, 587);
    }
}
