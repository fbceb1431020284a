//! Settings for the application, read from an optional `settings.toml` in
//! the working directory and overridden by `COHABIT__*` environment
//! variables (`COHABIT__SERVER__PORT=8080`).
//!
//! ```toml
//! [app]
//! level = "debug"
//!
//! [server]
//! bind = "0.0.0.0"
//! port = 3000
//! database = { sqlite = "cohabit.db" }
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("COHABIT").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn sqlite_server_settings() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            port = 3000
            database = { sqlite = "cohabit.db" }
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.port, 3000);
        assert!(server.bind.is_none());
        assert!(matches!(server.database, Database::Sqlite(path) if path == "cohabit.db"));
    }

    #[test]
    fn memory_database_and_default_level() {
        let settings = parse(
            r#"
            [server]
            bind = "0.0.0.0"
            port = 8080
            database = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "info");
        assert!(matches!(settings.server.unwrap().database, Database::Memory));
    }

    #[test]
    fn server_is_optional() {
        let settings = parse("").unwrap();
        assert!(settings.server.is_none());
    }
}
