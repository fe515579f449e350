use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::source::EmployerDirectory;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// PostgreSQL server connection parameters
    pub database: DatabaseSettings,

    /// Display name of the database the run provisions and loads.
    /// Lowercased and validated before use.
    /// Default: CompanyJobs
    pub database_name: String,

    /// Listing API settings
    pub source: SourceSettings,

    /// Employers to ingest, in fetch order
    pub employers: EmployerDirectory,

    /// Directory for rolling log files
    /// Default: logs
    pub log_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Database used to issue DROP/CREATE DATABASE. Default: postgres
    pub maintenance_name: String,
    /// Default: 5
    pub max_connections: u32,
}

#[derive(Clone, Debug)]
pub struct SourceSettings {
    /// Default: https://api.hh.ru/vacancies
    pub api_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Required environment variables:
    /// - DB_USER, DB_PASSWORD: PostgreSQL credentials
    ///
    /// Optional environment variables:
    /// - DB_HOST (localhost), DB_PORT (5432), DB_MAINTENANCE_NAME (postgres)
    /// - DB_NAME (CompanyJobs), MAX_DB_CONNECTIONS (5)
    /// - HH_API_URL, HH_USER_AGENT, HH_TIMEOUT_SECS (30)
    /// - HH_EMPLOYERS: `Name=id,Name=id` list replacing the built-in employers
    /// - LOG_DIR (logs)
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let database = DatabaseSettings {
            host: env_or("DB_HOST", "localhost"),
            port: env_parse_or("DB_PORT", 5432)?,
            user: get_env("DB_USER")?,
            password: get_env("DB_PASSWORD")?,
            maintenance_name: env_or("DB_MAINTENANCE_NAME", "postgres"),
            max_connections: env_parse_or("MAX_DB_CONNECTIONS", 5)?,
        };

        let source = SourceSettings {
            api_url: env_or("HH_API_URL", "https://api.hh.ru/vacancies"),
            user_agent: env_or(
                "HH_USER_AGENT",
                concat!("company-jobs/", env!("CARGO_PKG_VERSION")),
            ),
            timeout: Duration::from_secs(env_parse_or("HH_TIMEOUT_SECS", 30)?),
        };

        let employers = match env::var("HH_EMPLOYERS") {
            Ok(raw) => EmployerDirectory::parse(&raw)?,
            Err(_) => EmployerDirectory::default(),
        };

        Ok(Config {
            database,
            database_name: env_or("DB_NAME", "CompanyJobs"),
            source,
            employers,
            log_dir: PathBuf::from(env_or("LOG_DIR", "logs")),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name)
        .map_err(|_| Error::Config(format!("{} must be set in .env file or environment", name)))
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}
