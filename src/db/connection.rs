use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Error, Pool, Postgres};

use crate::config::DatabaseSettings;

use super::schema::DatabaseName;

/// A PostgreSQL server plus the maintenance database used for
/// server-level statements such as `CREATE DATABASE`.
#[derive(Clone, Debug)]
pub struct PgServer {
    options: PgConnectOptions,
    maintenance_db: String,
}

impl PgServer {
    pub fn new(options: PgConnectOptions, maintenance_db: impl Into<String>) -> Self {
        Self {
            options,
            maintenance_db: maintenance_db.into(),
        }
    }

    pub fn from_settings(settings: &DatabaseSettings) -> Self {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password);
        Self::new(options, settings.maintenance_name.clone())
    }

    /// Options for the maintenance database.
    pub fn maintenance(&self) -> PgConnectOptions {
        self.options.clone().database(&self.maintenance_db)
    }

    /// Options for a provisioned target database.
    pub fn database(&self, name: &DatabaseName) -> PgConnectOptions {
        self.options.clone().database(name.as_str())
    }
}

/// Create a PostgreSQL connection pool for the target database
///
/// # Parameters
/// - `server`: server the database lives on
/// - `database`: validated database name
/// - `max_connections`: upper bound of pooled connections
pub async fn get_connection(
    server: &PgServer,
    database: &DatabaseName,
    max_connections: u32,
) -> Result<Pool<Postgres>, Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(server.database(database))
        .await
}
