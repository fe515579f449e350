use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use sqlx::{Connection, PgConnection};
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};

use super::connection::PgServer;
use super::migrations;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("identifier pattern is valid"));

/// A database name that passed the allow-list and can be spliced into
/// `CREATE DATABASE` / `DROP DATABASE`, which take no bind parameters.
///
/// Stored lowercased, the way PostgreSQL folds an unquoted identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseName(String);

impl DatabaseName {
    pub fn parse(raw: &str) -> Result<Self> {
        if !IDENTIFIER.is_match(raw) {
            return Err(Error::InvalidIdentifier(raw.to_string()));
        }
        Ok(Self(raw.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drop and recreate the target database
///
/// The name is validated before anything is sent to the server. Any data in
/// an existing database of that name is lost.
#[instrument(skip(server))]
pub async fn provision(server: &PgServer, raw_name: &str) -> Result<DatabaseName> {
    let name = DatabaseName::parse(raw_name)?;

    let mut conn = PgConnection::connect_with(&server.maintenance())
        .await
        .map_err(|e| Error::schema(name.as_str(), e))?;

    let outcome = recreate(&mut conn, &name).await;
    close(conn).await;
    outcome.map_err(|e| Error::schema(name.as_str(), e))?;

    info!("Database {} recreated", name);
    Ok(name)
}

async fn recreate(
    conn: &mut PgConnection,
    name: &DatabaseName,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::raw_sql(&format!("DROP DATABASE IF EXISTS {}", name))
        .execute(&mut *conn)
        .await?;
    sqlx::raw_sql(&format!("CREATE DATABASE {}", name))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Create the `employers` and `jobs` tables in a provisioned database
///
/// Fails with [`Error::DatabaseMissing`] when the database was never
/// provisioned, instead of creating tables somewhere else.
#[instrument(skip(server))]
pub async fn create_schema(server: &PgServer, name: &DatabaseName) -> Result<()> {
    let mut conn = PgConnection::connect_with(&server.maintenance())
        .await
        .map_err(|e| Error::schema(name.as_str(), e))?;

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM pg_catalog.pg_database WHERE datname = $1)",
    )
    .bind(name.as_str())
    .fetch_one(&mut conn)
    .await;
    close(conn).await;

    if !exists.map_err(|e| Error::schema(name.as_str(), e))? {
        return Err(Error::DatabaseMissing(name.to_string()));
    }

    let mut conn = PgConnection::connect_with(&server.database(name))
        .await
        .map_err(|e| Error::schema(name.as_str(), e))?;
    let outcome = migrations::run_migrations(&mut conn).await;
    close(conn).await;
    outcome.map_err(|e| Error::schema(name.as_str(), e))?;

    info!("Tables employers and jobs created in {}", name);
    Ok(())
}

async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close maintenance connection cleanly: {:?}", e);
    }
}
