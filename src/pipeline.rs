use sqlx::{Pool, Postgres};
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::db::{self, DatabaseName, LoadSummary, PgServer};
use crate::error::{Error, Result};
use crate::source::ListingSource;

/// Runs the stages of one ingestion: harvest, provision, schema, load.
///
/// Every stage returns its error to the caller unchanged; nothing is retried
/// and nothing is logged-and-ignored.
pub struct Pipeline {
    server: PgServer,
    database_name: String,
    max_connections: u32,
    source: ListingSource,
}

impl Pipeline {
    /// Build the pipeline from configuration. `database_override` replaces
    /// the configured database name when given.
    pub fn new(config: &Config, database_override: Option<String>) -> Result<Self> {
        Ok(Self {
            server: PgServer::from_settings(&config.database),
            database_name: database_override
                .unwrap_or_else(|| config.database_name.clone()),
            max_connections: config.database.max_connections,
            source: ListingSource::new(&config.source, config.employers.clone())?,
        })
    }

    /// Fetch every employer, recreate the database and load the batch.
    ///
    /// Postings are fetched before the database is dropped, so a listing
    /// failure leaves the previous dataset in place. Returns a pool on the
    /// freshly loaded database.
    #[instrument(skip(self), fields(database = %self.database_name))]
    pub async fn ingest(&self) -> Result<(Pool<Postgres>, LoadSummary)> {
        info!(
            "Starting ingestion for {} employers",
            self.source.employers().len()
        );
        let harvest = self.source.harvest().await?;

        let name = db::provision(&self.server, &self.database_name).await?;
        db::create_schema(&self.server, &name).await?;

        let pool = self.open_pool(&name).await?;
        match db::save(&pool, &harvest.employers, &harvest.jobs).await {
            Ok(summary) => Ok((pool, summary)),
            Err(e) => {
                pool.close().await;
                Err(e)
            }
        }
    }

    /// Connect to an already loaded database without touching its contents.
    pub async fn connect(&self) -> Result<Pool<Postgres>> {
        let name = DatabaseName::parse(&self.database_name)?;
        self.open_pool(&name).await
    }

    async fn open_pool(&self, name: &DatabaseName) -> Result<Pool<Postgres>> {
        let pool = db::get_connection(&self.server, name, self.max_connections)
            .await
            .map_err(|e| {
                error!("Failed to connect to database {}: {}", name, e);
                Error::Connection(e)
            })?;
        info!("Database connection pool established for {}", name);
        Ok(pool)
    }
}
