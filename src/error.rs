pub type Result<T> = std::result::Result<T, Error>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the ingestion pipeline, grouped by the stage that fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid database name '{0}': only letters, digits and underscores are allowed")]
    InvalidIdentifier(String),

    #[error("Listing source unavailable for employer {employer_id}: {source}")]
    SourceUnavailable {
        employer_id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Database {0} not found")]
    DatabaseMissing(String),

    #[error("Schema error in database {database}: {source}")]
    Schema {
        database: String,
        #[source]
        source: BoxError,
    },

    #[error("Database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Batch load failed and was rolled back: {0}")]
    PersistenceFailure(#[source] sqlx::Error),

    #[error("Query '{query}' failed: {source}")]
    QueryFailure {
        query: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl Error {
    pub(crate) fn schema(database: &str, source: impl Into<BoxError>) -> Self {
        Error::Schema {
            database: database.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn query(query: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Error::QueryFailure { query, source }
    }

    /// Short name of the pipeline stage the error belongs to, used in logs
    /// and in the message printed before a non-zero exit.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Config(_) => "configuration",
            Error::InvalidIdentifier(_) => "provisioning",
            Error::SourceUnavailable { .. } => "fetching postings",
            Error::DatabaseMissing(_) | Error::Schema { .. } => "schema setup",
            Error::Connection(_) => "connecting",
            Error::PersistenceFailure(_) => "loading data",
            Error::QueryFailure { .. } => "querying",
        }
    }
}
