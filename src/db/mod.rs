pub mod connection;
pub mod job_repository;
pub mod loader;
pub mod migrations;
pub mod models;
pub mod schema;

pub use connection::{get_connection, PgServer};
pub use job_repository::JobRepository;
pub use loader::{save, LoadSummary};
pub use schema::{create_schema, provision, DatabaseName};
