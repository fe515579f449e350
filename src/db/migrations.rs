use sqlx::PgConnection;
use tracing::debug;

/// Create the `employers` and `jobs` tables
///
/// The SQL files under `migrations/` are embedded at compile time and
/// applied to the connection's database. Called once on a freshly
/// provisioned database, so every migration is always pending.
///
/// sqlx records what it applied in a `_sqlx_migrations` table, so the
/// database holds that bookkeeping table next to `employers` and `jobs`.
pub async fn run_migrations(
    conn: &mut PgConnection,
) -> Result<(), sqlx::migrate::MigrateError> {
    debug!("Applying embedded schema migrations");

    sqlx::migrate!("./migrations").run(conn).await?;

    debug!("Schema migrations applied");
    Ok(())
}
