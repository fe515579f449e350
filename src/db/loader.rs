use sqlx::{Pool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::models::{Employer, Job};

/// Rows per multi-row INSERT; keeps bind parameters well under the
/// PostgreSQL limit of 65535 per statement.
const ROWS_PER_STATEMENT: usize = 1000;

/// Rows inserted by one batch load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub employers: u64,
    pub jobs: u64,
}

/// Load one full batch in a single transaction
///
/// Employers are inserted before jobs so every `jobs.employer_name` can
/// reference a row of the same batch. The transaction commits only if every
/// insert succeeds; otherwise it is rolled back and nothing from the batch
/// remains.
pub async fn save(
    pool: &Pool<Postgres>,
    employers: &[Employer],
    jobs: &[Job],
) -> Result<LoadSummary> {
    info!(
        "Loading batch of {} employers and {} jobs",
        employers.len(),
        jobs.len()
    );

    let mut tx = pool.begin().await.map_err(Error::PersistenceFailure)?;

    match insert_batch(&mut tx, employers, jobs).await {
        Ok(summary) => {
            tx.commit().await.map_err(Error::PersistenceFailure)?;
            info!(
                "Batch committed: {} employers, {} jobs",
                summary.employers, summary.jobs
            );
            Ok(summary)
        }
        Err(e) => {
            error!("Batch load failed, rolling back: {}", e);
            if let Err(rollback) = tx.rollback().await {
                warn!("Rollback did not complete cleanly: {:?}", rollback);
            }
            Err(Error::PersistenceFailure(e))
        }
    }
}

async fn insert_batch(
    tx: &mut Transaction<'_, Postgres>,
    employers: &[Employer],
    jobs: &[Job],
) -> std::result::Result<LoadSummary, sqlx::Error> {
    let mut summary = LoadSummary::default();

    for chunk in employers.chunks(ROWS_PER_STATEMENT) {
        let mut query =
            QueryBuilder::<Postgres>::new("INSERT INTO employers (employer_name, employer_url) ");
        query.push_values(chunk, |mut row, employer| {
            row.push_bind(&employer.name).push_bind(&employer.url);
        });
        summary.employers += query.build().execute(&mut **tx).await?.rows_affected();
    }
    debug!("Inserted {} employer rows", summary.employers);

    for chunk in jobs.chunks(ROWS_PER_STATEMENT) {
        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO jobs (job_title, city, salary, currency, description, \
             publish_date, experience, job_url, employer_name) ",
        );
        query.push_values(chunk, |mut row, job| {
            row.push_bind(&job.title)
                .push_bind(&job.city)
                .push_bind(job.salary)
                .push_bind(&job.currency)
                .push_bind(&job.description)
                .push_bind(job.publish_date)
                .push_bind(&job.experience)
                .push_bind(&job.url)
                .push_bind(&job.employer_name);
        });
        summary.jobs += query.build().execute(&mut **tx).await?.rows_affected();
    }
    debug!("Inserted {} job rows", summary.jobs);

    Ok(summary)
}
