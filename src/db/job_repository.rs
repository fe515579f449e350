use sqlx::{Pool, Postgres};
use tracing::debug;

use crate::db::models::{EmployerJobCount, JobRow, JobSummary};
use crate::error::{Error, Result};

/// Read-only analytical queries over the `jobs` table
///
/// Every query borrows a pooled connection for its own duration only, so the
/// queries are independent: one failing does not affect the others.
pub struct JobRepository;

impl JobRepository {
    /// Number of jobs per employer. Row order is unspecified.
    pub async fn employers_with_job_counts(
        pool: &Pool<Postgres>,
    ) -> Result<Vec<EmployerJobCount>> {
        let rows = sqlx::query_as::<_, EmployerJobCount>(
            "SELECT employer_name, COUNT(*) AS job_count FROM jobs GROUP BY employer_name",
        )
        .fetch_all(pool)
        .await
        .map_err(Error::query("employers with job counts"))?;

        debug!("Counted jobs for {} employers", rows.len());
        Ok(rows)
    }

    /// Every stored job, in storage order
    pub async fn all_jobs(pool: &Pool<Postgres>) -> Result<Vec<JobRow>> {
        sqlx::query_as::<_, JobRow>(
            r#"
            SELECT job_id, job_title, city, salary, currency, description,
                   publish_date, experience, job_url, employer_name
            FROM jobs
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(Error::query("all jobs"))
    }

    /// Mean salary over all jobs, zero salaries included.
    /// `None` when there are no jobs.
    pub async fn average_salary(pool: &Pool<Postgres>) -> Result<Option<f64>> {
        sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(salary)::float8 FROM jobs")
            .fetch_one(pool)
            .await
            .map_err(Error::query("average salary"))
    }

    /// Jobs paying strictly more than the average salary, by title descending
    pub async fn jobs_above_average_salary(pool: &Pool<Postgres>) -> Result<Vec<JobSummary>> {
        sqlx::query_as::<_, JobSummary>(
            r#"
            SELECT job_title, salary, currency, job_url, experience
            FROM jobs
            WHERE salary > (SELECT AVG(salary) FROM jobs)
            ORDER BY job_title DESC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(Error::query("jobs above average salary"))
    }

    /// Jobs whose title contains `keyword`, ignoring case. Empty when none match.
    pub async fn jobs_by_keyword(pool: &Pool<Postgres>, keyword: &str) -> Result<Vec<JobSummary>> {
        let pattern = format!("%{}%", escape_like(keyword));
        debug!("Searching job titles with pattern {}", pattern);

        sqlx::query_as::<_, JobSummary>(
            r#"
            SELECT job_title, salary, currency, job_url, experience
            FROM jobs
            WHERE job_title ILIKE $1
            "#,
        )
        .bind(pattern)
        .fetch_all(pool)
        .await
        .map_err(Error::query("jobs by keyword"))
    }
}

/// Escape LIKE wildcards so the keyword matches literally.
/// Backslash is the default LIKE escape character in PostgreSQL.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_leaves_plain_words_alone() {
        assert_eq!(escape_like("driver"), "driver");
        assert_eq!(escape_like("Водитель"), "Водитель");
    }

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("c_level"), "c\\_level");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
