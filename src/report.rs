use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::{Pool, Postgres};
use tracing::{error, info};

use crate::db::models::{EmployerJobCount, JobRow, JobSummary};
use crate::db::JobRepository;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Results of the five analytical queries. Each query succeeds or fails on
/// its own; a failure is kept in place of that section's rows.
pub struct Report {
    pub employer_job_counts: Result<Vec<EmployerJobCount>>,
    pub all_jobs: Result<Vec<JobRow>>,
    pub average_salary: Result<Option<f64>>,
    pub above_average: Result<Vec<JobSummary>>,
    pub keyword: String,
    pub keyword_matches: Result<Vec<JobSummary>>,
}

impl Report {
    /// Run every query against the loaded database.
    pub async fn gather(pool: &Pool<Postgres>, keyword: &str) -> Self {
        info!("Running report queries");
        let report = Report {
            employer_job_counts: logged(JobRepository::employers_with_job_counts(pool).await),
            all_jobs: logged(JobRepository::all_jobs(pool).await),
            average_salary: logged(JobRepository::average_salary(pool).await),
            above_average: logged(JobRepository::jobs_above_average_salary(pool).await),
            keyword: keyword.to_string(),
            keyword_matches: logged(JobRepository::jobs_by_keyword(pool, keyword).await),
        };
        info!("Report finished with {} failed queries", report.failures());
        report
    }

    pub fn failures(&self) -> usize {
        [
            self.employer_job_counts.is_err(),
            self.all_jobs.is_err(),
            self.average_salary.is_err(),
            self.above_average.is_err(),
            self.keyword_matches.is_err(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }

    pub fn render(&self, format: OutputFormat, out: &mut impl Write) -> io::Result<()> {
        match format {
            OutputFormat::Text => self.render_text(out),
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, &self.to_json())?;
                writeln!(out)
            }
        }
    }

    fn render_text(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "Employers and the number of their jobs:")?;
        section(out, &self.employer_job_counts, |out, rows| {
            for row in rows {
                writeln!(out, "  {}: {}", row.employer_name, row.job_count)?;
            }
            Ok(())
        })?;

        writeln!(out, "\nAll jobs:")?;
        section(out, &self.all_jobs, |out, rows| {
            for job in rows {
                writeln!(
                    out,
                    "  #{} {} | {} | {} | {} | {} | {} | {}",
                    job.job_id,
                    job.job_title,
                    job.employer_name,
                    job.city.as_deref().unwrap_or("-"),
                    money(job.salary, job.currency.as_deref()),
                    job.publish_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    job.experience.as_deref().unwrap_or("-"),
                    job.job_url.as_deref().unwrap_or("-"),
                )?;
            }
            Ok(())
        })?;

        writeln!(out, "\nAverage salary:")?;
        section(out, &self.average_salary, |out, average| match average {
            Some(average) => writeln!(out, "  {:.2}", average),
            None => writeln!(out, "  no jobs loaded"),
        })?;

        writeln!(out, "\nJobs with a salary above the average:")?;
        section(out, &self.above_average, |out, rows| summaries(out, rows))?;

        writeln!(out, "\nJobs with '{}' in the title:", self.keyword)?;
        section(out, &self.keyword_matches, |out, rows| {
            if rows.is_empty() {
                writeln!(out, "  No jobs found")
            } else {
                summaries(out, rows)
            }
        })
    }

    fn to_json(&self) -> Value {
        json!({
            "employers_with_job_counts": json_section(&self.employer_job_counts),
            "all_jobs": json_section(&self.all_jobs),
            "average_salary": json_section(&self.average_salary),
            "jobs_above_average_salary": json_section(&self.above_average),
            "keyword": self.keyword,
            "jobs_by_keyword": json_section(&self.keyword_matches),
        })
    }
}

fn logged<T>(result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

fn section<W: Write, T>(
    out: &mut W,
    result: &Result<T>,
    body: impl FnOnce(&mut W, &T) -> io::Result<()>,
) -> io::Result<()> {
    match result {
        Ok(value) => body(out, value),
        Err(e) => writeln!(out, "  unavailable: {}", e),
    }
}

fn summaries(out: &mut impl Write, rows: &[JobSummary]) -> io::Result<()> {
    for job in rows {
        writeln!(
            out,
            "  {} | {} | {} | {}",
            job.job_title,
            money(job.salary, job.currency.as_deref()),
            job.experience.as_deref().unwrap_or("-"),
            job.job_url.as_deref().unwrap_or("-"),
        )?;
    }
    Ok(())
}

fn money(salary: i32, currency: Option<&str>) -> String {
    match currency {
        Some(currency) => format!("{} {}", salary, currency),
        None => salary.to_string(),
    }
}

fn json_section<T: Serialize>(result: &Result<T>) -> Value {
    match result {
        Ok(value) => serde_json::to_value(value)
            .unwrap_or_else(|e| json!({ "error": e.to_string() })),
        Err(e) => json!({ "error": e.to_string() }),
    }
}
