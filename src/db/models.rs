use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// Database representation of a job with all fields
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct JobRow {
    pub job_id: i32,
    pub job_title: String,
    pub city: Option<String>,
    pub salary: i32,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub publish_date: Option<NaiveDate>,
    pub experience: Option<String>,
    pub job_url: Option<String>,
    pub employer_name: String,
}

/// Number of stored jobs for one employer
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct EmployerJobCount {
    pub employer_name: String,
    pub job_count: i64,
}

/// Projection returned by the salary-threshold and keyword queries
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct JobSummary {
    pub job_title: String,
    pub salary: i32,
    pub currency: Option<String>,
    pub job_url: Option<String>,
    pub experience: Option<String>,
}
