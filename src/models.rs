use chrono::NaiveDate;
use serde::Serialize;

/// Canonical employer record. `name` is the business key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employer {
    pub name: String,
    pub url: Option<String>,
}

/// Canonical job record, ready to be inserted into `jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub title: String,
    pub city: Option<String>,
    /// Normalized salary; 0 when the posting has no salary data.
    pub salary: i32,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub publish_date: Option<NaiveDate>,
    pub experience: Option<String>,
    pub url: Option<String>,
    pub employer_name: String,
}

/// Everything one run fetched: employers and the jobs referencing them.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub employers: Vec<Employer>,
    pub jobs: Vec<Job>,
}
