//! Turns raw postings into canonical [`Employer`] and [`Job`] records.
//!
//! Everything here is pure: no I/O and no lookups against stored employers.
//! The foreign key on `jobs.employer_name` is what enforces that a job's
//! employer exists.

use chrono::{DateTime, NaiveDate};

use crate::models::{Employer, Job};
use crate::source::models::{RawPosting, RawSalary};

/// Why a posting could not become a job record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Incomplete {
    #[error("posting has no title")]
    MissingTitle,
    #[error("posting has no employer name")]
    MissingEmployer,
}

/// Normalize one posting into a job record.
///
/// Missing nested objects become `None`. Only the title and the employer
/// name are required, since the `jobs` table cannot hold a row without them.
pub fn normalize_job(posting: &RawPosting) -> Result<Job, Incomplete> {
    let title = non_empty(posting.name.as_deref())
        .ok_or(Incomplete::MissingTitle)?;
    let employer_name = posting
        .employer
        .as_ref()
        .and_then(|e| non_empty(e.name.as_deref()))
        .ok_or(Incomplete::MissingEmployer)?;

    let (salary, currency) = normalize_salary(posting.salary.as_ref());

    Ok(Job {
        title,
        city: posting.area.as_ref().and_then(|a| a.name.clone()),
        salary,
        currency,
        description: posting
            .snippet
            .as_ref()
            .and_then(|s| s.responsibility.clone()),
        publish_date: posting.published_at.as_deref().and_then(parse_publish_date),
        experience: posting.experience.as_ref().and_then(|e| e.name.clone()),
        url: posting.alternate_url.clone(),
        employer_name,
    })
}

/// Employer metadata carried by a posting, if the posting names one.
pub fn employer_of(posting: &RawPosting) -> Option<Employer> {
    let employer = posting.employer.as_ref()?;
    Some(Employer {
        name: non_empty(employer.name.as_deref())?,
        url: employer.alternate_url.clone(),
    })
}

/// Salary policy, first match wins:
/// no salary object gives 0 and no currency; a single bound gives that bound;
/// both bounds give their mean, truncated toward zero.
/// An object with neither bound gives 0 but keeps its currency.
pub fn normalize_salary(salary: Option<&RawSalary>) -> (i32, Option<String>) {
    let Some(salary) = salary else {
        return (0, None);
    };

    let amount = match (salary.from, salary.to) {
        (None, Some(upper)) => i128::from(upper),
        (Some(lower), None) => i128::from(lower),
        (Some(lower), Some(upper)) => (i128::from(lower) + i128::from(upper)) / 2,
        (None, None) => 0,
    };

    (saturate(amount), salary.currency.clone())
}

/// `published_at` looks like `2024-03-05T23:10:00+0300`. The date is taken in
/// the posting's own offset, the same way PostgreSQL casts it to `DATE`.
pub fn parse_publish_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|published| published.date_naive())
        .ok()
        .or_else(|| {
            raw.get(..10)
                .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        })
}

fn saturate(amount: i128) -> i32 {
    let bound = if amount < 0 { i32::MIN } else { i32::MAX };
    i32::try_from(amount).unwrap_or(bound)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn posting(value: serde_json::Value) -> RawPosting {
        serde_json::from_value(value).unwrap()
    }

    fn salary(from: Option<i64>, to: Option<i64>) -> RawSalary {
        RawSalary {
            from,
            to,
            currency: Some("RUR".to_string()),
        }
    }

    fn amount(from: Option<i64>, to: Option<i64>) -> i32 {
        normalize_salary(Some(&salary(from, to))).0
    }

    #[test]
    fn both_bounds_give_truncated_mean() {
        assert_eq!(amount(Some(100), Some(200)), 150);
        assert_eq!(amount(Some(100), Some(201)), 150);
        assert_eq!(
            normalize_salary(Some(&salary(Some(80_000), Some(120_000)))),
            (100_000, Some("RUR".to_string()))
        );
    }

    #[test]
    fn single_bound_is_used_as_is() {
        assert_eq!(amount(None, Some(90_000)), 90_000);
        assert_eq!(amount(Some(45_000), None), 45_000);
    }

    #[test]
    fn missing_salary_is_zero_without_currency() {
        assert_eq!(normalize_salary(None), (0, None));
    }

    #[test]
    fn salary_object_without_bounds_is_zero() {
        assert_eq!(
            normalize_salary(Some(&salary(None, None))),
            (0, Some("RUR".to_string()))
        );
    }

    #[test]
    fn oversized_salary_saturates() {
        assert_eq!(amount(Some(i64::MAX / 2), None), i32::MAX);
        assert_eq!(amount(Some(i64::MAX - 1), Some(i64::MAX - 1)), i32::MAX);
        assert_eq!(amount(Some(i64::MIN), Some(i64::MIN)), i32::MIN);
    }

    #[test]
    fn mean_of_huge_bounds_does_not_wrap() {
        let lower = i64::from(i32::MAX) * 4;
        assert_eq!(amount(Some(lower), Some(i64::MAX)), i32::MAX);
        assert_eq!(amount(Some(i64::MIN), Some(i64::MAX)), 0);
    }

    #[test]
    fn maps_a_complete_posting() {
        let job = normalize_job(&posting(json!({
            "name": "Senior Driver",
            "area": {"id": "1", "name": "Москва"},
            "salary": {"from": 100000, "to": 150000, "currency": "RUR", "gross": false},
            "snippet": {"requirement": "B license", "responsibility": "Deliver goods"},
            "published_at": "2024-03-05T23:10:00+0300",
            "experience": {"id": "noExperience", "name": "No experience"},
            "alternate_url": "https://hh.ru/vacancy/1",
            "employer": {
                "id": "80",
                "name": "Альфа-Банк",
                "alternate_url": "https://hh.ru/employer/80"
            }
        })))
        .unwrap();

        assert_eq!(job.title, "Senior Driver");
        assert_eq!(job.city.as_deref(), Some("Москва"));
        assert_eq!(job.salary, 125_000);
        assert_eq!(job.currency.as_deref(), Some("RUR"));
        assert_eq!(job.description.as_deref(), Some("Deliver goods"));
        assert_eq!(job.publish_date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(job.experience.as_deref(), Some("No experience"));
        assert_eq!(job.url.as_deref(), Some("https://hh.ru/vacancy/1"));
        assert_eq!(job.employer_name, "Альфа-Банк");
    }

    #[test]
    fn tolerates_missing_nested_objects() {
        let job = normalize_job(&posting(json!({
            "name": "Accountant",
            "salary": null,
            "snippet": null,
            "employer": {"name": "Ozon"}
        })))
        .unwrap();

        assert_eq!(job.salary, 0);
        assert_eq!(job.currency, None);
        assert_eq!(job.description, None);
        assert_eq!(job.city, None);
        assert_eq!(job.experience, None);
        assert_eq!(job.publish_date, None);
    }

    #[test]
    fn rejects_postings_without_title_or_employer() {
        let untitled = posting(json!({"employer": {"name": "Ozon"}}));
        assert_eq!(normalize_job(&untitled), Err(Incomplete::MissingTitle));

        let orphan = posting(json!({"name": "Courier", "employer": {"name": "  "}}));
        assert_eq!(normalize_job(&orphan), Err(Incomplete::MissingEmployer));
    }

    #[test]
    fn employer_comes_from_the_posting() {
        let raw = posting(json!({
            "employer": {"name": "VK", "alternate_url": "https://hh.ru/employer/15478"}
        }));
        assert_eq!(
            employer_of(&raw),
            Some(Employer {
                name: "VK".to_string(),
                url: Some("https://hh.ru/employer/15478".to_string()),
            })
        );
        assert_eq!(employer_of(&RawPosting::default()), None);
    }

    #[test]
    fn publish_date_accepts_both_offset_styles() {
        let expected = NaiveDate::from_ymd_opt(2023, 12, 31);
        assert_eq!(parse_publish_date("2023-12-31T08:00:00+0300"), expected);
        assert_eq!(parse_publish_date("2023-12-31T08:00:00+03:00"), expected);
        assert_eq!(parse_publish_date("2023-12-31"), expected);
        assert_eq!(parse_publish_date("yesterday"), None);
    }
}
