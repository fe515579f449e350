use std::collections::HashSet;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::SourceSettings;
use crate::error::{Error, Result};
use crate::models::{Employer, Harvest, Job};
use crate::normalize::{employer_of, normalize_job};

use super::employers::{EmployerDirectory, EmployerEntry};
use super::models::{RawPosting, VacancyPage};

/// Postings requested per employer. Only the first page is ever read.
pub const PAGE_SIZE: u32 = 100;

/// Client for the hh.ru `/vacancies` listing API.
///
/// Holds no state besides the HTTP client and the employer directory;
/// employers are fetched one after another.
pub struct ListingSource {
    http: Client,
    api_url: String,
    employers: EmployerDirectory,
}

impl ListingSource {
    pub fn new(settings: &SourceSettings, employers: EmployerDirectory) -> Result<Self> {
        let http = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: settings.api_url.clone(),
            employers,
        })
    }

    pub fn employers(&self) -> &EmployerDirectory {
        &self.employers
    }

    /// Fetch up to [`PAGE_SIZE`] postings of one employer, restricted to
    /// postings that publish a salary and to employers with open vacancies.
    #[instrument(skip(self))]
    pub async fn fetch(&self, employer_id: &str) -> Result<Vec<RawPosting>> {
        let unavailable = |source| Error::SourceUnavailable {
            employer_id: employer_id.to_string(),
            source,
        };

        let per_page = PAGE_SIZE.to_string();
        let page: VacancyPage = self
            .http
            .get(&self.api_url)
            .query(&[
                ("per_page", per_page.as_str()),
                ("employer_id", employer_id),
                ("only_with_salary", "true"),
                ("only_with_vacancies", "true"),
            ])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        debug!(
            "Fetched {} postings for employer {}",
            page.items.len(),
            employer_id
        );
        Ok(page.items)
    }

    /// Employers as described by the first posting that names one. Configured
    /// employers without postings are left out; a repeated name keeps its
    /// first URL.
    pub async fn list_employers(&self) -> Result<Vec<Employer>> {
        Ok(collect_employers(&self.fetch_all().await?))
    }

    /// Every posting of every configured employer, normalized.
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        Ok(collect_jobs(&self.fetch_all().await?))
    }

    /// Employers and jobs from a single request per employer.
    ///
    /// Every returned job references one of the returned employers, so the
    /// batch can be loaded without foreign-key violations.
    pub async fn harvest(&self) -> Result<Harvest> {
        let pages = self.fetch_all().await?;
        let employers = collect_employers(&pages);
        let jobs = retain_known_employers(collect_jobs(&pages), &employers);
        let harvest = Harvest { employers, jobs };
        info!(
            "Harvested {} employers and {} jobs from {} configured employers",
            harvest.employers.len(),
            harvest.jobs.len(),
            self.employers.len()
        );
        Ok(harvest)
    }

    async fn fetch_all(&self) -> Result<Vec<(&EmployerEntry, Vec<RawPosting>)>> {
        let mut pages = Vec::with_capacity(self.employers.len());
        for entry in self.employers.iter() {
            info!("Fetching postings for {} (id={})", entry.label, entry.id);
            let postings = self.fetch(&entry.id).await?;
            pages.push((entry, postings));
        }
        Ok(pages)
    }
}

fn collect_employers(pages: &[(&EmployerEntry, Vec<RawPosting>)]) -> Vec<Employer> {
    let mut seen = HashSet::new();
    let mut employers = Vec::new();

    for (entry, postings) in pages {
        if postings.is_empty() {
            warn!(
                "Employer {} (id={}) has no matching postings and is skipped",
                entry.label, entry.id
            );
            continue;
        }
        match postings.iter().find_map(employer_of) {
            Some(employer) if seen.insert(employer.name.clone()) => employers.push(employer),
            Some(employer) => debug!("Employer {} already listed", employer.name),
            None => warn!(
                "No posting of employer {} (id={}) names an employer",
                entry.label, entry.id
            ),
        }
    }
    employers
}

fn collect_jobs(pages: &[(&EmployerEntry, Vec<RawPosting>)]) -> Vec<Job> {
    let mut jobs = Vec::new();

    for (entry, postings) in pages {
        for posting in postings {
            match normalize_job(posting) {
                Ok(job) => jobs.push(job),
                Err(reason) => warn!(
                    "Skipping posting of {} ({}): {}",
                    entry.label, entry.id, reason
                ),
            }
        }
    }
    jobs
}

/// Drop jobs whose employer is not in `employers`. A page can carry postings
/// of a differently named employer than the one its employer row came from.
fn retain_known_employers(jobs: Vec<Job>, employers: &[Employer]) -> Vec<Job> {
    let known: HashSet<&str> = employers.iter().map(|e| e.name.as_str()).collect();
    jobs.into_iter()
        .filter(|job| {
            let keep = known.contains(job.employer_name.as_str());
            if !keep {
                warn!(
                    "Skipping job '{}': employer {} has no employer row",
                    job.title, job.employer_name
                );
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;
    use std::time::Duration;

    fn source(server: &ServerGuard, directory: &str) -> ListingSource {
        let settings = SourceSettings {
            api_url: format!("{}/vacancies", server.url()),
            user_agent: "company-jobs-test".to_string(),
            timeout: Duration::from_secs(5),
        };
        let employers = EmployerDirectory::parse(directory).unwrap();
        ListingSource::new(&settings, employers).unwrap()
    }

    fn page_for(employer: &str, titles: &[&str]) -> String {
        let items: Vec<_> = titles
            .iter()
            .map(|title| {
                json!({
                    "name": title,
                    "salary": {"from": 1000, "to": null, "currency": "RUR"},
                    "employer": {
                        "name": employer,
                        "alternate_url": format!("https://hh.ru/employer/{}", employer)
                    }
                })
            })
            .collect();
        json!({ "items": items, "found": titles.len() }).to_string()
    }

    async fn mock_employer(server: &mut ServerGuard, id: &str, body: String) -> mockito::Mock {
        server
            .mock("GET", "/vacancies")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("employer_id".into(), id.into()),
                Matcher::UrlEncoded("per_page".into(), "100".into()),
                Matcher::UrlEncoded("only_with_salary".into(), "true".into()),
                Matcher::UrlEncoded("only_with_vacancies".into(), "true".into()),
            ]))
            .match_header("user-agent", "company-jobs-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn fetch_sends_filters_and_decodes_items() {
        let mut server = Server::new_async().await;
        let body = page_for("Альфа-Банк", &["Analyst", "Driver"]);
        let mock = mock_employer(&mut server, "80", body).await;

        let postings = source(&server, "Альфа-Банк=80").fetch("80").await.unwrap();

        mock.assert_async().await;
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[1].name.as_deref(), Some("Driver"));
    }

    #[tokio::test]
    async fn http_error_is_source_unavailable() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/vacancies")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = source(&server, "Ozon=2180").list_jobs().await.unwrap_err();
        assert!(
            matches!(&err, Error::SourceUnavailable { employer_id, .. } if employer_id == "2180"),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn malformed_body_is_source_unavailable() {
        let mut server = Server::new_async().await;
        let _mock = mock_employer(&mut server, "2180", "<html>".to_string()).await;

        let err = source(&server, "Ozon=2180").fetch("2180").await.unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn employers_come_from_first_posting_and_empty_ones_are_omitted() {
        let mut server = Server::new_async().await;
        let vk_body = page_for("VK", &["Go developer", "QA"]);
        let _vk = mock_employer(&mut server, "15478", vk_body).await;
        let _empty = mock_employer(&mut server, "1", page_for("Nobody", &[])).await;
        let _alias = mock_employer(&mut server, "2", page_for("VK", &["Designer"])).await;

        let employers = source(&server, "VK=15478,Ghost=1,VK Alias=2")
            .list_employers()
            .await
            .unwrap();

        assert_eq!(
            employers,
            vec![Employer {
                name: "VK".to_string(),
                url: Some("https://hh.ru/employer/VK".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn harvest_fetches_each_employer_once() {
        let mut server = Server::new_async().await;
        let ozon_body = page_for("Ozon", &["Picker", "Courier"]);
        let ozon = mock_employer(&mut server, "2180", ozon_body).await;
        let mts = mock_employer(&mut server, "3776", page_for("МТС", &["Engineer"])).await;

        let harvest = source(&server, "Ozon=2180,МТС=3776").harvest().await.unwrap();

        ozon.assert_async().await;
        mts.assert_async().await;
        let names: Vec<&str> = harvest.employers.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ozon", "МТС"]);
        let titles: Vec<&str> = harvest.jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Picker", "Courier", "Engineer"]);
        assert!(harvest.jobs.iter().all(|j| j.salary == 1000));
    }

    #[tokio::test]
    async fn postings_without_employer_are_skipped() {
        let mut server = Server::new_async().await;
        let body = json!({
            "items": [
                {"name": "Orphan", "employer": null},
                {"name": "Cashier", "employer": {"name": "Ozon"}}
            ]
        })
        .to_string();
        let _mock = mock_employer(&mut server, "2180", body).await;

        let jobs = source(&server, "Ozon=2180").list_jobs().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Cashier");
        assert_eq!(jobs[0].salary, 0);
    }

    #[tokio::test]
    async fn employer_is_taken_from_first_posting_that_names_one() {
        let mut server = Server::new_async().await;
        let body = json!({
            "items": [
                {"name": "Orphan", "employer": null},
                {"name": "Cashier", "employer": {"name": "Ozon"}}
            ]
        })
        .to_string();
        let _mock = mock_employer(&mut server, "2180", body).await;

        let harvest = source(&server, "Ozon=2180").harvest().await.unwrap();

        let names: Vec<&str> = harvest.employers.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ozon"]);
        assert_eq!(harvest.jobs.len(), 1);
        assert!(harvest
            .jobs
            .iter()
            .all(|job| names.contains(&job.employer_name.as_str())));
    }

    #[tokio::test]
    async fn harvest_drops_jobs_of_unlisted_employers() {
        let mut server = Server::new_async().await;
        let body = json!({
            "items": [
                {"name": "Analyst", "employer": {"name": "СБЕР"}},
                {"name": "Developer", "employer": {"name": "СберТех"}}
            ]
        })
        .to_string();
        let _mock = mock_employer(&mut server, "3529", body).await;

        let harvest = source(&server, "СБЕР=3529").harvest().await.unwrap();

        let names: Vec<&str> = harvest.employers.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["СБЕР"]);
        let titles: Vec<&str> = harvest.jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Analyst"]);
        assert!(harvest
            .jobs
            .iter()
            .all(|job| names.contains(&job.employer_name.as_str())));
    }
}
