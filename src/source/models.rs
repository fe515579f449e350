use serde::Deserialize;

/// One page of the `/vacancies` response. Only `items` is used.
#[derive(Debug, Default, Deserialize)]
pub struct VacancyPage {
    #[serde(default)]
    pub items: Vec<RawPosting>,
}

/// A posting exactly as the listing API returns it. Every field is optional:
/// the API omits or nulls nested objects freely.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPosting {
    pub name: Option<String>,
    pub area: Option<Named>,
    pub salary: Option<RawSalary>,
    pub snippet: Option<Snippet>,
    pub published_at: Option<String>,
    pub experience: Option<Named>,
    pub alternate_url: Option<String>,
    pub employer: Option<RawEmployer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSalary {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Named {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Snippet {
    pub responsibility: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEmployer {
    pub name: Option<String>,
    pub alternate_url: Option<String>,
}
