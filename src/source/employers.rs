use crate::error::{Error, Result};

/// Employers fetched when `HH_EMPLOYERS` is not set, as (display name, hh.ru id).
const DEFAULT_EMPLOYERS: &[(&str, &str)] = &[
    ("Северсталь", "6041"),
    ("Альфа-Банк", "80"),
    ("Тинькофф", "78638"),
    ("СБЕР", "3529"),
    ("Ozon", "2180"),
    ("Яндекс", "1740"),
    ("VK", "15478"),
    ("МТС", "3776"),
    ("СИНЕРГИЯ", "127256"),
    ("2ГИС", "64174"),
];

/// One configured employer: the label used in logs and its id in the listing API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployerEntry {
    pub label: String,
    pub id: String,
}

/// Immutable, ordered set of employers to ingest. Built once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployerDirectory {
    entries: Vec<EmployerEntry>,
}

impl Default for EmployerDirectory {
    fn default() -> Self {
        Self::new(
            DEFAULT_EMPLOYERS
                .iter()
                .map(|(label, id)| EmployerEntry {
                    label: label.to_string(),
                    id: id.to_string(),
                })
                .collect(),
        )
    }
}

impl EmployerDirectory {
    pub fn new(entries: Vec<EmployerEntry>) -> Self {
        Self { entries }
    }

    /// Parse a `Name=id,Name=id` list. Blank segments are ignored; an entry
    /// without `=`, or with an empty name or id, is a configuration error.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for segment in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (label, id) = segment.split_once('=').ok_or_else(|| {
                Error::Config(format!("Employer entry '{}' must look like Name=id", segment))
            })?;
            let (label, id) = (label.trim(), id.trim());
            if label.is_empty() || id.is_empty() {
                return Err(Error::Config(format!(
                    "Employer entry '{}' has an empty name or id",
                    segment
                )));
            }
            entries.push(EmployerEntry {
                label: label.to_string(),
                id: id.to_string(),
            });
        }

        if entries.is_empty() {
            return Err(Error::Config("Employer list is empty".to_string()));
        }
        Ok(Self::new(entries))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmployerEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
