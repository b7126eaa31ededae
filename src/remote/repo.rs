use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository metadata as reported by the hosting service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    pub name: String,
    pub full_name: String,
    pub ssh_url: String,
    pub default_branch: String,
    #[serde(default)]
    pub description: Option<String>,
    pub private: bool,
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

impl Repo {
    pub fn owner(&self) -> &str {
        self.full_name
            .split_once('/')
            .map(|(owner, _)| owner)
            .unwrap_or(&self.full_name)
    }
}

#[cfg(test)]
pub(crate) fn sample_repo(name: &str) -> Repo {
    let at = DateTime::parse_from_rfc3339("2021-10-10T09:50:07Z")
        .unwrap()
        .with_timezone(&Utc);
    Repo {
        name: name.to_string(),
        full_name: format!("octo/{name}"),
        ssh_url: format!("git@github.com:octo/{name}.git"),
        default_branch: "main".to_string(),
        description: Some(format!("The {name} project")),
        private: false,
        fork: false,
        archived: false,
        language: Some("Rust".to_string()),
        created_at: at,
        updated_at: at,
        pushed_at: Some(at),
    }
}
