use clap::ValueEnum;

use super::repo::Repo;

/// How repositories with a given flag (archived, fork) are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FilterMode {
    Allow,
    #[default]
    Deny,
    Only,
}

impl FilterMode {
    pub fn accepts(self, flag: bool) -> bool {
        match self {
            FilterMode::Allow => true,
            FilterMode::Deny => !flag,
            FilterMode::Only => flag,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortField {
    #[default]
    FullName,
    Created,
    Updated,
    Pushed,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::FullName => "full_name",
            SortField::Created => "created",
            SortField::Updated => "updated",
            SortField::Pushed => "pushed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Include or exclude by a string match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match {
    Only(String),
    Except(String),
}

impl Match {
    pub fn from_pair(only: Option<String>, except: Option<String>) -> Option<Self> {
        match (only, except) {
            (Some(value), _) => Some(Match::Only(value)),
            (None, Some(value)) => Some(Match::Except(value)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RepoFilter {
    pub archived: FilterMode,
    pub forks: FilterMode,
    pub name_prefix: Option<Match>,
    pub language: Option<Match>,
}

impl RepoFilter {
    pub fn accepts(&self, repo: &Repo) -> bool {
        if !self.archived.accepts(repo.archived) || !self.forks.accepts(repo.fork) {
            return false;
        }
        let name_ok = match &self.name_prefix {
            Some(Match::Only(prefix)) => repo.name.starts_with(prefix.as_str()),
            Some(Match::Except(prefix)) => !repo.name.starts_with(prefix.as_str()),
            None => true,
        };
        let language = repo.language.as_deref().unwrap_or_default();
        let language_ok = match &self.language {
            Some(Match::Only(wanted)) => language.eq_ignore_ascii_case(wanted),
            Some(Match::Except(unwanted)) => !language.eq_ignore_ascii_case(unwanted),
            None => true,
        };
        name_ok && language_ok
    }

    pub fn apply(&self, repos: Vec<Repo>) -> Vec<Repo> {
        repos.into_iter().filter(|repo| self.accepts(repo)).collect()
    }
}
