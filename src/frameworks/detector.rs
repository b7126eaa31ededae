use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::utils::fs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectKind {
    Maven,
    DotNet,
    Vb6,
    Lazarus,
    Unknown,
}

impl std::fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectKind::Maven => write!(f, "Maven"),
            ProjectKind::DotNet => write!(f, ".NET"),
            ProjectKind::Vb6 => write!(f, "VB6"),
            ProjectKind::Lazarus => write!(f, "Lazarus"),
            ProjectKind::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedProject {
    pub kind: ProjectKind,
    /// The single root `.sln` of a .NET project.
    pub solution: Option<PathBuf>,
}

/// C# project type GUIDs (classic and SDK style).
const CSHARP_PROJECT_TYPES: [&str; 2] = [
    "FAE04EC0-301F-11D3-BF4B-00C04F79EFBC",
    "9A19103F-16F7-4668-BE54-9A1E7A4F7556",
];

static SLN_PROJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*Project\("\{(?P<guid>[0-9A-Fa-f-]+)\}"\)\s*=\s*"[^"]*"\s*,\s*"(?P<path>[^"]+)""#)
        .unwrap()
});

pub struct ProjectDetector;

impl ProjectDetector {
    /// Detects the project kind, checking Maven, .NET, VB6 and Lazarus in that order.
    pub fn detect(path: &Path) -> DetectedProject {
        if Self::matches(path, ProjectKind::Maven) {
            return DetectedProject {
                kind: ProjectKind::Maven,
                solution: None,
            };
        }
        if let Some(solution) = Self::csharp_solution(path) {
            return DetectedProject {
                kind: ProjectKind::DotNet,
                solution: Some(solution),
            };
        }
        let kind = [ProjectKind::Vb6, ProjectKind::Lazarus]
            .into_iter()
            .find(|kind| Self::matches(path, kind.clone()))
            .unwrap_or(ProjectKind::Unknown);
        DetectedProject {
            kind,
            solution: None,
        }
    }

    /// Whether `path` looks like a project of `kind`, independently of the other kinds.
    pub fn matches(path: &Path, kind: ProjectKind) -> bool {
        match kind {
            ProjectKind::Maven => fs::path_exists(path, "pom.xml"),
            ProjectKind::DotNet => Self::csharp_solution(path).is_some(),
            ProjectKind::Vb6 => {
                fs::has_root_file_with_extension(path, ".vbp")
                    || fs::has_root_file_with_extension(path, ".vbg")
            }
            ProjectKind::Lazarus => fs::has_root_file_with_extension(path, ".lpr"),
            ProjectKind::Unknown => false,
        }
    }

    /// The root `.sln`, when there is exactly one and it references a C# project.
    fn csharp_solution(path: &Path) -> Option<PathBuf> {
        let solutions = fs::root_files_with_extension(path, ".sln");
        if solutions.len() != 1 {
            return None;
        }
        let solution = solutions.into_iter().next()?;
        let content = std::fs::read_to_string(&solution).ok()?;
        if csharp_projects(&content).is_empty() {
            None
        } else {
            Some(solution)
        }
    }
}

/// Paths of the C# projects referenced by a Visual Studio solution.
pub fn csharp_projects(sln: &str) -> Vec<String> {
    SLN_PROJECT_RE
        .captures_iter(sln)
        .filter(|caps| {
            CSHARP_PROJECT_TYPES
                .iter()
                .any(|guid| guid.eq_ignore_ascii_case(&caps["guid"]))
        })
        .map(|caps| caps["path"].to_string())
        .collect()
}
