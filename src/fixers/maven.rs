//! Maven project maintenance.

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use std::fs;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::frameworks::{ProjectDetector, ProjectKind};

use super::patterns::{mtime_guarded, Computed, ExternalTool, MissingFile, RemoteContents};
use super::traits::{ChangeDescription, Fixer, FixerContext};

const POM: &str = "pom.xml";
const MAVEN_WORKFLOW: &str = include_str!("../../templates/maven-workflow.yml");
const MAVEN_GITIGNORE_URL: &str =
    "https://raw.githubusercontent.com/github/gitignore/master/Maven.gitignore";
const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";

static PARENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<parent>.*?</parent>").unwrap());
static PARENT_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?P<tag>groupId|artifactId|version|relativePath)>\s*(?P<text>[^<]*?)\s*</")
        .unwrap()
});
static RELATIVE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\r?\n[ \t]*)?<relativePath>\s*\.\./[^<]*</relativePath>").unwrap()
});
static PARENT_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<version>[^<]*</version>").unwrap());
static RELEASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<release>\s*([^<]+?)\s*</release>").unwrap());
static LOG_LEVEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[[A-Z]+\]").unwrap());

/// Maven output lines that carry no information about what changed.
const NOISE_PREFIXES: [&str; 11] = [
    "Scanning",
    "-",
    "Building",
    "artifact",
    "Downloading",
    "Downloaded",
    "BUILD",
    "Total",
    "Finished",
    "Minor version",
    "Reactor ",
];

fn mvn() -> &'static str {
    if cfg!(windows) {
        "mvn.cmd"
    } else {
        "mvn"
    }
}

fn is_maven(ctx: &FixerContext) -> bool {
    ProjectDetector::matches(ctx.dir(), ProjectKind::Maven)
}

/// Coordinates of the `<parent>` element of a pom.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub relative_path: Option<String>,
}

impl ParentRef {
    pub fn is_snapshot(&self) -> bool {
        self.version.contains("SNAPSHOT")
    }

    pub fn has_sibling_path(&self) -> bool {
        self.relative_path
            .as_deref()
            .is_some_and(|path| path.starts_with("../"))
    }

    fn metadata_url(&self, repository: &str) -> String {
        format!(
            "{}/{}/{}/maven-metadata.xml",
            repository.trim_end_matches('/'),
            self.group_id.replace('.', "/"),
            self.artifact_id
        )
    }
}

pub fn parse_parent(pom: &str) -> Option<ParentRef> {
    let block = PARENT_RE.find(pom)?.as_str();
    let mut group_id = None;
    let mut artifact_id = None;
    let mut version = None;
    let mut relative_path = None;
    for caps in PARENT_FIELD_RE.captures_iter(block) {
        let text = caps["text"].to_string();
        match &caps["tag"] {
            "groupId" => group_id = Some(text),
            "artifactId" => artifact_id = Some(text),
            "version" => version = Some(text),
            _ => relative_path = Some(text),
        }
    }
    Some(ParentRef {
        group_id: group_id?,
        artifact_id: artifact_id?,
        version: version?,
        relative_path,
    })
}

/// Drops a `../` relative path from the parent and pins its version to
/// `release` when given. Only the `<parent>` element is touched.
pub fn correct_parent(pom: &str, release: Option<&str>) -> String {
    let Some(found) = PARENT_RE.find(pom) else {
        return pom.to_string();
    };
    let mut block = RELATIVE_PATH_RE.replace(found.as_str(), "").to_string();
    if let Some(release) = release {
        let version = format!("<version>{}</version>", release);
        block = PARENT_VERSION_RE
            .replace(&block, regex::NoExpand(&version))
            .to_string();
    }
    format!("{}{}{}", &pom[..found.start()], block, &pom[found.end()..])
}

pub fn latest_release(metadata: &str) -> Option<String> {
    RELEASE_RE
        .captures(metadata)
        .map(|caps| caps[1].to_string())
}

/// Strips log level prefixes and noise lines from Maven output.
pub fn filter_maven_output(output: &str) -> String {
    output
        .lines()
        .map(|line| LOG_LEVEL_RE.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .filter(|line| !NOISE_PREFIXES.iter().any(|prefix| line.starts_with(prefix)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keeps the dependencies and the parent of a Maven project current.
pub struct MavenFix {
    ctx: FixerContext,
    repository: String,
}

pub fn maven_fix(ctx: FixerContext) -> Result<Box<dyn Fixer>> {
    Ok(Box::new(MavenFix {
        ctx,
        repository: MAVEN_CENTRAL.to_string(),
    }))
}

impl MavenFix {
    fn steps() -> Vec<(&'static str, ExternalTool)> {
        vec![
            (
                "Using latest releases",
                ExternalTool::new(
                    mvn(),
                    ["-B", "versions:use-latest-releases", "-DallowMajorUpdates=false"],
                ),
            ),
            (
                "Updated pom properties",
                ExternalTool::new(
                    mvn(),
                    ["-B", "versions:update-properties", "-DallowMajorUpdates=false"],
                ),
            ),
            (
                "Updated parent pom",
                ExternalTool::new(mvn(), ["-B", "versions:update-parent"]),
            ),
        ]
    }

    async fn fetch_release(&self, parent: &ParentRef) -> Result<Option<String>> {
        let url = parent.metadata_url(&self.repository);
        debug!(%url, "looking up latest parent release");
        let metadata = self
            .ctx
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to download {}", url))?
            .error_for_status()
            .with_context(|| format!("failed to download {}", url))?
            .text()
            .await?;
        Ok(latest_release(&metadata))
    }

    async fn correct_parent_reference(&self) -> Result<Option<ChangeDescription>> {
        let path = self.ctx.dir().join(POM);
        let pom = fs::read_to_string(&path).context("failed to read pom.xml")?;
        let Some(parent) = parse_parent(&pom) else {
            return Ok(None);
        };
        if !parent.is_snapshot() && !parent.has_sibling_path() {
            return Ok(None);
        }
        let release = if parent.is_snapshot() {
            self.fetch_release(&parent).await?
        } else {
            None
        };
        let corrected = correct_parent(&pom, release.as_deref());
        if corrected == pom {
            return Ok(None);
        }
        fs::write(&path, corrected).context("failed to write pom.xml")?;
        self.sort_pom().await;
        self.ctx.git.add(POM).await?;
        let message = "Corrected parent pom reference".to_string();
        self.ctx.git.commit(&message).await?;
        Ok(Some(message))
    }

    async fn sort_pom(&self) {
        let tool = ExternalTool::new(
            mvn(),
            [
                "-B",
                "com.github.ekryd.sortpom:sortpom-maven-plugin:sort",
                "-Dsort.createBackupFile=false",
            ],
        );
        if let Err(err) = tool.run(self.ctx.dir()).await {
            warn!(error = %err, "sortpom failed, keeping pom order");
        }
    }
}

#[async_trait]
impl Fixer for MavenFix {
    async fn run(&self) -> Result<Vec<ChangeDescription>> {
        if !is_maven(&self.ctx) {
            return Ok(vec![]);
        }
        let mut changes = Vec::new();
        if let Some(message) = self.correct_parent_reference().await? {
            changes.push(message);
        }
        for (title, tool) in Self::steps() {
            let Some(output) = mtime_guarded(self.ctx.dir(), POM, &tool).await? else {
                continue;
            };
            info!(step = title, "maven updated pom.xml");
            self.sort_pom().await;
            self.ctx.git.add(POM).await?;
            let message = format!("{}\n\n{}\n", title, filter_maven_output(&output));
            self.ctx.git.commit(&message).await?;
            changes.push(message);
        }
        Ok(changes)
    }
}

pub fn must_have_maven_git_hub_workflow(ctx: FixerContext) -> Result<Box<dyn Fixer>> {
    let contents = Computed(|ctx: &FixerContext| -> Option<String> {
        Some(MAVEN_WORKFLOW.replace("[branch]", ctx.default_branch()))
    });
    let fixer = MissingFile::new(ctx, ".github/workflows/maven.yml", contents)?.applies_when(is_maven);
    Ok(Box::new(fixer))
}

pub fn must_have_maven_git_ignore(ctx: FixerContext) -> Result<Box<dyn Fixer>> {
    let fixer = MissingFile::new(ctx, ".gitignore", RemoteContents(MAVEN_GITIGNORE_URL))?
        .applies_when(is_maven);
    Ok(Box::new(fixer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::git::testing::RecordingGit;
    use crate::remote::repo::sample_repo;
    use std::sync::Arc;
    use tempfile::TempDir;

    const POM_WITH_PARENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>com.github.ngeor</groupId>
    <artifactId>java</artifactId>
    <version>1.10.0-SNAPSHOT</version>
    <relativePath>../java</relativePath>
  </parent>
  <artifactId>demo</artifactId>
  <version>0.1.0</version>
</project>
"#;

    #[test]
    fn test_filter_maven_output() {
        let output = "[INFO] Scanning for projects...
[INFO]
[INFO] -------------< com.github.ngeor:archetype-quickstart-jdk8 >-------------
[INFO] Building archetype-quickstart-jdk8 2.9.0-SNAPSHOT
[INFO] --------------------------[ maven-archetype ]---------------------------
[INFO]
[INFO] --- versions-maven-plugin:2.7:update-parent (default-cli) @ archetype-quickstart-jdk8 ---
[INFO] artifact com.github.ngeor:java: checking for updates from central
[INFO] Downloading from central: https://repo.maven.apache.org/maven2/com/github/ngeor/java/2.0.0/java-2.0.0.pom
[INFO] Downloaded from central: https://repo.maven.apache.org/maven2/com/github/ngeor/java/2.0.0/java-2.0.0.pom (13 kB at 57 kB/s)
[INFO] Updating parent from 1.10.0 to 2.0.0
[INFO] ------------------------------------------------------------------------
[INFO] BUILD SUCCESS
[INFO] ------------------------------------------------------------------------
[INFO] Total time:  6.119 s
[INFO] Finished at: 2021-10-10T09:50:07+02:00
[INFO] ------------------------------------------------------------------------
";
        assert_eq!(filter_maven_output(output), "Updating parent from 1.10.0 to 2.0.0");
    }

    #[test]
    fn test_parse_parent() {
        let parent = parse_parent(POM_WITH_PARENT).unwrap();
        assert_eq!(parent.group_id, "com.github.ngeor");
        assert_eq!(parent.artifact_id, "java");
        assert_eq!(parent.version, "1.10.0-SNAPSHOT");
        assert!(parent.is_snapshot());
        assert!(parent.has_sibling_path());
        assert_eq!(
            parent.metadata_url("https://repo1.maven.org/maven2/"),
            "https://repo1.maven.org/maven2/com/github/ngeor/java/maven-metadata.xml"
        );
    }

    #[test]
    fn test_parse_parent_absent() {
        assert!(parse_parent("<project><artifactId>x</artifactId></project>").is_none());
    }

    #[test]
    fn test_correct_parent_only_touches_parent() {
        let corrected = correct_parent(POM_WITH_PARENT, Some("2.0.0"));
        assert!(!corrected.contains("relativePath"));
        assert!(corrected.contains("<version>2.0.0</version>"));
        assert!(corrected.contains("<version>0.1.0</version>"));
        assert!(corrected.contains("<artifactId>demo</artifactId>"));
        let parent = parse_parent(&corrected).unwrap();
        assert_eq!(parent.version, "2.0.0");
        assert_eq!(parent.relative_path, None);
    }

    #[test]
    fn test_correct_parent_keeps_release_version() {
        let pom = POM_WITH_PARENT.replace("1.10.0-SNAPSHOT", "1.10.0");
        let corrected = correct_parent(&pom, None);
        assert!(corrected.contains("<version>1.10.0</version>"));
        assert!(!corrected.contains("../java"));
    }

    #[test]
    fn test_latest_release_from_metadata() {
        let metadata = "<metadata><versioning><latest>2.1.0-SNAPSHOT</latest>\
                        <release> 2.0.0 </release></versioning></metadata>";
        assert_eq!(latest_release(metadata), Some("2.0.0".to_string()));
        assert_eq!(latest_release("<metadata/>"), None);
    }

    #[tokio::test]
    async fn test_maven_fix_skips_other_projects() {
        let tmp = TempDir::new().unwrap();
        let git = Arc::new(RecordingGit::new(tmp.path()));
        let fixer = maven_fix(FixerContext::new(git.clone())).unwrap();
        assert!(fixer.run().await.unwrap().is_empty());
        assert!(git.calls().is_empty());
    }

    #[tokio::test]
    async fn test_workflow_uses_default_branch() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(POM), "<project/>").unwrap();
        let git = Arc::new(RecordingGit::new(tmp.path()));
        let mut repo = sample_repo("lib");
        repo.default_branch = "trunk".to_string();
        let ctx = FixerContext::new(git.clone()).with_repo(repo);

        let changes = must_have_maven_git_hub_workflow(ctx).unwrap().run().await.unwrap();

        assert_eq!(changes, vec!["Adding .github/workflows/maven.yml".to_string()]);
        let workflow = fs::read_to_string(tmp.path().join(".github/workflows/maven.yml")).unwrap();
        assert!(workflow.contains("branches: [ trunk ]"));
        assert!(!workflow.contains("[branch]"));
    }

    #[tokio::test]
    async fn test_workflow_not_added_without_pom() {
        let tmp = TempDir::new().unwrap();
        let git = Arc::new(RecordingGit::new(tmp.path()));
        let ctx = FixerContext::new(git.clone());
        assert!(must_have_maven_git_hub_workflow(ctx).unwrap().run().await.unwrap().is_empty());
        assert!(!tmp.path().join(".github").exists());
    }
}
