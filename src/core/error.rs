use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--only-fixers and --except-fixers cannot be used together")]
    ConflictingSelection,
    #[error("failed to read settings file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings file {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("--user and --token are required to talk to GitHub")]
    MissingCredentials,
}

#[derive(Debug, Error)]
#[error("git {command} failed: {stderr}")]
pub struct GitError {
    pub command: String,
    pub stderr: String,
}

#[derive(Debug, Error)]
#[error("GitHub responded with {status}: {body}")]
pub struct GitHubError {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
#[error("{program} exited unsuccessfully:\n{output}")]
pub struct ToolError {
    pub program: String,
    pub output: String,
}
