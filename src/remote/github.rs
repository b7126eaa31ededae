use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::filter::{Direction, SortField};
use super::repo::Repo;
use super::{ChangeRequestService, RepoSource};
use crate::core::error::GitHubError;

const API_BASE_URL: &str = "https://api.github.com";
const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const PER_PAGE: usize = 30;

/// GitHub REST v3 client authenticated with a user name and token.
///
/// A read-only client still performs every query but only logs the writes
/// (creating pull requests, editing descriptions) it would have made.
pub struct GitHubClient {
    http: Client,
    base_url: String,
    user: String,
    token: String,
    read_only: bool,
}

impl GitHubClient {
    pub fn new(user: impl Into<String>, token: impl Into<String>, read_only: bool) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("fleetfix/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: API_BASE_URL.to_string(),
            user: user.into(),
            token: token.into(),
            read_only,
        })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.user, Some(&self.token))
            .header(ACCEPT, ACCEPT_V3)
    }

    async fn list_page(
        &self,
        sort: SortField,
        direction: Direction,
        page: usize,
    ) -> Result<Vec<Repo>> {
        let query = [
            ("sort", sort.as_str().to_string()),
            ("direction", direction.as_str().to_string()),
            ("page", page.to_string()),
            ("per_page", PER_PAGE.to_string()),
            ("visibility", "all".to_string()),
            ("affiliation", "owner".to_string()),
        ];
        let response = self
            .authorized(self.http.get(self.endpoint("user/repos")))
            .query(&query)
            .send()
            .await
            .context("failed to call GitHub")?;
        let repos = ensure_success(response)
            .await?
            .json::<Vec<Repo>>()
            .await
            .context("failed to decode repository list")?;
        debug!(page, count = repos.len(), "fetched repository page");
        Ok(repos)
    }
}

#[async_trait]
impl RepoSource for GitHubClient {
    async fn list_repos(&self, sort: SortField, direction: Direction) -> Result<Vec<Repo>> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let repos = self.list_page(sort, direction, page).await?;
            let count = repos.len();
            all.extend(repos);
            if count < PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(all)
    }
}

#[async_trait]
impl ChangeRequestService for GitHubClient {
    async fn has_open_request(&self, full_name: &str, head: &str, base: &str) -> Result<bool> {
        let response = self
            .authorized(self.http.get(self.endpoint(&format!("repos/{full_name}/pulls"))))
            .query(&[("head", head), ("base", base), ("state", "open")])
            .send()
            .await
            .context("failed to call GitHub")?;
        let pulls = ensure_success(response)
            .await?
            .json::<Vec<serde_json::Value>>()
            .await
            .context("failed to decode pull request list")?;
        Ok(!pulls.is_empty())
    }

    async fn create_request(
        &self,
        full_name: &str,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<String> {
        if self.read_only {
            info!(repo = full_name, head, base, "would have created pull request");
            return Ok(String::new());
        }
        let request = CreatePullRequest {
            head,
            base,
            title,
            body,
        };
        let response = self
            .authorized(self.http.post(self.endpoint(&format!("repos/{full_name}/pulls"))))
            .json(&request)
            .send()
            .await
            .context("failed to call GitHub")?;
        let created = ensure_success(response)
            .await?
            .json::<CreatedPullRequest>()
            .await
            .context("failed to decode created pull request")?;
        Ok(created.html_url)
    }

    async fn update_description(&self, full_name: &str, description: &str) -> Result<()> {
        if self.read_only {
            info!(repo = full_name, description, "would have updated repository description");
            return Ok(());
        }
        let response = self
            .authorized(self.http.patch(self.endpoint(&format!("repos/{full_name}"))))
            .json(&UpdateRepository { description })
            .send()
            .await
            .context("failed to call GitHub")?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unable to read response>".to_string());
    Err(GitHubError {
        status: status.as_u16(),
        body,
    }
    .into())
}

#[derive(Debug, Serialize)]
struct CreatePullRequest<'a> {
    head: &'a str,
    base: &'a str,
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedPullRequest {
    html_url: String,
}

#[derive(Debug, Serialize)]
struct UpdateRepository<'a> {
    description: &'a str,
}
