//! GitHub API Client
//!
//! Label and milestone services backed by the GitHub REST API

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::{Octocrab, Page};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::repository::RepositoryRef;
use crate::service::{
    LabelPage, LabelRequest, LabelService, MilestonePage, MilestoneRequest, MilestoneService,
    MilestoneState, RemoteLabel, RemoteMilestone,
};

/// Items requested per page
const PER_PAGE: &str = "100";

/// Encode a string for use in URL path segments (RFC 3986 with UTF-8 support)
///
/// Only unreserved characters (A-Z, a-z, 0-9, -, ., _, ~) are left unencoded.
fn encode_path_segment(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' | '_' | '~' => c.to_string(),
            _ => c
                .to_string()
                .bytes()
                .map(|b| format!("%{:02X}", b))
                .collect::<String>(),
        })
        .collect()
}

/// Extract the `page` parameter from a query string
fn page_from_query(query: &str) -> Option<u32> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

/// Page number announced by the `next` link of a response
fn next_page<T>(page: &Page<T>) -> Option<u32> {
    page.next
        .as_ref()
        .and_then(|link| link.query())
        .and_then(page_from_query)
}

fn build_octocrab(access_token: Option<&str>, base_uri: Option<&str>) -> Result<Octocrab> {
    let mut builder = Octocrab::builder();
    if let Some(uri) = base_uri {
        builder = builder.base_uri(uri)?;
    }
    if let Some(token) = access_token {
        builder = builder.personal_token(token.to_string());
    }
    Ok(builder.build()?)
}

/// Milestone as returned by the GitHub API
#[derive(Debug, Deserialize)]
struct ApiMilestone {
    number: u64,
    title: String,
    description: Option<String>,
    state: MilestoneState,
    due_on: Option<DateTime<Utc>>,
}

impl From<ApiMilestone> for RemoteMilestone {
    fn from(milestone: ApiMilestone) -> Self {
        RemoteMilestone {
            number: milestone.number,
            title: milestone.title,
            description: milestone.description.unwrap_or_default(),
            state: milestone.state,
            due_on: milestone.due_on,
        }
    }
}

/// GitHub API Client
///
/// Client responsible for interactions with the GitHub API. One client serves
/// every repository of a run.
pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    /// Create a new GitHub client
    ///
    /// Without a token the client is anonymous, which is enough to read public
    /// repositories but not to change them.
    ///
    /// # Arguments
    /// - `access_token`: GitHub access token
    ///
    /// # Errors
    /// Returns an error if client initialization fails or the token is rejected
    pub async fn new(access_token: Option<&str>) -> Result<Self> {
        let octocrab = build_octocrab(access_token, None)?;

        if access_token.is_some() {
            // Authentication test
            octocrab
                .current()
                .user()
                .await
                .map_err(|_| Error::AuthenticationFailed)?;
        }

        Ok(Self { octocrab })
    }

    /// Create a client for a GitHub API served at `base_uri`
    ///
    /// Used for GitHub Enterprise installations. The token is not checked
    /// up front.
    ///
    /// # Errors
    /// Returns an error if `base_uri` is not a valid URI
    pub fn with_base_uri(access_token: Option<&str>, base_uri: &str) -> Result<Self> {
        Ok(Self {
            octocrab: build_octocrab(access_token, Some(base_uri))?,
        })
    }

    fn repo_route(repo: &RepositoryRef, resource: &str) -> String {
        format!(
            "/repos/{}/{}/{}",
            encode_path_segment(repo.owner()),
            encode_path_segment(repo.name()),
            resource
        )
    }
}

#[async_trait]
impl LabelService for GitHubClient {
    async fn list_labels(&self, repo: &RepositoryRef, page: u32) -> Result<LabelPage> {
        let page = page.to_string();
        let params = [("per_page", PER_PAGE), ("page", page.as_str())];

        let response: Page<RemoteLabel> = self
            .octocrab
            .get(Self::repo_route(repo, "labels"), Some(&params))
            .await?;

        Ok(LabelPage {
            next_page: next_page(&response),
            labels: response.items,
        })
    }

    async fn create_label(
        &self,
        repo: &RepositoryRef,
        label: &LabelRequest,
    ) -> Result<RemoteLabel> {
        let created: RemoteLabel = self
            .octocrab
            .post(Self::repo_route(repo, "labels"), Some(label))
            .await?;
        Ok(created)
    }

    async fn edit_label(
        &self,
        repo: &RepositoryRef,
        name: &str,
        label: &LabelRequest,
    ) -> Result<RemoteLabel> {
        // Label names may contain spaces and non-ASCII characters
        let route = Self::repo_route(repo, &format!("labels/{}", encode_path_segment(name)));
        let edited: RemoteLabel = self.octocrab.patch(route, Some(label)).await?;
        Ok(edited)
    }
}

#[async_trait]
impl MilestoneService for GitHubClient {
    async fn list_milestones(&self, repo: &RepositoryRef, page: u32) -> Result<MilestonePage> {
        let page = page.to_string();
        let params = [
            ("state", "all"),
            ("per_page", PER_PAGE),
            ("page", page.as_str()),
        ];

        let response: Page<ApiMilestone> = self
            .octocrab
            .get(Self::repo_route(repo, "milestones"), Some(&params))
            .await?;

        Ok(MilestonePage {
            next_page: next_page(&response),
            milestones: response.items.into_iter().map(Into::into).collect(),
        })
    }

    async fn create_milestone(
        &self,
        repo: &RepositoryRef,
        milestone: &MilestoneRequest,
    ) -> Result<RemoteMilestone> {
        let created: ApiMilestone = self
            .octocrab
            .post(Self::repo_route(repo, "milestones"), Some(milestone))
            .await?;
        Ok(created.into())
    }

    async fn edit_milestone(
        &self,
        repo: &RepositoryRef,
        number: u64,
        milestone: &MilestoneRequest,
    ) -> Result<RemoteMilestone> {
        let route = Self::repo_route(repo, &format!("milestones/{}", number));
        let edited: ApiMilestone = self.octocrab.patch(route, Some(milestone)).await?;
        Ok(edited.into())
    }
}
