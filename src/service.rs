//! Remote Services
//!
//! The operations the reconcilers need from the issue tracker. The traits keep
//! the reconcilers independent of the transport so tests can substitute
//! in-memory fakes.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::repository::RepositoryRef;

/// Label as stored on the remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLabel {
    /// Label name
    pub name: String,

    /// Label color (6-digit hexadecimal, without #)
    pub color: String,
}

/// Body of a label create or edit call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelRequest {
    pub name: String,
    pub color: String,
}

/// One page of labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelPage {
    pub labels: Vec<RemoteLabel>,

    /// Page to request next, `None` on the last page
    pub next_page: Option<u32>,
}

/// Milestone state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
    #[default]
    Open,
    Closed,
}

impl MilestoneState {
    pub fn as_str(self) -> &'static str {
        match self {
            MilestoneState::Open => "open",
            MilestoneState::Closed => "closed",
        }
    }
}

impl fmt::Display for MilestoneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is neither "open" nor "closed"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMilestoneState(pub String);

impl FromStr for MilestoneState {
    type Err = UnknownMilestoneState;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "open" => Ok(MilestoneState::Open),
            "closed" => Ok(MilestoneState::Closed),
            other => Err(UnknownMilestoneState(other.to_string())),
        }
    }
}

/// Milestone as stored on the remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMilestone {
    /// Remote identifier used to address updates
    pub number: u64,
    pub title: String,
    pub description: String,
    pub state: MilestoneState,
    pub due_on: Option<DateTime<Utc>>,
}

/// Body of a milestone create or edit call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneRequest {
    pub title: String,
    pub description: String,
    pub due_on: DateTime<Utc>,
    pub state: MilestoneState,
}

/// One page of milestones
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilestonePage {
    pub milestones: Vec<RemoteMilestone>,

    /// Page to request next, `None` on the last page
    pub next_page: Option<u32>,
}

/// Label operations on a remote issue tracker
#[async_trait]
pub trait LabelService: Send + Sync {
    /// Fetch one page of the repository's labels
    async fn list_labels(&self, repo: &RepositoryRef, page: u32) -> Result<LabelPage>;

    /// Create a new label
    async fn create_label(&self, repo: &RepositoryRef, label: &LabelRequest)
        -> Result<RemoteLabel>;

    /// Edit the label currently called `name`
    async fn edit_label(
        &self,
        repo: &RepositoryRef,
        name: &str,
        label: &LabelRequest,
    ) -> Result<RemoteLabel>;
}

/// Milestone operations on a remote issue tracker
#[async_trait]
pub trait MilestoneService: Send + Sync {
    /// Fetch one page of the repository's milestones, open and closed alike
    async fn list_milestones(&self, repo: &RepositoryRef, page: u32) -> Result<MilestonePage>;

    /// Create a new milestone
    async fn create_milestone(
        &self,
        repo: &RepositoryRef,
        milestone: &MilestoneRequest,
    ) -> Result<RemoteMilestone>;

    /// Edit the milestone with the given number
    async fn edit_milestone(
        &self,
        repo: &RepositoryRef,
        number: u64,
        milestone: &MilestoneRequest,
    ) -> Result<RemoteMilestone>;
}

/// Dry-run decorator
///
/// Reads go to the wrapped service; creates and edits are logged and skipped.
pub struct DryRun<S> {
    inner: S,
}

impl<S> DryRun<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: LabelService> LabelService for DryRun<S> {
    async fn list_labels(&self, repo: &RepositoryRef, page: u32) -> Result<LabelPage> {
        self.inner.list_labels(repo, page).await
    }

    async fn create_label(
        &self,
        repo: &RepositoryRef,
        label: &LabelRequest,
    ) -> Result<RemoteLabel> {
        warn!("  [dry-run] Skipping creation of label {:?} in {}", label.name, repo);
        Ok(RemoteLabel {
            name: label.name.clone(),
            color: label.color.clone(),
        })
    }

    async fn edit_label(
        &self,
        repo: &RepositoryRef,
        name: &str,
        label: &LabelRequest,
    ) -> Result<RemoteLabel> {
        warn!("  [dry-run] Skipping update of label {:?} in {}", name, repo);
        Ok(RemoteLabel {
            name: label.name.clone(),
            color: label.color.clone(),
        })
    }
}

#[async_trait]
impl<S: MilestoneService> MilestoneService for DryRun<S> {
    async fn list_milestones(&self, repo: &RepositoryRef, page: u32) -> Result<MilestonePage> {
        self.inner.list_milestones(repo, page).await
    }

    async fn create_milestone(
        &self,
        repo: &RepositoryRef,
        milestone: &MilestoneRequest,
    ) -> Result<RemoteMilestone> {
        warn!(
            "  [dry-run] Skipping creation of milestone {:?} in {}",
            milestone.title, repo
        );
        Ok(RemoteMilestone {
            number: 0,
            title: milestone.title.clone(),
            description: milestone.description.clone(),
            state: milestone.state,
            due_on: Some(milestone.due_on),
        })
    }

    async fn edit_milestone(
        &self,
        repo: &RepositoryRef,
        number: u64,
        milestone: &MilestoneRequest,
    ) -> Result<RemoteMilestone> {
        warn!(
            "  [dry-run] Skipping update of milestone {:?} (#{}) in {}",
            milestone.title, number, repo
        );
        Ok(RemoteMilestone {
            number,
            title: milestone.title.clone(),
            description: milestone.description.clone(),
            state: milestone.state,
            due_on: Some(milestone.due_on),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, FakeLabelService, FakeMilestoneService};

    fn repo() -> RepositoryRef {
        RepositoryRef::parse("seiffert/ghsync").unwrap()
    }

    #[test]
    fn test_milestone_state_parsing() {
        assert_eq!("open".parse::<MilestoneState>(), Ok(MilestoneState::Open));
        assert_eq!("closed".parse::<MilestoneState>(), Ok(MilestoneState::Closed));
        assert_eq!(
            "Open".parse::<MilestoneState>(),
            Err(UnknownMilestoneState("Open".to_string()))
        );
        assert_eq!(MilestoneState::default(), MilestoneState::Open);
    }

    #[test]
    fn test_milestone_request_serialization() {
        let request = MilestoneRequest {
            title: "v1".to_string(),
            description: String::new(),
            due_on: "2024-06-30T00:00:00Z".parse().unwrap(),
            state: MilestoneState::Closed,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["state"], "closed");
        assert_eq!(json["due_on"], "2024-06-30T00:00:00Z");
    }

    #[tokio::test]
    async fn test_dry_run_skips_label_mutations() {
        let fake = FakeLabelService::with_labels(&[("bug", "ff0000")]);
        let service = DryRun::new(fake.clone());
        let request = LabelRequest {
            name: "bug".to_string(),
            color: "00ff00".to_string(),
        };

        let page = service.list_labels(&repo(), 0).await.unwrap();
        assert_eq!(page.labels.len(), 1);

        service.create_label(&repo(), &request).await.unwrap();
        service.edit_label(&repo(), "bug", &request).await.unwrap();

        assert_eq!(fake.calls(), vec![Call::ListLabels("seiffert/ghsync".into(), 0)]);
        assert_eq!(fake.labels()[0].color, "ff0000");
    }

    #[tokio::test]
    async fn test_dry_run_skips_milestone_mutations() {
        let fake = FakeMilestoneService::with_titles(&["v1"]);
        let service = DryRun::new(fake.clone());
        let request = MilestoneRequest {
            title: "v1".to_string(),
            description: "changed".to_string(),
            due_on: "2024-06-30T00:00:00Z".parse().unwrap(),
            state: MilestoneState::Open,
        };

        service.create_milestone(&repo(), &request).await.unwrap();
        let edited = service.edit_milestone(&repo(), 1, &request).await.unwrap();
        assert_eq!(edited.number, 1);

        assert!(fake.calls().is_empty());
        assert_eq!(fake.milestones()[0].description, "");
    }
}
