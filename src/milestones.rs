//! Milestone Reconciliation
//!
//! Milestones are matched by exact title. A matching milestone is always
//! edited, even if it already has the configured values; labels on the other
//! hand are only touched when their color differs.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::MilestoneConfig;
use crate::error::{Error, Result};
use crate::repository::RepositoryRef;
use crate::service::{MilestoneRequest, MilestoneService, MilestoneState, RemoteMilestone};
use crate::sync::{Resource, SyncOperation, SyncReport};

/// Fetch every milestone of a repository, open and closed
///
/// Milestones are returned in fetch order. Duplicate titles are kept.
///
/// # Errors
/// Returns `FetchFailed` wrapping the first failing page request
pub async fn fetch_milestones<S: MilestoneService + ?Sized>(
    repo: &RepositoryRef,
    service: &S,
) -> Result<Vec<RemoteMilestone>> {
    let mut milestones = Vec::new();
    let mut page = 0;

    loop {
        debug!("  Requesting milestones page {} of {}", page, repo);
        let response = service
            .list_milestones(repo, page)
            .await
            .map_err(|e| Error::FetchFailed {
                resource: "milestones",
                repository: repo.to_string(),
                source: Box::new(e),
            })?;

        milestones.extend(response.milestones);

        match response.next_page {
            Some(next) => page = next,
            None => break,
        }
    }

    Ok(milestones)
}

/// Resolve the configured state, treating an empty value as "open"
fn desired_state(milestone: &MilestoneConfig) -> Result<MilestoneState> {
    if milestone.state.is_empty() {
        return Ok(MilestoneState::Open);
    }

    milestone
        .state
        .parse()
        .map_err(|_| Error::InvalidMilestoneState {
            milestone: milestone.title.clone(),
            state: milestone.state.clone(),
        })
}

/// Parse the configured due date as RFC 3339
fn desired_due_date(milestone: &MilestoneConfig) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&milestone.due_date)
        .map(|due| due.with_timezone(&Utc))
        .map_err(|_| Error::InvalidDueDate {
            milestone: milestone.title.clone(),
            due: milestone.due_date.clone(),
        })
}

/// Pick the milestone an update is addressed to
///
/// If several milestones share the title, the last one in fetch order wins.
pub fn find_milestone<'a>(
    existing: &'a [RemoteMilestone],
    title: &str,
) -> Option<&'a RemoteMilestone> {
    existing.iter().rev().find(|m| m.title == title)
}

/// Describe how a remote milestone differs from the request
fn describe_changes(current: &RemoteMilestone, request: &MilestoneRequest) -> Vec<String> {
    let mut changes = Vec::new();

    if current.description != request.description {
        changes.push(format!(
            "description: {:?} -> {:?}",
            current.description, request.description
        ));
    }

    if current.state != request.state {
        changes.push(format!("state: {} -> {}", current.state, request.state));
    }

    if current.due_on != Some(request.due_on) {
        let old_due = current
            .due_on
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| "(none)".to_string());
        changes.push(format!("due: {} -> {}", old_due, request.due_on.to_rfc3339()));
    }

    changes
}

/// Make sure a milestone exists with the configured values
///
/// The state and due date are validated before the existing milestones are
/// searched, so an invalid entry fails without any remote call.
///
/// # Returns
/// The operation that was performed
///
/// # Errors
/// - `InvalidMilestoneState` if the state is neither "open" nor "closed"
/// - `InvalidDueDate` if the due date is not RFC 3339
/// - `CreateFailed` / `UpdateFailed` if the remote call fails
pub async fn ensure_milestone<S: MilestoneService + ?Sized>(
    milestone: &MilestoneConfig,
    repo: &RepositoryRef,
    existing: &[RemoteMilestone],
    service: &S,
) -> Result<SyncOperation> {
    let state = desired_state(milestone)?;
    let due_on = desired_due_date(milestone)?;

    let request = MilestoneRequest {
        title: milestone.title.clone(),
        description: milestone.description.clone(),
        due_on,
        state,
    };

    let duplicates = existing
        .iter()
        .filter(|m| m.title == milestone.title)
        .count();
    if duplicates > 1 {
        warn!(
            "  Found {} milestones titled {:?}, updating the last one",
            duplicates, milestone.title
        );
    }

    match find_milestone(existing, &milestone.title) {
        None => {
            info!("  Creating milestone {:?}", milestone.title);
            service
                .create_milestone(repo, &request)
                .await
                .map_err(|e| Error::CreateFailed {
                    resource: "milestone",
                    name: milestone.title.clone(),
                    repository: repo.to_string(),
                    source: Box::new(e),
                })?;

            Ok(SyncOperation::Create {
                resource: Resource::Milestone,
                name: milestone.title.clone(),
            })
        }
        Some(current) => {
            info!(
                "  Updating milestone {:?} (#{})",
                milestone.title, current.number
            );
            let changes = describe_changes(current, &request);
            service
                .edit_milestone(repo, current.number, &request)
                .await
                .map_err(|e| Error::UpdateFailed {
                    resource: "milestone",
                    name: milestone.title.clone(),
                    repository: repo.to_string(),
                    source: Box::new(e),
                })?;

            Ok(SyncOperation::Update {
                resource: Resource::Milestone,
                name: milestone.title.clone(),
                changes,
            })
        }
    }
}

/// Synchronize milestones across repositories
///
/// Same fail-fast, one-repository-at-a-time structure as label sync.
///
/// # Errors
/// Returns the first fetch, validation or remote error
pub async fn sync_milestones<S: MilestoneService + ?Sized>(
    milestones: &[MilestoneConfig],
    repos: &[RepositoryRef],
    service: &S,
) -> Result<SyncReport> {
    let mut report = SyncReport::new(Resource::Milestone);

    for repo in repos {
        info!("Processing repository {:?}", repo.to_string());
        let existing = fetch_milestones(repo, service).await?;
        info!("  Found {} milestones", existing.len());

        for milestone in milestones {
            let operation = ensure_milestone(milestone, repo, &existing, service).await?;
            report.add_operation(operation);
        }
        report.finish_repository();
    }

    Ok(report)
}
