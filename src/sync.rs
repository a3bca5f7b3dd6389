//! Synchronization Run
//!
//! Operation bookkeeping and the orchestrator that runs the label pass and then
//! the milestone pass over all repositories

use std::fmt;

use tracing::info;

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::labels::sync_labels;
use crate::milestones::sync_milestones;
use crate::repository::RepositoryRef;
use crate::service::{LabelService, MilestoneService};

/// Kind of repository metadata being synchronized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Label,
    Milestone,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Label => f.write_str("label"),
            Resource::Milestone => f.write_str("milestone"),
        }
    }
}

/// Stage of a run, used to tag errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Labels,
    Milestones,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Labels => f.write_str("labels"),
            Stage::Milestones => f.write_str("milestones"),
        }
    }
}

/// Types of synchronization operations
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOperation {
    /// Created on the remote
    Create { resource: Resource, name: String },

    /// Edited on the remote
    Update {
        resource: Resource,
        name: String,
        changes: Vec<String>,
    },

    /// Already matched the configuration
    NoChange { resource: Resource, name: String },
}

impl SyncOperation {
    /// Name or title of the item the operation applies to
    pub fn name(&self) -> &str {
        match self {
            SyncOperation::Create { name, .. }
            | SyncOperation::Update { name, .. }
            | SyncOperation::NoChange { name, .. } => name,
        }
    }
}

/// Result of one synchronization pass
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// What this pass synchronized
    pub resource: Resource,

    /// Executed operations, in order
    pub operations: Vec<SyncOperation>,

    /// Number of repositories fully processed
    pub repositories: u32,

    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
}

impl SyncReport {
    /// Create a new empty report
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            operations: Vec::new(),
            repositories: 0,
            created: 0,
            updated: 0,
            unchanged: 0,
        }
    }

    /// Add an operation and update statistics
    pub fn add_operation(&mut self, operation: SyncOperation) {
        match &operation {
            SyncOperation::Create { .. } => self.created += 1,
            SyncOperation::Update { .. } => self.updated += 1,
            SyncOperation::NoChange { .. } => self.unchanged += 1,
        }
        self.operations.push(operation);
    }

    /// Mark one more repository as done
    pub fn finish_repository(&mut self) {
        self.repositories += 1;
    }

    /// Whether any remote call was made
    pub fn has_changes(&self) -> bool {
        self.created > 0 || self.updated > 0
    }

    /// Get total number of operations
    pub fn total_operations(&self) -> u32 {
        self.created + self.updated + self.unchanged
    }
}

/// Reports of a complete run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub labels: SyncReport,
    pub milestones: SyncReport,
}

/// Synchronize labels, then milestones, across all repositories
///
/// The label pass finishes for every repository before the milestone pass
/// starts. The first error ends the run.
///
/// # Errors
/// `Error::Sync` carrying the failed stage and the underlying error
pub async fn run<S>(config: &SyncConfig, repos: &[RepositoryRef], service: &S) -> Result<RunReport>
where
    S: LabelService + MilestoneService + ?Sized,
{
    info!("Syncing Labels");
    let labels = sync_labels(&config.labels, repos, service)
        .await
        .map_err(|e| Error::Sync {
            stage: Stage::Labels,
            source: Box::new(e),
        })?;

    info!("Syncing Milestones");
    let milestones = sync_milestones(&config.milestones, repos, service)
        .await
        .map_err(|e| Error::Sync {
            stage: Stage::Milestones,
            source: Box::new(e),
        })?;

    Ok(RunReport { labels, milestones })
}
