//! # ghsync
//!
//! Keep issue labels and milestones consistent across many GitHub repositories
//!
//! ## Features
//! - Label synchronization (name and color)
//! - Milestone synchronization (title, description, state and due date)
//! - Paginated fetching of the current state of every repository
//! - Dry-run mode
//!
//! Labels and milestones that are not part of the configuration are left
//! untouched.

pub mod config;
pub mod error;
pub mod github;
pub mod labels;
pub mod milestones;
pub mod repository;
pub mod service;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{MilestoneConfig, SyncConfig};
pub use error::{Error, Result};
pub use github::GitHubClient;
pub use repository::RepositoryRef;
pub use service::{DryRun, LabelService, MilestoneService};
pub use sync::{run, RunReport, Stage, SyncOperation, SyncReport};

/// Synchronize labels and milestones of the given repositories
///
/// # Examples
///
/// ```rust,no_run
/// use ghsync::{MilestoneConfig, RepositoryRef, SyncConfig};
///
/// #[tokio::main]
/// async fn main() -> ghsync::Result<()> {
///     let mut config = SyncConfig::default();
///     config.labels.insert("bug".to_string(), "#d73a4a".to_string());
///     config
///         .milestones
///         .push(MilestoneConfig::new("Version 1.0", "2024-06-30T00:00:00Z"));
///
///     let repos = vec![RepositoryRef::parse("owner/repo")?];
///     let report = ghsync::sync_repositories(Some("your_github_token"), &config, &repos).await?;
///
///     println!("Created {} labels", report.labels.created);
///     Ok(())
/// }
/// ```
pub async fn sync_repositories(
    access_token: Option<&str>,
    config: &SyncConfig,
    repos: &[RepositoryRef],
) -> Result<RunReport> {
    let client = GitHubClient::new(access_token).await?;
    run(config, repos, &client).await
}
