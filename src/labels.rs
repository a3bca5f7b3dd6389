//! Label Reconciliation
//!
//! Brings the labels of each repository in line with the configured
//! name → color mapping. Existing labels that already match are left alone,
//! labels missing from the configuration are never deleted.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::{is_valid_hex_color, normalize_color};
use crate::error::{Error, Result};
use crate::repository::RepositoryRef;
use crate::service::{LabelRequest, LabelService};
use crate::sync::{Resource, SyncOperation, SyncReport};

/// Fetch every label of a repository
///
/// Follows the pagination of `list_labels` starting at page 0 until no next
/// page is announced. Later pages overwrite earlier entries with the same name.
///
/// # Returns
/// Map from label name to color
///
/// # Errors
/// Returns `FetchFailed` wrapping the first failing page request
pub async fn fetch_labels<S: LabelService + ?Sized>(
    repo: &RepositoryRef,
    service: &S,
) -> Result<BTreeMap<String, String>> {
    let mut labels = BTreeMap::new();
    let mut page = 0;

    loop {
        debug!("  Requesting labels page {} of {}", page, repo);
        let response = service
            .list_labels(repo, page)
            .await
            .map_err(|e| Error::FetchFailed {
                resource: "labels",
                repository: repo.to_string(),
                source: Box::new(e),
            })?;

        for label in response.labels {
            labels.insert(label.name, label.color);
        }

        match response.next_page {
            Some(next) => page = next,
            None => break,
        }
    }

    Ok(labels)
}

/// Make sure a label exists with the given color
///
/// # Arguments
/// - `name`: Label name
/// - `color`: Desired color, 6 hex digits with an optional leading #
/// - `repo`: Target repository
/// - `existing`: Labels currently in the repository (name → color)
/// - `service`: Remote label service
///
/// # Returns
/// The operation that was performed
///
/// # Errors
/// - `InvalidLabelColor` if the color is not 6 hex digits (no remote call is made)
/// - `CreateFailed` / `UpdateFailed` if the remote call fails
pub async fn ensure_label<S: LabelService + ?Sized>(
    name: &str,
    color: &str,
    repo: &RepositoryRef,
    existing: &BTreeMap<String, String>,
    service: &S,
) -> Result<SyncOperation> {
    let color = normalize_color(color);
    if !is_valid_hex_color(color) {
        return Err(Error::InvalidLabelColor {
            label: name.to_string(),
            color: color.to_string(),
            repository: repo.to_string(),
        });
    }

    let request = LabelRequest {
        name: name.to_string(),
        color: color.to_string(),
    };

    match existing.get(name) {
        None => {
            info!("  Creating label {:?}: {:?}", name, color);
            service
                .create_label(repo, &request)
                .await
                .map_err(|e| Error::CreateFailed {
                    resource: "label",
                    name: name.to_string(),
                    repository: repo.to_string(),
                    source: Box::new(e),
                })?;

            Ok(SyncOperation::Create {
                resource: Resource::Label,
                name: name.to_string(),
            })
        }
        Some(current) if current != color => {
            info!("  Updating label {:?}: {:?}", name, color);
            service
                .edit_label(repo, name, &request)
                .await
                .map_err(|e| Error::UpdateFailed {
                    resource: "label",
                    name: name.to_string(),
                    repository: repo.to_string(),
                    source: Box::new(e),
                })?;

            Ok(SyncOperation::Update {
                resource: Resource::Label,
                name: name.to_string(),
                changes: vec![format!("color: {} -> {}", current, color)],
            })
        }
        Some(_) => {
            info!("  Label {:?}: {:?} already exists", name, color);
            Ok(SyncOperation::NoChange {
                resource: Resource::Label,
                name: name.to_string(),
            })
        }
    }
}

/// Synchronize labels across repositories
///
/// Repositories are processed one after another. The first error aborts the
/// whole pass, so later repositories are not touched.
///
/// # Errors
/// Returns the first fetch, validation or remote error
pub async fn sync_labels<S: LabelService + ?Sized>(
    labels: &BTreeMap<String, String>,
    repos: &[RepositoryRef],
    service: &S,
) -> Result<SyncReport> {
    let mut report = SyncReport::new(Resource::Label);

    for repo in repos {
        info!("Processing repository {:?}", repo.to_string());
        let existing = fetch_labels(repo, service).await?;
        info!("  Found {} labels", existing.len());

        for (name, color) in labels {
            let operation = ensure_label(name, color, repo, &existing, service).await?;
            report.add_operation(operation);
        }
        report.finish_repository();
    }

    Ok(report)
}
