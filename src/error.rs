//! Error Handling
//!
//! Error type definitions used in ghsync

use thiserror::Error;

use crate::sync::Stage;

pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ghsync
#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub API error")]
    GitHubApi(#[from] octocrab::Error),

    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Configuration validation error: {0}")]
    ConfigValidation(String),

    #[error("Authentication failed: invalid token")]
    AuthenticationFailed,

    /// Failure reported by a remote service that is not an octocrab error
    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("repository {0:?} has an invalid format (expected 'owner/repo')")]
    InvalidRepositoryFormat(String),

    #[error(
        "color {color:?} of label {label:?} for repository {repository} is invalid \
         (expected six hexadecimal digits)"
    )]
    InvalidLabelColor {
        label: String,
        color: String,
        repository: String,
    },

    #[error("state {state:?} of milestone {milestone:?} is invalid (valid values are \"open\" and \"closed\")")]
    InvalidMilestoneState { milestone: String, state: String },

    #[error("due date {due:?} of milestone {milestone:?} is invalid (expected RFC 3339, e.g. \"2024-06-30T00:00:00Z\")")]
    InvalidDueDate { milestone: String, due: String },

    #[error("could not list existing {resource} of repository {repository}")]
    FetchFailed {
        resource: &'static str,
        repository: String,
        #[source]
        source: Box<Error>,
    },

    #[error("could not create {resource} {name:?} in repository {repository}")]
    CreateFailed {
        resource: &'static str,
        name: String,
        repository: String,
        #[source]
        source: Box<Error>,
    },

    #[error("could not update {resource} {name:?} in repository {repository}")]
    UpdateFailed {
        resource: &'static str,
        name: String,
        repository: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Error syncing {stage}")]
    Sync {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a new configuration validation error
    pub fn config_validation<S: Into<String>>(message: S) -> Self {
        Error::ConfigValidation(message.into())
    }

    /// Create a new remote service error
    pub fn remote<S: Into<String>>(message: S) -> Self {
        Error::Remote(message.into())
    }

    /// Stage the error was raised in, if it came out of the orchestrator
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Sync { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
