//! Repository Identifiers
//!
//! Parsing of `owner/name` references and of the repository list read from stdin

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Reference to a GitHub repository
///
/// Both parts are guaranteed to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Parse an `owner/name` string
    ///
    /// The input is split on the first `/`, so everything after it belongs to
    /// the repository name.
    ///
    /// # Errors
    /// Returns `InvalidRepositoryFormat` if the owner or the name is empty
    pub fn parse(text: &str) -> Result<Self> {
        match text.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(Error::InvalidRepositoryFormat(text.to_string())),
        }
    }

    /// Repository owner (user or organization)
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for RepositoryRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Read the list of target repositories, one `owner/name` per line
///
/// Lines are trimmed and blank lines are skipped.
///
/// # Errors
/// If reading fails or any line is not a valid `owner/name` reference
pub fn read_repositories<R: Read>(mut reader: R) -> Result<Vec<RepositoryRef>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(RepositoryRef::parse)
        .collect()
}
