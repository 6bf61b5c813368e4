use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::data::ReleaseData;
use kmf_utils::HttpError;

/// Owner/repository pair on the release host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoId {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("release lookup for {url} returned status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("malformed release json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("release json is missing `{0}`")]
    MissingField(&'static str),
}

/// Source of upstream release metadata.
#[async_trait]
pub trait ReleaseProvider: Send + Sync {
    fn get_friendly_name(&self) -> &'static str;

    async fn get_latest_release(&self, repo: &RepoId) -> Result<ReleaseData, ProviderError>;
}
