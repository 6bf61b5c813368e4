use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::TaskError;
use crate::schedule::Schedule;
use kmf_utils::VersionPair;

/// How a single update run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The latest release carries no asset with the expected suffix.
    NoAsset,
    /// The station already serves this version or a newer one.
    AlreadyLatest {
        station: VersionPair,
        upstream: VersionPair,
    },
    /// The asset was uploaded to the station.
    Published { version: String, size: usize },
    /// The station answered the upload with a non-success status.
    PublishRejected { status: u16, body: String },
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOutcome::NoAsset => write!(f, "no matching asset"),
            UpdateOutcome::AlreadyLatest { station, upstream } => {
                write!(f, "already latest (station {}, upstream {})", station, upstream)
            }
            UpdateOutcome::Published { version, size } => {
                write!(f, "published {} ({} bytes)", version, size)
            }
            UpdateOutcome::PublishRejected { status, .. } => {
                write!(f, "publish rejected with status {}", status)
            }
        }
    }
}

/// The work behind a task. Every run re-derives its state from the remote
/// sources, so running it twice in a row is harmless.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn run(&self) -> Result<UpdateOutcome, TaskError>;
}

#[derive(Clone)]
pub struct Task {
    pub name: String,
    pub schedule: Schedule,
    pub handler: Arc<dyn UpdateHandler>,
}

impl Task {
    pub fn new(name: impl Into<String>, schedule: Schedule, handler: Arc<dyn UpdateHandler>) -> Self {
        Task {
            name: name.into(),
            schedule,
            handler,
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}
