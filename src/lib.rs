//! Keeps the KMF station in step with upstream mod releases.
//!
//! The workspace packages are re-exported here; [`build_runner`] wires them
//! from a [`Config`].

pub use kmf_config as config;
pub use kmf_provider as provider;
pub use kmf_server as server;
pub use kmf_task as task;
pub use kmf_utils as utils;

use std::sync::Arc;

use kmf_config::Config;
use kmf_provider::GitHubProvider;
use kmf_task::{default_tasks, StationClient, TaskContext, TaskRunner};
use kmf_utils::{HttpClient, HttpError};

/// Builds the runner holding every registered task.
pub fn build_runner(config: &Config) -> Result<TaskRunner, HttpError> {
    let http = HttpClient::new()?;
    let mut github = GitHubProvider::new(http.clone()).with_token(config.github_token.clone());
    if let Some(api_url) = &config.github_api_url {
        github = github.with_api_url(api_url.as_str());
    }
    let context = TaskContext {
        provider: Arc::new(github),
        station: StationClient::new(
            http.clone(),
            config.station_url_base.clone(),
            config.station_secret.clone(),
        ),
        http,
    };
    Ok(TaskRunner::new(default_tasks(&context)))
}
