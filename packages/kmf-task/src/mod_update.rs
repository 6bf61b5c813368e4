//! Propagates a mod archive from an upstream release to the station.
//!
//! One run:
//! 1. fetch the latest upstream release and pick the archive by suffix,
//! 2. ask the station which version it serves (the `Location` of a redirect),
//! 3. stop if the station is already current,
//! 4. otherwise download the archive and upload it unchanged.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::TaskError;
use crate::station::StationClient;
use crate::task::{UpdateHandler, UpdateOutcome};
use kmf_provider::{AssetData, ReleaseProvider, RepoId};
use kmf_utils::{should_skip, HttpClient, VersionPair};

const USER_AGENT: &str = concat!("kmf-updater/", env!("CARGO_PKG_VERSION"));

/// Static description of one mod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModSpec {
    /// Task name, also the station path segment.
    pub name: String,
    pub repo: RepoId,
    /// Suffix that selects the archive among the release assets.
    pub asset_suffix: String,
    /// Extension stripped from the archive name to form the version.
    pub archive_extension: String,
}

impl ModSpec {
    /// `25.1.0.8925226.zh.mod.zip` -> `25.1.0.8925226.zh`
    pub fn version_of(&self, file_name: &str) -> String {
        file_name
            .strip_suffix(self.archive_extension.as_str())
            .unwrap_or(file_name)
            .to_string()
    }
}

pub struct ModUpdater {
    spec: ModSpec,
    provider: Arc<dyn ReleaseProvider>,
    station: StationClient,
    http: HttpClient,
}

impl ModUpdater {
    pub fn new(
        spec: ModSpec,
        provider: Arc<dyn ReleaseProvider>,
        station: StationClient,
        http: HttpClient,
    ) -> Self {
        ModUpdater {
            spec,
            provider,
            station,
            http,
        }
    }

    async fn download(&self, asset: &AssetData) -> Result<Bytes, TaskError> {
        let header_map = HashMap::from([
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            ("Accept".to_string(), "application/octet-stream".to_string()),
        ]);
        let rsp = self
            .http
            .get_following_redirects(&asset.download_url, &header_map)
            .await?;
        if !rsp.is_success() {
            return Err(TaskError::Download {
                url: asset.download_url.clone(),
                status: rsp.status,
            });
        }
        Ok(rsp.body)
    }
}

#[async_trait]
impl UpdateHandler for ModUpdater {
    async fn run(&self) -> Result<UpdateOutcome, TaskError> {
        let name = self.spec.name.as_str();
        let release = self.provider.get_latest_release(&self.spec.repo).await?;

        let Some(archive) = release.find_asset_by_suffix(&self.spec.asset_suffix) else {
            warn!(
                task = name,
                release = %release.name,
                "Latest release does not have a valid archive"
            );
            return Ok(UpdateOutcome::NoAsset);
        };
        let version = self.spec.version_of(&archive.file_name);
        info!(task = name, "{} latest version: {}", self.provider.get_friendly_name(), version);

        let location = self.station.probe_location(name, &version).await?;
        let station_version = location.as_deref().and_then(VersionPair::find);
        info!(
            task = name,
            "Station latest version: {}",
            station_version.unwrap_or("unknown")
        );

        // an unknown version on either side means publish
        let station_pair = station_version.and_then(VersionPair::extract);
        let upstream_pair = VersionPair::extract(&version);
        if let (Some(station), Some(upstream)) = (station_pair, upstream_pair) {
            if should_skip(station, upstream) {
                info!(task = name, "Already latest.");
                return Ok(UpdateOutcome::AlreadyLatest { station, upstream });
            }
        }

        let blob = self.download(archive).await?;
        let size = blob.len();
        info!(task = name, size, "Downloaded archive");

        let rsp = self.station.publish(name, &version, blob).await?;
        if !rsp.is_success() {
            let body = rsp.text();
            warn!(task = name, status = rsp.status, "Update failed: {}", body);
            return Ok(UpdateOutcome::PublishRejected {
                status: rsp.status,
                body,
            });
        }

        info!(task = name, %version, "Update succeed.");
        Ok(UpdateOutcome::Published { version, size })
    }
}
