use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::base_provider::{ProviderError, ReleaseProvider, RepoId};
use crate::data::{AssetData, ReleaseData};

use kmf_utils::HttpClient;

pub const GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("kmf-updater/", env!("CARGO_PKG_VERSION"));
const DEFAULT_ASSET_TYPE: &str = "application/octet-stream";

pub struct GitHubProvider {
    http: HttpClient,
    api_url: String,
    token: Option<String>,
}

impl GitHubProvider {
    pub fn new(http: HttpClient) -> Self {
        GitHubProvider {
            http,
            api_url: GITHUB_API_URL.to_string(),
            token: None,
        }
    }

    /// Points the provider at another API root, such as a mirror.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn get_header_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::from([
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            (
                "Accept".to_string(),
                "application/vnd.github+json".to_string(),
            ),
            (
                "X-GitHub-Api-Version".to_string(),
                GITHUB_API_VERSION.to_string(),
            ),
        ]);
        // check if token is empty or blank
        if let Some(token) = self.token.as_ref().filter(|t| !t.trim().is_empty()) {
            map.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        map
    }
}

#[async_trait]
impl ReleaseProvider for GitHubProvider {
    fn get_friendly_name(&self) -> &'static str {
        "github"
    }

    async fn get_latest_release(&self, repo: &RepoId) -> Result<ReleaseData, ProviderError> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_url, repo.owner, repo.repo
        );
        debug!(%url, "fetching latest release");
        let rsp = self.http.get(&url, &self.get_header_map()).await?;
        if !rsp.is_success() {
            return Err(ProviderError::Status {
                url,
                status: rsp.status,
                body: rsp.text(),
            });
        }
        let release = serde_json::from_slice::<GitHubRelease>(&rsp.body)?;
        release.into_release_data()
    }
}

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    name: Option<String>,
    tag_name: Option<String>,
    assets: Option<Vec<GitHubAsset>>,
}

#[derive(Debug, Deserialize)]
struct GitHubAsset {
    name: Option<String>,
    content_type: Option<String>,
    browser_download_url: Option<String>,
}

impl GitHubRelease {
    fn into_release_data(self) -> Result<ReleaseData, ProviderError> {
        let tag_name = self
            .tag_name
            .ok_or(ProviderError::MissingField("tag_name"))?;
        // `name` is null for releases created without a title
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| tag_name.clone());
        let assets = self
            .assets
            .ok_or(ProviderError::MissingField("assets"))?
            .into_iter()
            .filter_map(|asset| {
                Some(AssetData {
                    file_name: asset.name?,
                    file_type: asset
                        .content_type
                        .unwrap_or_else(|| DEFAULT_ASSET_TYPE.to_string()),
                    download_url: asset.browser_download_url?,
                })
            })
            .collect();
        Ok(ReleaseData {
            name,
            tag_name,
            assets,
        })
    }
}
