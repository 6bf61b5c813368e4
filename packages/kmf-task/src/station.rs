use bytes::Bytes;
use std::collections::HashMap;
use tracing::debug;

use crate::error::TaskError;
use kmf_utils::{http::parse_base, HttpClient, HttpError, ResponseData};

const STATION_URL_KEY: &str = "KMF_STATION_URL_BASE";
const STATION_SECRET_KEY: &str = "KMF_STATION_SECRET";

/// Client for the distribution station's `/mod/{task}/{version}` resource.
#[derive(Clone)]
pub struct StationClient {
    http: HttpClient,
    base_url: Option<String>,
    secret: Option<String>,
}

impl StationClient {
    pub fn new(http: HttpClient, base_url: Option<String>, secret: Option<String>) -> Self {
        StationClient {
            http,
            base_url,
            secret,
        }
    }

    /// `/mod/{task}/{version}` on the station origin; any path on the base is
    /// replaced.
    pub fn mod_url(&self, task: &str, version: &str) -> Result<String, TaskError> {
        let base = self
            .base_url
            .as_deref()
            .ok_or(TaskError::MissingConfig(STATION_URL_KEY))?;
        let mut url = parse_base(base)?
            .join("/mod/")
            .map_err(|source| HttpError::Join {
                base: base.to_string(),
                location: "/mod/".to_string(),
                source,
            })?;
        url.path_segments_mut()
            .map_err(|_| HttpError::NotAbsolute(base.to_string()))?
            .pop_if_empty()
            .push(task)
            .push(version);
        Ok(url.into())
    }

    /// Returns the `Location` the station redirects to for this version,
    /// without following it.
    pub async fn probe_location(
        &self,
        task: &str,
        version: &str,
    ) -> Result<Option<String>, TaskError> {
        let url = self.mod_url(task, version)?;
        let rsp = self.http.get(&url, &HashMap::new()).await?;
        debug!(status = rsp.status, location = ?rsp.location(), "station redirect location");
        Ok(rsp.location().map(str::to_string))
    }

    /// Uploads the raw asset. A non-success status is returned, not raised.
    pub async fn publish(
        &self,
        task: &str,
        version: &str,
        body: Bytes,
    ) -> Result<ResponseData, TaskError> {
        let secret = self
            .secret
            .as_deref()
            .ok_or(TaskError::MissingConfig(STATION_SECRET_KEY))?;
        let url = self.mod_url(task, version)?;
        let header_map = HashMap::from([
            (
                "content-type".to_string(),
                "application/octet-stream".to_string(),
            ),
            ("authorization".to_string(), format!("Bearer {}", secret)),
        ]);
        Ok(self.http.post(&url, &header_map, body).await?)
    }
}
