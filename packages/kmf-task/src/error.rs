use thiserror::Error;

use kmf_provider::ProviderError;
use kmf_utils::HttpError;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0} is not configured")]
    MissingConfig(&'static str),
    #[error("release lookup failed: {0}")]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("asset download from {url} failed with status {status}")]
    Download { url: String, status: u16 },
}
