pub mod base_provider;
pub mod data;
pub mod github;

// Re-export common types
pub use base_provider::{ProviderError, ReleaseProvider, RepoId};
pub use data::{AssetData, ReleaseData};
pub use github::{GitHubProvider, GITHUB_API_URL};
