pub mod http;
pub mod versioning;

// Re-export main utilities
pub use http::{HttpClient, HttpError, ResponseData};
pub use versioning::{should_skip, VersionPair};
