pub mod auth;
pub mod openapi;
pub mod server;

pub use auth::{AuthRejection, BearerAuth};
pub use server::UpdateServer;
