use hyper::{header, HeaderMap};

/// Static bearer token check for the trigger endpoint.
///
/// Without a configured token every request is rejected.
#[derive(Clone)]
pub struct BearerAuth {
    token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No `Authorization` header.
    Missing,
    /// Wrong scheme or wrong token.
    Invalid,
    /// The server has no token to compare against.
    NotConfigured,
}

impl AuthRejection {
    /// Value for the `WWW-Authenticate` response header.
    pub fn challenge(&self) -> &'static str {
        match self {
            AuthRejection::Missing | AuthRejection::NotConfigured => "Bearer realm=\"\"",
            AuthRejection::Invalid => "Bearer error=\"invalid_token\"",
        }
    }
}

impl BearerAuth {
    pub fn new(token: Option<String>) -> Self {
        BearerAuth { token }
    }

    pub fn check(&self, headers: &HeaderMap) -> Result<(), AuthRejection> {
        let expected = self
            .token
            .as_deref()
            .ok_or(AuthRejection::NotConfigured)?;
        let value = headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthRejection::Missing)?
            .to_str()
            .map_err(|_| AuthRejection::Invalid)?;
        let (scheme, token) = value.split_once(' ').ok_or(AuthRejection::Invalid)?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(AuthRejection::Invalid);
        }
        if constant_time_eq(token.trim_start().as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            Err(AuthRejection::Invalid)
        }
    }
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
