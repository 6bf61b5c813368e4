use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{header, HeaderMap, Method, Request, StatusCode, Uri};
#[cfg(not(feature = "rustls-platform-verifier"))]
use hyper_rustls::ConfigBuilderExt;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use once_cell::sync::Lazy;
use rustls::ClientConfig;
#[cfg(feature = "rustls-platform-verifier")]
use rustls_platform_verifier::BuilderVerifierExt;
use std::{collections::HashMap, fmt, sync::Arc};
use thiserror::Error;
use tracing::debug;
use url::Url;

const MAX_REDIRECTS: usize = 10;

type HttpsConnector = hyper_rustls::HttpsConnector<HttpConnector>;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: hyper::http::uri::InvalidUri,
    },
    #[error("`{0}` is not an absolute url")]
    NotAbsolute(String),
    #[error("invalid base url `{url}`: {source}")]
    Base {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("cannot resolve `{location}` against `{base}`: {source}")]
    Join {
        base: String,
        location: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build request: {0}")]
    Request(#[from] hyper::http::Error),
    #[error("request failed: {0}")]
    Client(#[from] hyper_util::client::legacy::Error),
    #[error("failed to read response body: {0}")]
    Body(#[from] hyper::Error),
    #[error("tls configuration failed: {0}")]
    Tls(Box<dyn std::error::Error + Send + Sync>),
    #[error("too many redirects, last location `{0}`")]
    TooManyRedirects(String),
}

#[derive(Debug)]
pub struct ResponseData {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ResponseData {
    pub fn is_success(&self) -> bool {
        StatusCode::from_u16(self.status).is_ok_and(|status| status.is_success())
    }

    pub fn is_redirect(&self) -> bool {
        StatusCode::from_u16(self.status).is_ok_and(|status| status.is_redirection())
    }

    /// Header value as text, `None` when absent or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn location(&self) -> Option<&str> {
        self.header(header::LOCATION.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl fmt::Display for ResponseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Response status: {}, body: {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        )
    }
}

/// Shared client for every outbound call.
///
/// Redirects are never followed implicitly: a 3xx response is returned as
/// is, so its `Location` header stays readable. Use
/// [`HttpClient::get_following_redirects`] when the final resource is wanted.
#[derive(Clone)]
pub struct HttpClient {
    client: Client<HttpsConnector, Full<Bytes>>,
}

impl HttpClient {
    pub fn new() -> Result<Self, HttpError> {
        let https = https_config()?;
        Ok(Self {
            client: Client::builder(TokioExecutor::new()).build(https),
        })
    }

    pub async fn get(
        &self,
        url: &str,
        header_map: &HashMap<String, String>,
    ) -> Result<ResponseData, HttpError> {
        self.request(Method::GET, url, header_map, Bytes::new()).await
    }

    pub async fn post(
        &self,
        url: &str,
        header_map: &HashMap<String, String>,
        body: Bytes,
    ) -> Result<ResponseData, HttpError> {
        self.request(Method::POST, url, header_map, body).await
    }

    pub async fn get_following_redirects(
        &self,
        url: &str,
        header_map: &HashMap<String, String>,
    ) -> Result<ResponseData, HttpError> {
        let mut current = url.to_string();
        for _ in 0..=MAX_REDIRECTS {
            let rsp = self.get(&current, header_map).await?;
            if !rsp.is_redirect() {
                return Ok(rsp);
            }
            match rsp.location() {
                Some(location) => {
                    let next = resolve_location(&current, location)?;
                    debug!(from = %current, to = %next, "following redirect");
                    current = next;
                }
                None => return Ok(rsp),
            }
        }
        Err(HttpError::TooManyRedirects(current))
    }

    pub async fn request(
        &self,
        method: Method,
        url: &str,
        header_map: &HashMap<String, String>,
        body: Bytes,
    ) -> Result<ResponseData, HttpError> {
        let uri = parse_url(url)?;
        let mut req = Request::builder().method(method).uri(uri);
        for (key, value) in header_map {
            req = req.header(key, value);
        }
        let req = req.body(Full::new(body))?;

        let res = self.client.request(req).await?;
        let (parts, body) = res.into_parts();
        let body = body.collect().await?.to_bytes();
        Ok(ResponseData {
            status: parts.status.as_u16(),
            headers: parts.headers,
            body,
        })
    }
}

fn parse_url(url: &str) -> Result<Uri, HttpError> {
    url.parse::<Uri>().map_err(|source| HttpError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// Parses `base` as an absolute url, the root for [`resolve_location`].
pub fn parse_base(base: &str) -> Result<Url, HttpError> {
    Url::parse(base).map_err(|source| match source {
        url::ParseError::RelativeUrlWithoutBase => HttpError::NotAbsolute(base.to_string()),
        source => HttpError::Base {
            url: base.to_string(),
            source,
        },
    })
}

/// Resolves `location` against `base` the way a browser resolves a link.
///
/// An absolute-path location replaces the whole path of `base`.
pub fn resolve_location(base: &str, location: &str) -> Result<String, HttpError> {
    let resolved = parse_base(base)?
        .join(location)
        .map_err(|source| HttpError::Join {
            base: base.to_string(),
            location: location.to_string(),
            source,
        })?;
    Ok(resolved.into())
}

static PROVIDER: Lazy<Arc<rustls::crypto::CryptoProvider>> =
    Lazy::new(|| Arc::new(rustls::crypto::ring::default_provider()));

fn tls_error<E>(error: E) -> HttpError
where
    E: std::error::Error + Send + Sync + 'static,
{
    HttpError::Tls(Box::new(error))
}

fn https_config() -> Result<HttpsConnector, HttpError> {
    let provider = PROVIDER.clone();
    let tls: ClientConfig;
    #[cfg(feature = "rustls-platform-verifier")]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(tls_error)?
            .with_platform_verifier()
            .map_err(tls_error)?
            .with_no_client_auth();
    }
    #[cfg(all(feature = "webpki-roots", not(feature = "rustls-platform-verifier")))]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(tls_error)?
            .with_webpki_roots()
            .with_no_client_auth();
    }
    #[cfg(all(not(feature = "webpki-roots"), not(feature = "rustls-platform-verifier")))]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(tls_error)?
            .with_native_roots()
            .map_err(tls_error)?
            .with_no_client_auth();
    }
    Ok(hyper_rustls::HttpsConnectorBuilder::new()
        .with_tls_config(tls)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build())
}
