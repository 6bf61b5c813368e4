use bytes::Bytes;
use http_body_util::Full;
use hyper::{header, service::Service, Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::{AuthRejection, BearerAuth};
use crate::openapi::{openapi_document, swagger_ui_html, DOC_PATH};
use kmf_task::TaskRunner;

type Body = Full<Bytes>;
type BoxError = Box<dyn std::error::Error + Send + Sync>;

const UPDATE_PATH: &str = "/update";
const SWAGGER_UI_PATH: &str = "/swagger-ui";

struct ServerState {
    runner: Arc<TaskRunner>,
    auth: BearerAuth,
}

pub struct UpdateServer {
    state: Arc<ServerState>,
}

impl UpdateServer {
    pub fn new(runner: Arc<TaskRunner>, secret: Option<String>) -> Self {
        Self {
            state: Arc::new(ServerState {
                runner,
                auth: BearerAuth::new(secret),
            }),
        }
    }

    pub async fn start(self, addr: SocketAddr) -> Result<(), BoxError> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    pub async fn serve(self, listener: TcpListener) -> Result<(), BoxError> {
        info!("Listening on http://{}", listener.local_addr()?);

        loop {
            let (stream, _) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let service = UpdateService {
                state: self.state.clone(),
            };

            tokio::spawn(async move {
                if let Err(err) = hyper::server::conn::http1::Builder::new()
                    .serve_connection(io, service)
                    .await
                {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }

    /// Routes one request. The request body is never read.
    pub async fn handle<B>(&self, req: Request<B>) -> Result<Response<Body>, BoxError> {
        handle_request(&self.state, req).await
    }
}

#[derive(Clone)]
struct UpdateService {
    state: Arc<ServerState>,
}

impl Service<Request<hyper::body::Incoming>> for UpdateService {
    type Response = Response<Body>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<hyper::body::Incoming>) -> Self::Future {
        let state = self.state.clone();
        Box::pin(async move { handle_request(&state, req).await })
    }
}

async fn handle_request<B>(
    state: &ServerState,
    req: Request<B>,
) -> Result<Response<Body>, BoxError> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let auth = state.auth.check(req.headers());
    drop(req);

    match (method, path.as_str()) {
        (Method::POST, UPDATE_PATH) => match auth {
            Ok(()) => {
                // task outcomes are only logged
                state.runner.run_all().await;
                Ok(Response::builder()
                    .status(StatusCode::OK)
                    .body(Body::new(Bytes::new()))?)
            }
            Err(rejection) => unauthorized(rejection),
        },
        (Method::GET, DOC_PATH) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(openapi_document().to_string()))?),
        (Method::GET, SWAGGER_UI_PATH) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/html; charset=UTF-8")
            .body(Body::from(swagger_ui_html(DOC_PATH)))?),
        (_, UPDATE_PATH) => method_not_allowed("POST"),
        (_, DOC_PATH | SWAGGER_UI_PATH) => method_not_allowed("GET"),
        _ => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("404 Not Found"))?),
    }
}

fn unauthorized(rejection: AuthRejection) -> Result<Response<Body>, BoxError> {
    if rejection == AuthRejection::NotConfigured {
        warn!("SECRET not specified, rejecting update request");
    }
    Ok(Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header(header::WWW_AUTHENTICATE, rejection.challenge())
        .body(Body::from("Unauthorized"))?)
}

fn method_not_allowed(allow: &'static str) -> Result<Response<Body>, BoxError> {
    Ok(Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(header::ALLOW, allow)
        .body(Body::from("Method not allowed"))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use http_body_util::{BodyExt, Empty};
    use kmf_task::{Schedule, Task, TaskError, UpdateHandler, UpdateOutcome};
    use std::sync::Mutex;

    struct RecordingHandler {
        calls: Arc<Mutex<Vec<&'static str>>>,
        label: &'static str,
        outcome: Result<UpdateOutcome, ()>,
    }

    #[async_trait]
    impl UpdateHandler for RecordingHandler {
        async fn run(&self) -> Result<UpdateOutcome, TaskError> {
            self.calls.lock().unwrap().push(self.label);
            self.outcome
                .clone()
                .map_err(|_| TaskError::MissingConfig("KMF_STATION_URL_BASE"))
        }
    }

    fn server(calls: &Arc<Mutex<Vec<&'static str>>>) -> UpdateServer {
        let task = |label: &'static str, outcome| {
            Task::new(
                label,
                Schedule::EveryHours(6),
                Arc::new(RecordingHandler {
                    calls: calls.clone(),
                    label,
                    outcome,
                }),
            )
        };
        let runner = TaskRunner::new(vec![
            task(
                "rejected",
                Ok(UpdateOutcome::PublishRejected {
                    status: 500,
                    body: "boom".to_string(),
                }),
            ),
            task("failing", Err(())),
            task("fine", Ok(UpdateOutcome::NoAsset)),
        ]);
        UpdateServer::new(Arc::new(runner), Some("s3cret".to_string()))
    }

    fn request(method: Method, path: &str, token: Option<&str>) -> Request<Empty<Bytes>> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Empty::new()).unwrap()
    }

    async fn body_text(rsp: Response<Body>) -> String {
        let bytes = rsp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_update_runs_all_tasks_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let server = server(&calls);

        let rsp = server
            .handle(request(Method::POST, "/update", Some("s3cret")))
            .await
            .unwrap();

        assert_eq!(rsp.status(), StatusCode::OK);
        assert_eq!(body_text(rsp).await, "");
        assert_eq!(*calls.lock().unwrap(), vec!["rejected", "failing", "fine"]);
    }

    #[tokio::test]
    async fn test_update_without_token_is_unauthorized() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let server = server(&calls);

        let rsp = server
            .handle(request(Method::POST, "/update", None))
            .await
            .unwrap();

        assert_eq!(rsp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            rsp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer realm=\"\""
        );
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_with_wrong_token_is_unauthorized() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let server = server(&calls);

        let rsp = server
            .handle(request(Method::POST, "/update", Some("guess")))
            .await
            .unwrap();

        assert_eq!(rsp.status(), StatusCode::UNAUTHORIZED);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_without_configured_secret() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let runner = TaskRunner::new(vec![Task::new(
            "fine",
            Schedule::EveryHours(6),
            Arc::new(RecordingHandler {
                calls: calls.clone(),
                label: "fine",
                outcome: Ok(UpdateOutcome::NoAsset),
            }),
        )]);
        let server = UpdateServer::new(Arc::new(runner), None);

        let rsp = server
            .handle(request(Method::POST, "/update", Some("undefined")))
            .await
            .unwrap();

        assert_eq!(rsp.status(), StatusCode::UNAUTHORIZED);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_doc_and_swagger_ui() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let server = server(&calls);

        let rsp = server
            .handle(request(Method::GET, "/doc", None))
            .await
            .unwrap();
        assert_eq!(rsp.status(), StatusCode::OK);
        let doc: serde_json::Value = serde_json::from_str(&body_text(rsp).await).unwrap();
        assert_eq!(doc["info"]["version"], "v1");

        let rsp = server
            .handle(request(Method::GET, "/swagger-ui", None))
            .await
            .unwrap();
        assert_eq!(rsp.status(), StatusCode::OK);
        assert!(body_text(rsp).await.contains("/doc"));
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let server = server(&calls);

        let rsp = server
            .handle(request(Method::GET, "/update", Some("s3cret")))
            .await
            .unwrap();
        assert_eq!(rsp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(rsp.headers().get(header::ALLOW).unwrap(), "POST");

        let rsp = server
            .handle(request(Method::GET, "/nowhere", None))
            .await
            .unwrap();
        assert_eq!(rsp.status(), StatusCode::NOT_FOUND);
        assert!(calls.lock().unwrap().is_empty());
    }
}
