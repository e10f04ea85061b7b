//! Request pipeline tests against stub upstream clients
//!
//! These drive the axum application directly, without a listener.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use error::RpcError;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use news_gateway::{
    app, Completion, CorsPolicy, GatewayState, NewsItem, NewsSource, Operation, ResponsePayload,
    RouteTable, RpcAdapter, UpstreamClient,
};

/// Settles every call with a fixed `(error, response)` callback
struct StubUpstream {
    error: Option<RpcError>,
    response: Option<ResponsePayload>,
    calls: Mutex<Vec<Operation>>,
}

impl StubUpstream {
    fn ok(response: ResponsePayload) -> Arc<Self> {
        Arc::new(Self {
            error: None,
            response: Some(response),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(error: RpcError) -> Arc<Self> {
        Arc::new(Self {
            error: Some(error),
            response: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Operation> {
        self.calls.lock().unwrap().clone()
    }
}

impl UpstreamClient for StubUpstream {
    fn invoke(&self, operation: Operation, completion: Completion) {
        self.calls.lock().unwrap().push(operation);
        let error = self.error.clone();
        let response = self.response.clone();
        tokio::spawn(async move {
            completion.complete(error, response);
        });
    }
}

/// Never answers; reports when the gateway gives up on the call
struct HangingUpstream {
    cancelled: Mutex<Option<tokio::sync::oneshot::Sender<Operation>>>,
}

impl UpstreamClient for HangingUpstream {
    fn invoke(&self, operation: Operation, completion: Completion) {
        let notify = self.cancelled.lock().unwrap().take();
        tokio::spawn(async move {
            completion.closed().await;
            if let Some(tx) = notify {
                let _ = tx.send(operation);
            }
        });
    }
}

fn state(upstream: Arc<dyn UpstreamClient>, cors: CorsPolicy) -> Arc<GatewayState> {
    Arc::new(GatewayState::new(
        RouteTable::with_defaults(),
        RpcAdapter::new(upstream),
        cors,
    ))
}

fn bbc_payload() -> ResponsePayload {
    ResponsePayload::news(vec![NewsItem {
        source: NewsSource {
            id: "1".to_string(),
            name: "BBC".to_string(),
        },
        author: "A".to_string(),
        title: "T".to_string(),
        description: "D".to_string(),
        url: String::new(),
        published_at: "2024-01-01".to_string(),
    }])
}

async fn send(
    state: Arc<GatewayState>,
    method: Method,
    uri: &str,
    origin: Option<&str>,
) -> (StatusCode, http::HeaderMap, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(origin) = origin {
        builder = builder.header(http::header::ORIGIN, origin);
    }
    let request = builder.body(Body::empty()).unwrap();

    let response = app(state).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, headers, body)
}

fn json_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("body should be JSON")
}

#[tokio::test]
async fn test_fresh_news_success() {
    let upstream = StubUpstream::ok(bbc_payload());
    let (status, headers, body) = send(
        state(upstream.clone(), CorsPolicy::AllowAny),
        Method::GET,
        "/fresh-news",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[http::header::CONTENT_TYPE], "application/json");
    assert_eq!(
        json_body(&body),
        json!({"news": [{
            "source": {"id": "1", "name": "BBC"},
            "author": "A",
            "title": "T",
            "description": "D",
            "publishedAt": "2024-01-01"
        }]})
    );
    assert_eq!(upstream.calls(), vec![Operation::FreshNews]);
}

#[tokio::test]
async fn test_unknown_path_not_found() {
    let upstream = StubUpstream::ok(bbc_payload());
    let (status, _, body) = send(
        state(upstream.clone(), CorsPolicy::AllowAny),
        Method::GET,
        "/unknown-path",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body), json!({"error": "Not Found"}));
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_wrong_method_not_found() {
    let upstream = StubUpstream::ok(bbc_payload());
    let (status, _, body) = send(
        state(upstream, CorsPolicy::AllowAny),
        Method::POST,
        "/db-news",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body), json!({"error": "Not Found"}));
}

#[tokio::test]
async fn test_upstream_error_is_generic() {
    let upstream = StubUpstream::failing(RpcError::status(
        tonic::Code::Unavailable,
        "dns error: failed to lookup address news-backend.internal",
    ));
    let (status, _, body) = send(
        state(upstream, CorsPolicy::AllowAny),
        Method::GET,
        "/db-news",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body), json!({"error": "Internal Server Error"}));
    assert!(!String::from_utf8_lossy(&body).contains("news-backend"));
}

#[tokio::test]
async fn test_options_preflight_on_any_path() {
    let upstream = StubUpstream::ok(bbc_payload());
    for path in ["/fresh-news", "/not-a-route", "/"] {
        let (status, headers, body) = send(
            state(upstream.clone(), CorsPolicy::AllowAny),
            Method::OPTIONS,
            path,
            Some("http://localhost:3000"),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
        assert_eq!(headers[http::header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_allow_list_cors() {
    let cors = CorsPolicy::allow_list(["http://localhost:3000"]);
    let upstream = StubUpstream::ok(bbc_payload());

    let (status, headers, _) = send(
        state(upstream.clone(), cors.clone()),
        Method::GET,
        "/news",
        Some("http://localhost:3000"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[http::header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(
        headers[http::header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, OPTIONS"
    );

    let (status, headers, _) = send(
        state(upstream, cors),
        Method::GET,
        "/news",
        Some("http://evil.example"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers.get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    assert!(headers.get(http::header::ACCESS_CONTROL_ALLOW_METHODS).is_none());
}

#[tokio::test]
async fn test_cors_headers_on_errors() {
    let upstream = StubUpstream::failing(RpcError::Transport("refused".to_string()));
    let (status, headers, _) = send(
        state(upstream, CorsPolicy::AllowAny),
        Method::GET,
        "/products",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers[http::header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test(start_paused = true)]
async fn test_deadline_cancels_upstream_call() {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let upstream = Arc::new(HangingUpstream {
        cancelled: Mutex::new(Some(tx)),
    });
    let state = Arc::new(GatewayState::new(
        RouteTable::with_defaults(),
        RpcAdapter::new(upstream).with_deadline(Some(Duration::from_secs(2))),
        CorsPolicy::AllowAny,
    ));

    let (status, _, body) = send(state, Method::GET, "/news-stream", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body), json!({"error": "Internal Server Error"}));
    assert_eq!(rx.await.unwrap(), Operation::NewsStream);
}

#[tokio::test]
async fn test_query_string_is_part_of_the_match() {
    let upstream = StubUpstream::ok(ResponsePayload::products(vec![]));
    let (status, _, body) = send(
        state(upstream.clone(), CorsPolicy::AllowAny),
        Method::GET,
        "/fresh-news?cb=1",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body), json!({"error": "Not Found"}));
    assert!(upstream.calls().is_empty());

    let (status, _, body) = send(
        state(upstream.clone(), CorsPolicy::AllowAny),
        Method::GET,
        "/products",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"products": []}));
}
