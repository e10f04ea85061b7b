//! HTTP surface
//!
//! Every request goes through a single axum fallback handler so the
//! gateway's own [`RouteTable`] decides what matches:
//!
//! ```text
//! request -> CORS -> OPTIONS? -> 204
//!                 -> dispatch -> none   -> 404
//!                             -> route  -> adapter call -> 200 / 500
//! ```

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Router;
use error::GatewayError;
use http::header::{HeaderMap, HeaderValue, ORIGIN};
use http::{Method, Uri};
use tracing::Instrument;
use uuid::Uuid;

use crate::adapter::RpcAdapter;
use crate::cors::CorsPolicy;
use crate::router::RouteTable;
use crate::translate::{translate, GatewayResponse};

/// State shared read-only by all request tasks
pub struct GatewayState {
    pub routes: RouteTable,
    pub adapter: RpcAdapter,
    pub cors: CorsPolicy,
}

impl GatewayState {
    pub fn new(routes: RouteTable, adapter: RpcAdapter, cors: CorsPolicy) -> Self {
        Self {
            routes,
            adapter,
            cors,
        }
    }

    /// Run one request through the pipeline
    ///
    /// `path` is the request target as sent, so `/news?x=1` is not `/news`.
    pub async fn process(
        &self,
        method: &Method,
        path: &str,
        origin: Option<&HeaderValue>,
    ) -> GatewayResponse {
        let mut cors_headers = HeaderMap::new();
        self.cors.apply(origin, &mut cors_headers);

        let mut response = if *method == Method::OPTIONS {
            GatewayResponse::preflight()
        } else {
            match self.routes.dispatch(method, path) {
                Some(route) => {
                    let result = self.adapter.call(route.operation).await;
                    translate(result.map_err(GatewayError::from))
                }
                None => translate(Err(GatewayError::RouteNotFound {
                    method: method.to_string(),
                    path: path.to_string(),
                })),
            }
        };

        response.headers.extend(cors_headers);
        response
    }
}

/// Build the axum application
pub fn app(state: Arc<GatewayState>) -> Router {
    Router::new().fallback(handle).with_state(state)
}

async fn handle(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let request_id = Uuid::new_v4();
    // Routes compare against the whole request target, query included
    let request_target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let span = tracing::info_span!("request", %request_id, %method, path = request_target);

    async move {
        let response = state.process(&method, request_target, headers.get(ORIGIN)).await;
        tracing::info!("{} {} -> {}", method, request_target, response.status.as_u16());
        response.into_response()
    }
    .instrument(span)
    .await
}
