//! HTTP-to-gRPC gateway library
//!
//! Exposes the gateway pipeline (routing, CORS, upstream adapter and
//! response translation) so it can be embedded and tested without the binary.

pub mod adapter;
pub mod config;
pub mod cors;
pub mod model;
pub mod router;
pub mod server;
pub mod translate;
pub mod upstream;

pub use adapter::{bridge, Completion, Operation, Pending, RpcAdapter, UpstreamClient};
pub use config::GatewayConfig;
pub use cors::CorsPolicy;
pub use model::{NewsItem, NewsSource, Product, ResponsePayload};
pub use router::{Route, RouteTable};
pub use server::{app, GatewayState};
pub use translate::{translate, GatewayResponse};
pub use upstream::GrpcUpstream;
