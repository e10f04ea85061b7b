//! Demo upstream for the news gateway
//!
//! Serves `news.Newservice` (unary, server-streaming and client-streaming
//! calls) and `product.ProductService` over gRPC. Articles come from
//! newsapi.org when a key is configured, otherwise from a sample feed.

pub mod config;
pub mod grpc;
pub mod source;
pub mod store;

use std::sync::Arc;

use tokio::sync::RwLock;

use proto::news::newservice_server::NewserviceServer;
use proto::product::product_service_server::ProductServiceServer;

pub use config::ServiceConfig;
pub use grpc::{NewsServiceImpl, ProductServiceImpl};
pub use source::{ArticleSource, Locale, NewsApiSource, SourceError, StaticSource};
pub use store::NewsStore;

/// Generated server wrappers ready to add to a `tonic::transport::Server`
pub struct Services {
    pub news: NewserviceServer<NewsServiceImpl>,
    pub products: ProductServiceServer<ProductServiceImpl>,
}

/// Build both services over a shared, initially empty store
pub fn build_services(config: &ServiceConfig, source: Arc<dyn ArticleSource>) -> Services {
    let store = Arc::new(RwLock::new(NewsStore::new()));

    Services {
        news: NewserviceServer::new(NewsServiceImpl::new(config.clone(), source, store)),
        products: ProductServiceServer::new(ProductServiceImpl::new(
            source::sample_catalog(),
            config.product_interval(),
        )),
    }
}
