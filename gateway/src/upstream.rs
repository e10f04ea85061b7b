//! gRPC upstream client
//!
//! Talks to `news.Newservice` and `product.ProductService` over a shared,
//! lazily connected tonic channel. Each call runs on its own task and
//! reports back through the [`Completion`] it was handed.

use error::RpcError;
use proto::news::newservice_client::NewserviceClient;
use proto::news::{News, NewsRequest};
use proto::product::product_service_client::ProductServiceClient;
use proto::product::{ProductRequest, ProductResponse};
use tonic::transport::{Channel, Endpoint};
use tonic::Streaming;

use crate::adapter::{Completion, Operation, UpstreamClient};
use crate::config::GatewayConfig;
use crate::model::{NewsItem, Product, ResponsePayload};

/// Upstream gRPC client
#[derive(Debug, Clone)]
pub struct GrpcUpstream {
    news: NewserviceClient<Channel>,
    products: ProductServiceClient<Channel>,
    max_stream_items: usize,
}

impl GrpcUpstream {
    /// Build a client whose channel connects on first use
    pub fn connect_lazy(config: &GatewayConfig) -> Result<Self, RpcError> {
        let channel = Endpoint::from_shared(config.upstream_addr.clone())?
            .connect_timeout(config.connect_timeout())
            .connect_lazy();

        tracing::info!("Upstream gRPC endpoint: {}", config.upstream_addr);
        Ok(Self::from_channel(channel, config.max_stream_items))
    }

    pub fn from_channel(channel: Channel, max_stream_items: usize) -> Self {
        Self {
            news: NewserviceClient::new(channel.clone()),
            products: ProductServiceClient::new(channel),
            max_stream_items,
        }
    }

    /// Run one operation to completion
    pub async fn execute(&self, operation: Operation) -> Result<ResponsePayload, RpcError> {
        let mut news = self.news.clone();
        let mut products = self.products.clone();

        let payload: ResponsePayload = match operation {
            Operation::NewsBulk => news.get_news_bulk(NewsRequest {}).await?.into_inner().into(),
            Operation::FreshNews => news.get_fresh_news(NewsRequest {}).await?.into_inner().into(),
            Operation::DbNews => news.get_db_news(NewsRequest {}).await?.into_inner().into(),
            Operation::Products => products.get_product(ProductRequest {}).await?.into_inner().into(),
            Operation::NewsStream => {
                let stream = self.news_stream().await?;
                let items = collect_stream(stream, self.max_stream_items).await?;
                ResponsePayload::news(items.into_iter().map(NewsItem::from).collect())
            }
            Operation::ProductStream => {
                let stream = self.product_stream().await?;
                let items = collect_stream(stream, self.max_stream_items).await?;
                ResponsePayload::products(items.into_iter().map(Product::from).collect())
            }
        };

        Ok(payload)
    }

    /// Open the server-streaming news call
    pub async fn news_stream(&self) -> Result<Streaming<News>, RpcError> {
        let mut client = self.news.clone();
        Ok(client.get_news_stream(NewsRequest {}).await?.into_inner())
    }

    /// Open the server-streaming product call (runs until dropped)
    pub async fn product_stream(&self) -> Result<Streaming<ProductResponse>, RpcError> {
        let mut client = self.products.clone();
        Ok(client.get_product_stream(ProductRequest {}).await?.into_inner())
    }

    /// Push articles upstream over the client-streaming call.
    ///
    /// Returns how many the service reports receiving.
    pub async fn publish_news(&self, items: Vec<NewsItem>) -> Result<i32, RpcError> {
        let mut client = self.news.clone();
        let outbound = tokio_stream::iter(items.into_iter().map(News::from));
        let summary = client.publish_news(outbound).await?.into_inner();
        Ok(summary.received)
    }
}

impl UpstreamClient for GrpcUpstream {
    fn invoke(&self, operation: Operation, completion: Completion) {
        let upstream = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                outcome = upstream.execute(operation) => {
                    match outcome {
                        Ok(payload) => completion.succeed(payload),
                        Err(e) => completion.fail(e),
                    };
                }
                _ = completion.closed() => {
                    tracing::info!("Caller stopped waiting; cancelled {}", operation.method_path());
                }
            }
        });
    }
}

/// Drain a server stream, stopping after `limit` messages
async fn collect_stream<T>(mut stream: Streaming<T>, limit: usize) -> Result<Vec<T>, RpcError> {
    let mut items = Vec::new();
    while items.len() < limit {
        match stream.message().await? {
            Some(item) => items.push(item),
            None => break,
        }
    }
    Ok(items)
}
