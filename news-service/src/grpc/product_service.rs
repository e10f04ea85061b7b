//! `product.ProductService` implementation

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio_stream::Stream;
use tonic::{Request, Response, Status};

use proto::product::product_service_server::ProductService;
use proto::product::{ProductList, ProductRequest, ProductResponse};

type ProductStream = Pin<Box<dyn Stream<Item = Result<ProductResponse, Status>> + Send>>;

/// Product gRPC service implementation
pub struct ProductServiceImpl {
    catalog: Arc<Vec<ProductResponse>>,
    interval: Duration,
}

impl ProductServiceImpl {
    pub fn new(catalog: Vec<ProductResponse>, interval: Duration) -> Self {
        Self {
            catalog: Arc::new(catalog),
            interval,
        }
    }
}

#[tonic::async_trait]
impl ProductService for ProductServiceImpl {
    type GetProductStreamStream = ProductStream;

    async fn get_product(
        &self,
        _request: Request<ProductRequest>,
    ) -> Result<Response<ProductList>, Status> {
        tracing::info!("Intercepted unary call: /product.ProductService/GetProduct");

        Ok(Response::new(ProductList {
            products: self.catalog.as_ref().clone(),
        }))
    }

    async fn get_product_stream(
        &self,
        _request: Request<ProductRequest>,
    ) -> Result<Response<Self::GetProductStreamStream>, Status> {
        tracing::info!("Intercepted stream call: /product.ProductService/GetProductStream");

        if self.catalog.is_empty() {
            tracing::error!("GetProductStream failed: product catalog is empty");
            return Err(Status::not_found("product catalog is empty"));
        }

        let catalog = Arc::clone(&self.catalog);
        let interval = self.interval;

        // Repeats the catalog until the client hangs up and the stream is dropped
        let stream = async_stream::stream! {
            loop {
                for product in catalog.iter() {
                    yield Ok::<_, Status>(product.clone());
                    tokio::time::sleep(interval).await;
                }
            }
        };

        Ok(Response::new(Box::pin(stream) as Self::GetProductStreamStream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::sample_catalog;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_get_product_returns_catalog() {
        let svc = ProductServiceImpl::new(sample_catalog(), Duration::ZERO);
        let list = svc
            .get_product(Request::new(ProductRequest {}))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(list.products, sample_catalog());
    }

    #[tokio::test]
    async fn test_stream_repeats_catalog() {
        let svc = ProductServiceImpl::new(sample_catalog(), Duration::ZERO);
        let stream = svc
            .get_product_stream(Request::new(ProductRequest {}))
            .await
            .unwrap()
            .into_inner();

        let ids: Vec<i32> = stream
            .take(5)
            .map(|item| item.unwrap().id)
            .collect()
            .await;
        assert_eq!(ids, vec![1, 2, 3, 1, 2]);
    }

    #[tokio::test]
    async fn test_empty_catalog_stream() {
        let svc = ProductServiceImpl::new(vec![], Duration::ZERO);
        let result = svc.get_product_stream(Request::new(ProductRequest {})).await;
        assert_eq!(result.err().map(|s| s.code()), Some(tonic::Code::NotFound));
    }
}
