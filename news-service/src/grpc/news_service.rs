//! `news.Newservice` implementation

use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_stream::Stream;
use tonic::{Request, Response, Status, Streaming};

use proto::news::newservice_server::Newservice;
use proto::news::{BulkNews, News, NewsRequest, PublishSummary};

use crate::config::ServiceConfig;
use crate::source::{ArticleSource, Locale};
use crate::store::NewsStore;

type NewsStream = Pin<Box<dyn Stream<Item = Result<News, Status>> + Send>>;

/// News gRPC service implementation
pub struct NewsServiceImpl {
    config: ServiceConfig,
    source: Arc<dyn ArticleSource>,
    store: Arc<RwLock<NewsStore>>,
}

impl NewsServiceImpl {
    pub fn new(
        config: ServiceConfig,
        source: Arc<dyn ArticleSource>,
        store: Arc<RwLock<NewsStore>>,
    ) -> Self {
        Self {
            config,
            source,
            store,
        }
    }

    async fn fetch(&self, method: &str, locale: &Locale) -> Result<Vec<News>, Status> {
        self.source.fetch(locale).await.map_err(|e| {
            tracing::error!("{} failed: {}", method, e);
            Status::internal(format!("{} failed, {}", method, e))
        })
    }

    /// Fetch, save into the store and return the fetched articles
    async fn fetch_and_save(&self, method: &str) -> Result<Response<BulkNews>, Status> {
        tracing::info!("Intercepted unary call: /news.Newservice/{}", method);

        let news = self.fetch(method, &self.config.bulk_locale()).await?;
        let added = self.store.write().await.save(news.clone());
        tracing::debug!("{}: fetched {} articles, {} new", method, news.len(), added);

        Ok(Response::new(BulkNews { news }))
    }
}

#[tonic::async_trait]
impl Newservice for NewsServiceImpl {
    type GetNewsStreamStream = NewsStream;

    async fn get_news_stream(
        &self,
        _request: Request<NewsRequest>,
    ) -> Result<Response<Self::GetNewsStreamStream>, Status> {
        tracing::info!("Intercepted stream call: /news.Newservice/GetNewsStream");

        let news = self
            .fetch("GetNewsStream", &self.config.stream_locale())
            .await?;
        let stream = tokio_stream::iter(news.into_iter().map(Ok::<_, Status>));

        Ok(Response::new(Box::pin(stream) as Self::GetNewsStreamStream))
    }

    async fn get_news_bulk(
        &self,
        _request: Request<NewsRequest>,
    ) -> Result<Response<BulkNews>, Status> {
        self.fetch_and_save("GetNewsBulk").await
    }

    async fn get_fresh_news(
        &self,
        _request: Request<NewsRequest>,
    ) -> Result<Response<BulkNews>, Status> {
        self.fetch_and_save("GetFreshNews").await
    }

    async fn get_db_news(
        &self,
        _request: Request<NewsRequest>,
    ) -> Result<Response<BulkNews>, Status> {
        tracing::info!("Intercepted unary call: /news.Newservice/GetDBNews");

        let news = self.store.read().await.all();
        Ok(Response::new(BulkNews { news }))
    }

    async fn publish_news(
        &self,
        request: Request<Streaming<News>>,
    ) -> Result<Response<PublishSummary>, Status> {
        tracing::info!("Intercepted stream call: /news.Newservice/PublishNews");

        let mut inbound = request.into_inner();
        let mut received = 0;

        while let Some(news) = inbound.message().await.map_err(|status| {
            tracing::error!("PublishNews failed after {} articles: {}", received, status);
            status
        })? {
            self.store.write().await.save(std::iter::once(news));
            received += 1;
        }

        tracing::info!("PublishNews received {} articles", received);
        Ok(Response::new(PublishSummary { received }))
    }
}
