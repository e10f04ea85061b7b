use std::sync::Arc;

use tonic::transport::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use news_service::{build_services, ArticleSource, NewsApiSource, ServiceConfig, StaticSource};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "news_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = ServiceConfig::from_env();
    tracing::info!("Starting News Service v{}", config.version);
    tracing::info!("gRPC server listening on {}", config.grpc_addr);

    let source: Arc<dyn ArticleSource> = match NewsApiSource::from_config(&config) {
        Some(source) => {
            tracing::info!("Fetching headlines from {}", config.news_api_url);
            Arc::new(source)
        }
        None => {
            tracing::info!("NEWS_API_KEY not set, serving the sample feed");
            Arc::new(StaticSource::sample())
        }
    };

    let services = build_services(&config, source);

    // Parse address
    let addr = config.grpc_addr.parse()?;

    // Create reflection service
    let reflection_service = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(proto::FILE_DESCRIPTOR_SET)
        .build_v1()?;

    Server::builder()
        .add_service(reflection_service)
        .add_service(services.news)
        .add_service(services.products)
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
