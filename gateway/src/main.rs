//! Gateway main entry point
//!
//! Serves the upstream news and product RPCs over plain HTTP for browser
//! clients, or acts as a console gRPC client for quick checks.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use news_gateway::{
    app, CorsPolicy, GatewayConfig, GatewayState, GrpcUpstream, NewsItem, NewsSource, Operation,
    ResponsePayload, RouteTable, RpcAdapter,
};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "news_gateway=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run_server(config: GatewayConfig) -> anyhow::Result<()> {
    tracing::info!("Starting News Gateway v{}", config.version);

    let upstream = GrpcUpstream::connect_lazy(&config)?;
    let adapter = RpcAdapter::new(Arc::new(upstream)).with_deadline(config.upstream_timeout());

    let cors = config.cors_policy();
    match &cors {
        CorsPolicy::AllowAny => tracing::info!("CORS: allowing any origin"),
        CorsPolicy::AllowList(origins) => tracing::info!("CORS: allowing {:?}", origins),
    }

    let routes = RouteTable::with_defaults();
    for route in routes.routes() {
        tracing::info!("Route {} {} -> {}", route.method, route.path, route.operation.method_path());
    }

    let state = Arc::new(GatewayState::new(routes, adapter, cors));

    let listener = tokio::net::TcpListener::bind(&config.http_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.http_addr))?;
    tracing::info!("HTTP server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

/// Invoke one operation and print every item
async fn run_fetch(config: GatewayConfig, operation: Operation) -> anyhow::Result<()> {
    let upstream = GrpcUpstream::connect_lazy(&config)?;
    let adapter = RpcAdapter::new(Arc::new(upstream)).with_deadline(config.upstream_timeout());

    let payload = adapter.call(operation).await?;
    println!("Response from the server:");
    match payload {
        ResponsePayload::News { news } => news.iter().for_each(print_news),
        ResponsePayload::Products { products } => {
            for product in products {
                println!("id: {}, title: {}", product.id, product.title);
            }
        }
    }

    Ok(())
}

/// Consume a server stream item by item
async fn run_stream(config: GatewayConfig, kind: &str, limit: Option<usize>) -> anyhow::Result<()> {
    let upstream = GrpcUpstream::connect_lazy(&config)?;
    let limit = limit.unwrap_or(usize::MAX);
    let mut received = 0;

    match kind {
        "news" => {
            let mut stream = upstream.news_stream().await?;
            while received < limit {
                let Some(news) = stream.message().await? else { break };
                print_news(&NewsItem::from(news));
                received += 1;
            }
        }
        "products" => {
            let mut stream = upstream.product_stream().await?;
            while received < limit {
                let Some(product) = stream.message().await? else { break };
                println!("id: {}, title: {}", product.id, product.title);
                received += 1;
            }
        }
        other => return Err(anyhow!("unknown stream '{}', expected 'news' or 'products'", other)),
    }

    // Dropping the stream tells the server we are done
    tracing::info!("Received {} stream messages", received);
    Ok(())
}

/// Push a few articles through the client-streaming RPC
async fn run_upload(config: GatewayConfig) -> anyhow::Result<()> {
    let upstream = GrpcUpstream::connect_lazy(&config)?;
    let items = sample_upload();
    let sent = items.len();

    let received = upstream.publish_news(items).await?;
    println!("Sent {} articles, server received {}", sent, received);
    Ok(())
}

fn print_news(news: &NewsItem) {
    println!("Source ID: {}, Source Name: {}", news.source.id, news.source.name);
    println!(
        "Author: {}, Title: {}, Description: {}, Published At: {}",
        news.author, news.title, news.description, news.published_at
    );
}

fn sample_upload() -> Vec<NewsItem> {
    (1..=3)
        .map(|i| NewsItem {
            source: NewsSource {
                id: "console".to_string(),
                name: "Console Upload".to_string(),
            },
            author: "news-gateway".to_string(),
            title: format!("Uploaded article {}", i),
            description: format!("Article {} sent over a client stream", i),
            url: String::new(),
            published_at: "2024-01-01T00:00:00Z".to_string(),
        })
        .collect()
}

fn print_help() {
    println!("News Gateway - HTTP gateway for the news and product gRPC services");
    println!();
    println!("Usage:");
    println!("  news-gateway                     Run the HTTP gateway");
    println!("  news-gateway run                 Run the HTTP gateway");
    println!("  news-gateway fetch <operation>   Call one operation and print the result");
    println!("  news-gateway stream <news|products> [--limit N]");
    println!("                                   Print a server stream as it arrives");
    println!("  news-gateway upload              Send sample articles over a client stream");
    println!();
    println!("Operations:");
    for op in Operation::ALL {
        let kind = if op.is_streaming() { " (server stream)" } else { "" };
        println!("  {:<16} {}{}", op.name(), op.method_path(), kind);
    }
    println!();
    println!("Environment Variables:");
    println!("  GATEWAY_HTTP_ADDR              HTTP listen address (default: 0.0.0.0:8000)");
    println!("  GATEWAY_UPSTREAM_ADDR          Upstream gRPC endpoint (default: http://[::1]:50051)");
    println!("  GATEWAY_UPSTREAM_TIMEOUT_SECS  Upstream call deadline, 0 disables (default: 30)");
    println!("  GATEWAY_CONNECT_TIMEOUT_SECS   Upstream connect timeout (default: 5)");
    println!("  GATEWAY_MAX_STREAM_ITEMS       Items collected from stream routes (default: 100)");
    println!("  GATEWAY_CORS_ORIGINS           Comma separated origins, '*' for any (default: *)");
}

/// Parse `--limit N` from the remaining arguments
fn parse_limit(args: &[String]) -> anyhow::Result<Option<usize>> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--limit" {
            let value = args
                .get(i + 1)
                .ok_or_else(|| anyhow!("--limit requires a value"))?;
            return Ok(Some(value.parse().context("--limit must be a number")?));
        }
        i += 1;
    }
    Ok(None)
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if matches!(args.get(1).map(String::as_str), Some("--help" | "-h")) {
        print_help();
        return Ok(());
    }

    init_tracing();
    let config = GatewayConfig::from_env();
    let runtime = tokio::runtime::Runtime::new()?;

    match args.get(1).map(String::as_str) {
        None | Some("run") => runtime.block_on(run_server(config)),
        Some("fetch") => {
            let operation: Operation = args
                .get(2)
                .ok_or_else(|| anyhow!("fetch requires an operation, see --help"))?
                .parse()
                .map_err(|e: String| anyhow!(e))?;
            runtime.block_on(run_fetch(config, operation))
        }
        Some("stream") => {
            let kind = args.get(2).map(String::as_str).unwrap_or("news");
            let limit = parse_limit(&args[2..])?;
            runtime.block_on(run_stream(config, kind, limit))
        }
        Some("upload") => runtime.block_on(run_upload(config)),
        Some(other) => {
            print_help();
            Err(anyhow!("unknown command '{}'", other))
        }
    }
}
