//! Article and product sources
//!
//! The services pull articles from an [`ArticleSource`]:
//! [`NewsApiSource`] asks newsapi.org for top headlines,
//! [`StaticSource`] serves a fixed feed.

use async_trait::async_trait;
use proto::news::{News, Source};
use proto::product::ProductResponse;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ServiceConfig;

/// Source errors
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("news feed unavailable: {0}")]
    Unavailable(String),

    #[error("news request failed: {0}")]
    Request(String),

    #[error("news API error: {0}")]
    Api(String),
}

/// Which headlines to ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locale {
    /// ISO 3166 country code, e.g. `us`
    Country(String),
    /// ISO 639-1 language code, e.g. `en`
    Language(String),
}

impl Locale {
    fn query_pair(&self) -> (&'static str, &str) {
        match self {
            Locale::Country(code) => ("country", code),
            Locale::Language(code) => ("language", code),
        }
    }
}

/// Something that can fetch articles
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch the current articles for a country or language
    async fn fetch(&self, locale: &Locale) -> Result<Vec<News>, SourceError>;
}

/// Top headlines from a newsapi.org compatible endpoint
pub struct NewsApiSource {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl NewsApiSource {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// `None` when no API key is configured
    pub fn from_config(config: &ServiceConfig) -> Option<Self> {
        let key = config.news_api_key.as_deref()?;
        Some(Self::new(config.news_api_url.clone(), key))
    }

    fn headlines_url(&self) -> String {
        format!("{}/v2/top-headlines", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ArticleSource for NewsApiSource {
    async fn fetch(&self, locale: &Locale) -> Result<Vec<News>, SourceError> {
        let (param, code) = locale.query_pair();
        tracing::debug!("Fetching top headlines for {}={}", param, code);

        let response = self
            .client
            .get(self.headlines_url())
            .query(&[("sortBy", "newest"), (param, code)])
            .header("X-Api-Key", &self.api_key)
            .header("User-Agent", format!("news-service/{}", env!("CARGO_PKG_VERSION")))
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // newsapi reports failures as {"status":"error","message":..}
            let message = match response.json::<Headlines>().await {
                Ok(Headlines { message: Some(message), .. }) => message,
                _ => format!("server returned status: {}", status),
            };
            return Err(SourceError::Api(message));
        }

        let headlines: Headlines = response
            .json()
            .await
            .map_err(|e| SourceError::Request(format!("failed to parse headlines: {}", e)))?;

        headlines.into_news()
    }
}

/// `/v2/top-headlines` response body
#[derive(Debug, Deserialize)]
struct Headlines {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

impl Headlines {
    fn into_news(self) -> Result<Vec<News>, SourceError> {
        if self.status != "ok" {
            return Err(SourceError::Api(
                self.message.unwrap_or_else(|| format!("status {}", self.status)),
            ));
        }
        Ok(self.articles.into_iter().map(News::from).collect())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiSource {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    #[serde(default)]
    source: ApiSource,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

impl From<ApiArticle> for News {
    fn from(article: ApiArticle) -> Self {
        News {
            source: Some(Source {
                id: article.source.id.unwrap_or_default(),
                name: article.source.name.unwrap_or_default(),
            }),
            author: article.author.unwrap_or_default(),
            title: article.title.unwrap_or_default(),
            description: article.description.unwrap_or_default(),
            url: article.url.unwrap_or_default(),
            published_at: article.published_at.unwrap_or_default(),
        }
    }
}

/// Source serving a fixed list of articles, or a fixed error
#[derive(Debug, Clone)]
pub struct StaticSource {
    articles: Result<Vec<News>, SourceError>,
}

impl StaticSource {
    pub fn new(articles: Vec<News>) -> Self {
        Self {
            articles: Ok(articles),
        }
    }

    /// Source that fails every fetch
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            articles: Err(SourceError::Unavailable(message.into())),
        }
    }

    /// Built-in sample feed
    pub fn sample() -> Self {
        Self::new(sample_articles())
    }
}

#[async_trait]
impl ArticleSource for StaticSource {
    async fn fetch(&self, locale: &Locale) -> Result<Vec<News>, SourceError> {
        tracing::debug!("Fetching articles for {:?}", locale);
        self.articles.clone()
    }
}

/// Build an article the way the feed reports it
pub fn article(source_id: &str, source_name: &str, author: &str, title: &str, published_at: &str) -> News {
    News {
        source: Some(Source {
            id: source_id.to_string(),
            name: source_name.to_string(),
        }),
        author: author.to_string(),
        title: title.to_string(),
        description: format!("{} ({})", title, source_name),
        url: String::new(),
        published_at: published_at.to_string(),
    }
}

fn sample_articles() -> Vec<News> {
    vec![
        article("bbc-news", "BBC News", "BBC", "Markets steady ahead of rate decision", "2024-01-01T08:00:00Z"),
        article("reuters", "Reuters", "Reuters Staff", "New rail link opens to passengers", "2024-01-01T09:30:00Z"),
        article("the-verge", "The Verge", "Jane Doe", "Hands-on with this year's e-readers", "2024-01-01T11:15:00Z"),
    ]
}

/// Built-in product catalog
pub fn sample_catalog() -> Vec<ProductResponse> {
    vec![
        ProductResponse {
            id: 1,
            title: "Backpack".to_string(),
            price: 109.95,
            description: "Fits 15 inch laptops".to_string(),
            category: "men's clothing".to_string(),
            image: "https://example.com/img/1.jpg".to_string(),
        },
        ProductResponse {
            id: 2,
            title: "Slim Fit T-Shirt".to_string(),
            price: 22.3,
            description: "Slim-fitting style, contrast raglan long sleeve".to_string(),
            category: "men's clothing".to_string(),
            image: "https://example.com/img/2.jpg".to_string(),
        },
        ProductResponse {
            id: 3,
            title: "Cotton Jacket".to_string(),
            price: 55.99,
            description: "Great outerwear jacket for spring and autumn".to_string(),
            category: "men's clothing".to_string(),
            image: "https://example.com/img/3.jpg".to_string(),
        },
    ]
}
