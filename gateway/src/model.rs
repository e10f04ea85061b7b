//! Response payloads served over HTTP
//!
//! These mirror the upstream protobuf messages but serialize with the
//! field names the browser client expects (`publishedAt`, `news`, `products`).

use serde::{Deserialize, Serialize};

use proto::news::{BulkNews, News, Source};
use proto::product::{ProductList, ProductResponse};

/// Origin of a news item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsSource {
    pub id: String,
    pub name: String,
}

/// A single news article
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub source: NewsSource,
    pub author: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    pub published_at: String,
}

/// A catalog product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub image: String,
}

/// Result of one adapter operation
///
/// Serializes to `{"news": [...]}` or `{"products": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    News { news: Vec<NewsItem> },
    Products { products: Vec<Product> },
}

impl ResponsePayload {
    pub fn news(news: Vec<NewsItem>) -> Self {
        Self::News { news }
    }

    pub fn products(products: Vec<Product>) -> Self {
        Self::Products { products }
    }

    /// Number of items carried, whatever the kind
    pub fn len(&self) -> usize {
        match self {
            Self::News { news } => news.len(),
            Self::Products { products } => products.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Source> for NewsSource {
    fn from(source: Source) -> Self {
        Self {
            id: source.id,
            name: source.name,
        }
    }
}

impl From<News> for NewsItem {
    fn from(news: News) -> Self {
        Self {
            source: news.source.map(NewsSource::from).unwrap_or_default(),
            author: news.author,
            title: news.title,
            description: news.description,
            url: news.url,
            published_at: news.published_at,
        }
    }
}

impl From<NewsItem> for News {
    fn from(item: NewsItem) -> Self {
        Self {
            source: Some(Source {
                id: item.source.id,
                name: item.source.name,
            }),
            author: item.author,
            title: item.title,
            description: item.description,
            url: item.url,
            published_at: item.published_at,
        }
    }
}

impl From<BulkNews> for ResponsePayload {
    fn from(bulk: BulkNews) -> Self {
        Self::news(bulk.news.into_iter().map(NewsItem::from).collect())
    }
}

impl From<ProductResponse> for Product {
    fn from(product: ProductResponse) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            description: product.description,
            category: product.category,
            image: product.image,
        }
    }
}

impl From<ProductList> for ResponsePayload {
    fn from(list: ProductList) -> Self {
        Self::products(list.products.into_iter().map(Product::from).collect())
    }
}
