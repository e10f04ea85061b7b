//! gRPC module
//!
//! Service implementations for the generated `news` and `product` servers.

pub mod news_service;
pub mod product_service;

pub use news_service::NewsServiceImpl;
pub use product_service::ProductServiceImpl;
