//! Shared protobuf definitions for all services
//!
//! This crate provides generated gRPC code (clients and servers) for
//! `news.Newservice` and `product.ProductService`.
//!
//! - `reflection`: also embed the file descriptor set for gRPC reflection

/// News proto definitions
pub mod news {
    tonic::include_proto!("news");
}

/// Product proto definitions
pub mod product {
    tonic::include_proto!("product");
}

/// File descriptor set for gRPC reflection
#[cfg(feature = "reflection")]
pub const FILE_DESCRIPTOR_SET: &[u8] =
    include_bytes!(concat!(env!("OUT_DIR"), "/services_descriptor.bin"));
