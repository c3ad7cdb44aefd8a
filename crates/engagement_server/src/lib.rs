//! HTTP surface for the engagement counter service.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod store;

pub use config::{Cli, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use server::HttpServer;
pub use store::Store;
