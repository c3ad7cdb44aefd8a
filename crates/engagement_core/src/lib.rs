//! Core domain logic for the engagement counter service.
//! This crate is the single source of truth for counter invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::engagement::{Counter, EngagementKind, ToggleOutcome};
pub use model::post::{CommentId, CommentRecord, PostId, PostStats, UserId};
pub use repo::engagement_repo::{
    EngagementRepository, RepoError, RepoResult, SqliteEngagementRepository,
};
pub use service::counter_service::CounterService;
pub use service::error::{ServiceError, ServiceResult};
pub use service::query_service::QueryService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
