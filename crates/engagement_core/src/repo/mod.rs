//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the point-lookup/insert/delete/upsert contract over the four
//!   engagement collections (posts, likes, retweets, comments).
//! - Isolate SQLite query details from engine/query orchestration.
//!
//! # Invariants
//! - Repository calls never open or commit transactions; the caller owns the
//!   transaction boundary and passes it in as the connection.
//! - `NotFound` is expressed as `Option::None`, never as an error.

pub mod engagement_repo;
