//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into engagement use-case APIs.
//! - Own the transaction boundary: one transaction per mutating call.
//! - Keep HTTP/runtime layers decoupled from storage details.

pub mod counter_service;
pub mod error;
pub mod query_service;
