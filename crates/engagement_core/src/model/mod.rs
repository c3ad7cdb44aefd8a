//! Domain model for post engagement.
//!
//! # Responsibility
//! - Define value types shared by the gateway, engine and query layers.
//! - Map engagement kinds onto their storage collections.
//!
//! # Invariants
//! - Model values are plain data; they never hold a live storage handle.

pub mod engagement;
pub mod post;
