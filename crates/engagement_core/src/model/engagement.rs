//! Toggle-style engagement kinds.
//!
//! # Invariants
//! - Each kind owns exactly one detail table and one counter column.
//! - At most one detail row exists per `(post_id, user_id)` pair and kind.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Engagement types with present/absent toggle semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    Like,
    Retweet,
}

impl EngagementKind {
    pub const ALL: [EngagementKind; 2] = [EngagementKind::Like, EngagementKind::Retweet];

    /// Detail table holding one row per engaged `(post_id, user_id)`.
    pub fn detail_table(self) -> &'static str {
        match self {
            Self::Like => "likes",
            Self::Retweet => "retweets",
        }
    }

    /// Counter column on `posts` mirroring the detail row count.
    pub fn counter(self) -> Counter {
        match self {
            Self::Like => Counter::Like,
            Self::Retweet => Counter::Retweet,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Retweet => "retweet",
        }
    }
}

impl Display for EngagementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counter columns on the `posts` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    Like,
    Retweet,
    Comment,
    Share,
}

impl Counter {
    pub fn column(self) -> &'static str {
        match self {
            Self::Like => "like_count",
            Self::Retweet => "retweet_count",
            Self::Comment => "comment_count",
            Self::Share => "share_count",
        }
    }
}

/// What a toggle call did to the caller's engagement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A detail row now exists for the pair.
    Added,
    /// The detail row for the pair was removed.
    Removed,
}

impl ToggleOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }
}
