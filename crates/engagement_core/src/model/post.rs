//! Post counters and comment read models.

use serde::{Deserialize, Serialize};

/// Externally assigned post identifier. Opaque and never validated.
pub type PostId = String;

/// Externally assigned user identifier. Opaque and never validated.
pub type UserId = String;

/// Generated row id of one comment.
pub type CommentId = i64;

/// Denormalized counters stored on one post row.
///
/// `Default` is the zero-state returned for posts that were never engaged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStats {
    pub like_count: i64,
    pub retweet_count: i64,
    pub comment_count: i64,
    pub share_count: i64,
}

impl PostStats {
    /// Returns whether every counter is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// One persisted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: CommentId,
    pub post_id: PostId,
    pub text: String,
    /// Epoch milliseconds at insert time. Used only for ordering.
    pub created_at: i64,
}
