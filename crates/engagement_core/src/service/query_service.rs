//! Read-side engagement queries.
//!
//! # Responsibility
//! - Answer stats, engaged-state and comment listing reads.
//!
//! # Invariants
//! - Reads never create rows; unknown posts yield zero stats and empty lists.
//! - Comment listing order is `created_at ASC`, ties by insertion order.

use crate::model::engagement::EngagementKind;
use crate::model::post::{CommentRecord, PostStats};
use crate::repo::engagement_repo::EngagementRepository;
use crate::service::error::ServiceResult;

/// Query service facade over repository implementations.
pub struct QueryService<R: EngagementRepository> {
    repo: R,
}

impl<R: EngagementRepository> QueryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns current counters, all-zero for unknown posts.
    pub fn get_stats(&self, post_id: &str) -> ServiceResult<PostStats> {
        Ok(self.repo.get_post(post_id)?.unwrap_or_default())
    }

    pub fn is_liked(&self, post_id: &str, user_id: &str) -> ServiceResult<bool> {
        self.is_engaged(EngagementKind::Like, post_id, user_id)
    }

    pub fn is_retweeted(&self, post_id: &str, user_id: &str) -> ServiceResult<bool> {
        self.is_engaged(EngagementKind::Retweet, post_id, user_id)
    }

    /// Existence check on the detail collection for `(post_id, user_id)`.
    pub fn is_engaged(
        &self,
        kind: EngagementKind,
        post_id: &str,
        user_id: &str,
    ) -> ServiceResult<bool> {
        Ok(self.repo.find_detail(kind, post_id, user_id)?.is_some())
    }

    /// Lists comment bodies for one post in creation order.
    pub fn list_comments(&self, post_id: &str) -> ServiceResult<Vec<String>> {
        Ok(self
            .list_comment_records(post_id)?
            .into_iter()
            .map(|comment| comment.text)
            .collect())
    }

    /// Lists full comment records for one post in creation order.
    pub fn list_comment_records(&self, post_id: &str) -> ServiceResult<Vec<CommentRecord>> {
        Ok(self.repo.list_comments(post_id)?)
    }
}
