//! Counter engine: toggle and additive engagement mutations.
//!
//! # Responsibility
//! - Implement toggle-or-create (like/retweet) and increment-or-create
//!   (comment/share) semantics.
//! - Keep post counters in lockstep with detail rows
//!   (`like_count == COUNT(likes)`, `comment_count == COUNT(comments)`).
//!
//! # Invariants
//! - Every public call runs in exactly one `BEGIN IMMEDIATE` transaction and
//!   commits all writes or none.
//! - Unknown posts are materialized as zero-state rows, never rejected.
//! - A UNIQUE conflict on a detail insert means a concurrent writer already
//!   created the row; it is reconciled from the row count, not surfaced.

use crate::model::engagement::{Counter, EngagementKind, ToggleOutcome};
use crate::model::post::CommentId;
use crate::repo::engagement_repo::{
    EngagementRepository, RepoError, RepoResult, SqliteEngagementRepository,
};
use crate::service::error::{ServiceError, ServiceResult};
use log::{error, info, warn};
use rusqlite::{Connection, TransactionBehavior};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Counter engine bound to one injected storage handle.
pub struct CounterService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> CounterService<'conn> {
    /// Creates an engine over a migrated connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Flips the caller's like/retweet state on one post.
    ///
    /// Removes the detail row and decrements when present, inserts and
    /// increments when absent. Calling twice restores the original state.
    pub fn toggle_engagement(
        &mut self,
        kind: EngagementKind,
        post_id: &str,
        user_id: &str,
    ) -> ServiceResult<ToggleOutcome> {
        let started_at = Instant::now();
        let result = self.in_transaction(|repo| toggle_in(repo, kind, post_id, user_id));
        match &result {
            Ok(outcome) => info!(
                "event=toggle_engagement module=service status=ok kind={} outcome={} post_id={} duration_ms={}",
                kind,
                outcome.as_str(),
                post_id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=toggle_engagement module=service status=error kind={} post_id={} error_code={} error={}",
                kind,
                post_id,
                err.code(),
                err
            ),
        }
        result
    }

    /// Appends one comment and bumps `comment_count`.
    ///
    /// No deduplication or length limit is applied.
    pub fn add_comment(&mut self, post_id: &str, text: &str) -> ServiceResult<CommentId> {
        let started_at = Instant::now();
        let created_at = now_epoch_ms();
        let result = self.in_transaction(|repo| {
            repo.ensure_post(post_id)?;
            let comment_id = repo.insert_comment(post_id, text, created_at)?;
            repo.adjust_counter(Counter::Comment, post_id, 1)?;
            Ok(comment_id)
        });
        match &result {
            Ok(comment_id) => info!(
                "event=add_comment module=service status=ok post_id={} comment_id={} text_len={} duration_ms={}",
                post_id,
                comment_id,
                text.chars().count(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=add_comment module=service status=error post_id={} error_code={} error={}",
                post_id,
                err.code(),
                err
            ),
        }
        result
    }

    /// Counts one share. Every call counts; shares carry no identity.
    pub fn record_share(&mut self, post_id: &str) -> ServiceResult<()> {
        let started_at = Instant::now();
        let result = self.in_transaction(|repo| {
            repo.ensure_post(post_id)?;
            repo.adjust_counter(Counter::Share, post_id, 1)
        });
        match &result {
            Ok(()) => info!(
                "event=record_share module=service status=ok post_id={} duration_ms={}",
                post_id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=record_share module=service status=error post_id={} error_code={} error={}",
                post_id,
                err.code(),
                err
            ),
        }
        result
    }

    /// Runs `body` in an immediate transaction.
    ///
    /// The write lock is taken at `BEGIN`, so two engines racing on the same
    /// post serialize in the store instead of both reading "absent". Any
    /// error (or a panic unwinding through here) drops the transaction,
    /// which rolls it back.
    fn in_transaction<T>(
        &mut self,
        body: impl FnOnce(&SqliteEngagementRepository<'_>) -> RepoResult<T>,
    ) -> ServiceResult<T> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = {
            let repo = SqliteEngagementRepository::try_new(&tx)?;
            body(&repo)?
        };
        tx.commit().map_err(ServiceError::from)?;
        Ok(value)
    }
}

/// Storage-agnostic toggle algorithm. Caller owns the transaction.
pub fn toggle_in<R: EngagementRepository>(
    repo: &R,
    kind: EngagementKind,
    post_id: &str,
    user_id: &str,
) -> RepoResult<ToggleOutcome> {
    repo.ensure_post(post_id)?;

    if let Some(row_id) = repo.find_detail(kind, post_id, user_id)? {
        if repo.delete_detail(kind, row_id)? {
            repo.adjust_counter(kind.counter(), post_id, -1)?;
        } else {
            // Row vanished between lookup and delete; trust the row count.
            repo.recount_detail(kind, post_id)?;
        }
        return Ok(ToggleOutcome::Removed);
    }

    match repo.insert_detail(kind, post_id, user_id) {
        Ok(_) => {
            repo.adjust_counter(kind.counter(), post_id, 1)?;
            Ok(ToggleOutcome::Added)
        }
        Err(RepoError::ConstraintViolation(details)) => {
            let count = repo.recount_detail(kind, post_id)?;
            warn!(
                "event=toggle_reconciled module=service status=ok kind={} post_id={} count={} details={}",
                kind, post_id, count, details
            );
            Ok(ToggleOutcome::Added)
        }
        Err(err) => Err(err),
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
