//! Engagement repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide point lookups by post key and by `(post_id, user_id)` composite key.
//! - Provide storage-native atomic counter updates on the `posts` hotspot row.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Counter updates are single `UPDATE ... SET c = c + ?` statements, never
//!   read-then-write from Rust.
//! - Decrements floor at zero; the schema also rejects negatives via CHECK.
//! - A UNIQUE conflict on a detail insert surfaces as
//!   `RepoError::ConstraintViolation` so the engine can reconcile it.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::engagement::{Counter, EngagementKind};
use crate::model::post::{CommentId, CommentRecord, PostStats};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const REQUIRED_TABLES: [&str; 4] = ["posts", "likes", "retweets", "comments"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from engagement persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Detail row for a composite key already exists.
    ConstraintViolation(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl RepoError {
    /// Returns whether the store could not serve the call at all.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Db(err) => err.is_unavailable(),
            Self::UninitializedConnection { .. } | Self::MissingRequiredTable(_) => true,
            Self::ConstraintViolation(_) | Self::InvalidData(_) => false,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::ConstraintViolation(details) => write!(f, "constraint violation: {details}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "engagement repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "engagement repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid engagement data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::ConstraintViolation(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage gateway over posts, likes, retweets and comments.
pub trait EngagementRepository {
    /// Loads counters for one post, `None` when the post was never engaged.
    fn get_post(&self, post_id: &str) -> RepoResult<Option<PostStats>>;
    /// Creates a zero-state post row when absent. Returns `true` when created.
    fn ensure_post(&self, post_id: &str) -> RepoResult<bool>;
    /// Composite-key lookup of one detail row id.
    fn find_detail(
        &self,
        kind: EngagementKind,
        post_id: &str,
        user_id: &str,
    ) -> RepoResult<Option<i64>>;
    /// Inserts one detail row and returns its surrogate id.
    fn insert_detail(&self, kind: EngagementKind, post_id: &str, user_id: &str)
        -> RepoResult<i64>;
    /// Deletes one detail row by surrogate id. Returns `true` when a row was removed.
    fn delete_detail(&self, kind: EngagementKind, row_id: i64) -> RepoResult<bool>;
    /// Atomically adds `delta` to one counter, flooring at zero.
    fn adjust_counter(&self, counter: Counter, post_id: &str, delta: i64) -> RepoResult<()>;
    /// Re-derives one toggle counter from its detail row count and returns it.
    fn recount_detail(&self, kind: EngagementKind, post_id: &str) -> RepoResult<i64>;
    /// Appends one comment and returns its generated id.
    ///
    /// The stored `created_at` never precedes the newest comment already on
    /// the post, so a clock step backwards cannot reorder a listing.
    fn insert_comment(&self, post_id: &str, text: &str, created_at: i64)
        -> RepoResult<CommentId>;
    /// Lists comments for one post, `created_at ASC, id ASC`.
    fn list_comments(&self, post_id: &str) -> RepoResult<Vec<CommentRecord>>;
}

/// SQLite-backed engagement repository.
///
/// Accepts either a plain connection (reads) or a `rusqlite::Transaction`
/// through deref (engine writes).
pub struct SqliteEngagementRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEngagementRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_engagement_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl EngagementRepository for SqliteEngagementRepository<'_> {
    fn get_post(&self, post_id: &str) -> RepoResult<Option<PostStats>> {
        let stats = self
            .conn
            .query_row(
                "SELECT
                    like_count,
                    retweet_count,
                    comment_count,
                    share_count
                 FROM posts
                 WHERE post_id = ?1;",
                [post_id],
                parse_stats_row,
            )
            .optional()?;
        Ok(stats)
    }

    fn ensure_post(&self, post_id: &str) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT INTO posts (post_id) VALUES (?1)
             ON CONFLICT (post_id) DO NOTHING;",
            [post_id],
        )?;
        Ok(inserted == 1)
    }

    fn find_detail(
        &self,
        kind: EngagementKind,
        post_id: &str,
        user_id: &str,
    ) -> RepoResult<Option<i64>> {
        let row_id = self
            .conn
            .query_row(
                &format!(
                    "SELECT id FROM {} WHERE post_id = ?1 AND user_id = ?2;",
                    kind.detail_table()
                ),
                params![post_id, user_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(row_id)
    }

    fn insert_detail(
        &self,
        kind: EngagementKind,
        post_id: &str,
        user_id: &str,
    ) -> RepoResult<i64> {
        let result = self.conn.execute(
            &format!(
                "INSERT INTO {} (post_id, user_id) VALUES (?1, ?2);",
                kind.detail_table()
            ),
            params![post_id, user_id],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(err) => {
                let err = DbError::from(err);
                if err.is_unique_violation() {
                    Err(RepoError::ConstraintViolation(format!(
                        "{} already exists for post `{post_id}`",
                        kind.as_str()
                    )))
                } else {
                    Err(err.into())
                }
            }
        }
    }

    fn delete_detail(&self, kind: EngagementKind, row_id: i64) -> RepoResult<bool> {
        let deleted = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", kind.detail_table()),
            [row_id],
        )?;
        Ok(deleted == 1)
    }

    fn adjust_counter(&self, counter: Counter, post_id: &str, delta: i64) -> RepoResult<()> {
        let column = counter.column();
        let changed = self.conn.execute(
            &format!("UPDATE posts SET {column} = MAX({column} + ?2, 0) WHERE post_id = ?1;"),
            params![post_id, delta],
        )?;

        if changed == 0 {
            return Err(RepoError::InvalidData(format!(
                "post `{post_id}` missing while adjusting {column}"
            )));
        }
        Ok(())
    }

    fn recount_detail(&self, kind: EngagementKind, post_id: &str) -> RepoResult<i64> {
        let column = kind.counter().column();
        let table = kind.detail_table();
        self.conn.execute(
            &format!(
                "UPDATE posts
                 SET {column} = (SELECT COUNT(*) FROM {table} WHERE {table}.post_id = posts.post_id)
                 WHERE post_id = ?1;"
            ),
            [post_id],
        )?;

        let count = self.conn.query_row(
            &format!("SELECT {column} FROM posts WHERE post_id = ?1;"),
            [post_id],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(count)
    }

    fn insert_comment(
        &self,
        post_id: &str,
        text: &str,
        created_at: i64,
    ) -> RepoResult<CommentId> {
        self.conn.execute(
            "INSERT INTO comments (post_id, text, created_at)
             SELECT ?1, ?2, MAX(?3, COALESCE(MAX(created_at), ?3))
             FROM comments
             WHERE post_id = ?1;",
            params![post_id, text, created_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_comments(&self, post_id: &str) -> RepoResult<Vec<CommentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                post_id,
                text,
                created_at
             FROM comments
             WHERE post_id = ?1
             ORDER BY created_at ASC, id ASC;",
        )?;

        let mut rows = stmt.query([post_id])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(CommentRecord {
                id: row.get("id")?,
                post_id: row.get("post_id")?,
                text: row.get("text")?,
                created_at: row.get("created_at")?,
            });
        }
        Ok(comments)
    }
}

fn parse_stats_row(row: &Row<'_>) -> rusqlite::Result<PostStats> {
    Ok(PostStats {
        like_count: row.get("like_count")?,
        retweet_count: row.get("retweet_count")?,
        comment_count: row.get("comment_count")?,
        share_count: row.get("share_count")?,
    })
}

fn ensure_engagement_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::{EngagementRepository, RepoError, SqliteEngagementRepository};
    use crate::db::open_db_in_memory;
    use crate::model::engagement::{Counter, EngagementKind};
    use rusqlite::Connection;

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteEngagementRepository::try_new(&conn)
            .err()
            .expect("unmigrated connection must be rejected");
        assert!(matches!(
            err,
            RepoError::UninitializedConnection {
                actual_version: 0,
                ..
            }
        ));
        assert!(err.is_unavailable());
    }

    #[test]
    fn ensure_post_is_idempotent() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEngagementRepository::try_new(&conn).unwrap();
        assert!(repo.ensure_post("p1").unwrap());
        assert!(!repo.ensure_post("p1").unwrap());
        assert!(repo.get_post("p1").unwrap().unwrap().is_zero());
    }

    #[test]
    fn duplicate_detail_insert_maps_to_constraint_violation() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEngagementRepository::try_new(&conn).unwrap();
        repo.ensure_post("p1").unwrap();
        repo.insert_detail(EngagementKind::Like, "p1", "u1").unwrap();

        let err = repo
            .insert_detail(EngagementKind::Like, "p1", "u1")
            .unwrap_err();
        assert!(matches!(err, RepoError::ConstraintViolation(_)));

        // Same pair in the other collection is independent.
        repo.insert_detail(EngagementKind::Retweet, "p1", "u1")
            .unwrap();
    }

    #[test]
    fn detail_insert_for_unknown_post_is_not_a_unique_conflict() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEngagementRepository::try_new(&conn).unwrap();

        let err = repo
            .insert_detail(EngagementKind::Like, "ghost", "u1")
            .unwrap_err();
        assert!(matches!(err, RepoError::Db(_)));
    }

    #[test]
    fn adjust_counter_floors_at_zero() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEngagementRepository::try_new(&conn).unwrap();
        repo.ensure_post("p1").unwrap();

        repo.adjust_counter(Counter::Like, "p1", -1).unwrap();
        assert_eq!(repo.get_post("p1").unwrap().unwrap().like_count, 0);

        repo.adjust_counter(Counter::Share, "p1", 3).unwrap();
        assert_eq!(repo.get_post("p1").unwrap().unwrap().share_count, 3);
    }

    #[test]
    fn adjust_counter_on_missing_post_is_invalid_data() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEngagementRepository::try_new(&conn).unwrap();
        let err = repo.adjust_counter(Counter::Share, "ghost", 1).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }

    #[test]
    fn recount_detail_repairs_drifted_counter() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEngagementRepository::try_new(&conn).unwrap();
        repo.ensure_post("p1").unwrap();
        repo.insert_detail(EngagementKind::Retweet, "p1", "u1")
            .unwrap();
        repo.insert_detail(EngagementKind::Retweet, "p1", "u2")
            .unwrap();
        repo.adjust_counter(Counter::Retweet, "p1", 7).unwrap();

        assert_eq!(
            repo.recount_detail(EngagementKind::Retweet, "p1").unwrap(),
            2
        );
        assert_eq!(repo.get_post("p1").unwrap().unwrap().retweet_count, 2);
    }
}
