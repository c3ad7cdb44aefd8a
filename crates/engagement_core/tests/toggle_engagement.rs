use engagement_core::db::open_db_in_memory;
use engagement_core::{
    CounterService, EngagementKind, PostStats, QueryService, SqliteEngagementRepository,
    ToggleOutcome,
};
use rusqlite::Connection;

fn stats(conn: &Connection, post_id: &str) -> PostStats {
    let repo = SqliteEngagementRepository::try_new(conn).unwrap();
    QueryService::new(repo).get_stats(post_id).unwrap()
}

fn is_engaged(conn: &Connection, kind: EngagementKind, post_id: &str, user_id: &str) -> bool {
    let repo = SqliteEngagementRepository::try_new(conn).unwrap();
    QueryService::new(repo)
        .is_engaged(kind, post_id, user_id)
        .unwrap()
}

fn detail_rows(conn: &Connection, table: &str, post_id: &str) -> i64 {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE post_id = ?1;"),
        [post_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn unseen_post_reports_zero_stats_without_creating_a_row() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(stats(&conn, "never-seen"), PostStats::default());
    assert!(!is_engaged(&conn, EngagementKind::Like, "never-seen", "u1"));

    let posts: i64 = conn
        .query_row("SELECT COUNT(*) FROM posts;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(posts, 0);
}

#[test]
fn toggling_like_twice_restores_original_state() {
    let mut conn = open_db_in_memory().unwrap();

    let first = CounterService::new(&mut conn)
        .toggle_engagement(EngagementKind::Like, "p1", "u1")
        .unwrap();
    assert_eq!(first, ToggleOutcome::Added);
    assert_eq!(stats(&conn, "p1").like_count, 1);
    assert!(is_engaged(&conn, EngagementKind::Like, "p1", "u1"));

    let second = CounterService::new(&mut conn)
        .toggle_engagement(EngagementKind::Like, "p1", "u1")
        .unwrap();
    assert_eq!(second, ToggleOutcome::Removed);
    assert_eq!(stats(&conn, "p1").like_count, 0);
    assert!(!is_engaged(&conn, EngagementKind::Like, "p1", "u1"));
    assert_eq!(detail_rows(&conn, "likes", "p1"), 0);
}

#[test]
fn likes_from_distinct_users_accumulate() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut engine = CounterService::new(&mut conn);
        engine
            .toggle_engagement(EngagementKind::Like, "p1", "u1")
            .unwrap();
        engine
            .toggle_engagement(EngagementKind::Like, "p1", "u2")
            .unwrap();
    }

    assert_eq!(stats(&conn, "p1").like_count, 2);
    assert!(is_engaged(&conn, EngagementKind::Like, "p1", "u1"));
    assert!(is_engaged(&conn, EngagementKind::Like, "p1", "u2"));
    assert_eq!(detail_rows(&conn, "likes", "p1"), 2);
}

#[test]
fn like_and_retweet_are_tracked_independently() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut engine = CounterService::new(&mut conn);
        engine
            .toggle_engagement(EngagementKind::Retweet, "p1", "u1")
            .unwrap();
        engine
            .toggle_engagement(EngagementKind::Like, "p1", "u2")
            .unwrap();
        engine
            .toggle_engagement(EngagementKind::Like, "p1", "u2")
            .unwrap();
    }

    let current = stats(&conn, "p1");
    assert_eq!(current.retweet_count, 1);
    assert_eq!(current.like_count, 0);

    let repo = SqliteEngagementRepository::try_new(&conn).unwrap();
    let query = QueryService::new(repo);
    assert!(query.is_retweeted("p1", "u1").unwrap());
    assert!(!query.is_liked("p1", "u1").unwrap());
    assert!(!query.is_retweeted("p1", "u2").unwrap());
}

#[test]
fn counters_match_detail_rows_after_mixed_toggles() {
    let mut conn = open_db_in_memory().unwrap();
    let users = ["a", "b", "c", "d"];
    {
        let mut engine = CounterService::new(&mut conn);
        for round in 0..5 {
            for (index, user) in users.iter().enumerate() {
                let kind = EngagementKind::ALL[(round + index) % EngagementKind::ALL.len()];
                engine.toggle_engagement(kind, "p1", user).unwrap();
            }
        }
    }

    let current = stats(&conn, "p1");
    assert_eq!(current.like_count, detail_rows(&conn, "likes", "p1"));
    assert_eq!(current.retweet_count, detail_rows(&conn, "retweets", "p1"));
}

#[test]
fn drifted_counter_never_goes_negative_on_untoggle() {
    let mut conn = open_db_in_memory().unwrap();
    CounterService::new(&mut conn)
        .toggle_engagement(EngagementKind::Like, "p1", "u1")
        .unwrap();

    // Simulate drift left behind by an external writer.
    conn.execute("UPDATE posts SET like_count = 0 WHERE post_id = 'p1';", [])
        .unwrap();

    CounterService::new(&mut conn)
        .toggle_engagement(EngagementKind::Like, "p1", "u1")
        .unwrap();
    assert_eq!(stats(&conn, "p1").like_count, 0);
}

#[test]
fn malformed_identifiers_pass_through_unvalidated() {
    let mut conn = open_db_in_memory().unwrap();
    let post_id = "  ../weird 'post' ;--  ";
    CounterService::new(&mut conn)
        .toggle_engagement(EngagementKind::Like, post_id, "")
        .unwrap();

    assert_eq!(stats(&conn, post_id).like_count, 1);
    assert!(is_engaged(&conn, EngagementKind::Like, post_id, ""));
}
