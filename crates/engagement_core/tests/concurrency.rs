use engagement_core::db::open_db;
use engagement_core::{CounterService, EngagementKind, QueryService, SqliteEngagementRepository};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;

const WORKERS: usize = 8;

fn detail_rows(conn: &Connection, table: &str, post_id: &str) -> i64 {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE post_id = ?1;"),
        [post_id],
        |row| row.get(0),
    )
    .unwrap()
}

fn run_workers(path: &Path, work: impl Fn(usize, &mut Connection) + Send + Sync + 'static) {
    // Migrate once up front so workers only contend on data writes.
    drop(open_db(path).unwrap());

    let barrier = Arc::new(Barrier::new(WORKERS));
    let work = Arc::new(work);
    let handles: Vec<_> = (0..WORKERS)
        .map(|index| {
            let barrier = Arc::clone(&barrier);
            let work = Arc::clone(&work);
            let path = path.to_path_buf();
            thread::spawn(move || {
                let mut conn = open_db(&path).unwrap();
                barrier.wait();
                work(index, &mut conn);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn concurrent_toggles_on_same_pair_keep_counter_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.sqlite3");

    run_workers(&path, |_, conn| {
        CounterService::new(conn)
            .toggle_engagement(EngagementKind::Like, "p1", "u1")
            .unwrap();
    });

    let conn = open_db(&path).unwrap();
    let stats = QueryService::new(SqliteEngagementRepository::try_new(&conn).unwrap())
        .get_stats("p1")
        .unwrap();
    let rows = detail_rows(&conn, "likes", "p1");
    // Eight serialized toggles of one pair net out to "absent".
    assert_eq!(rows, 0);
    assert_eq!(stats.like_count, rows);
}

#[test]
fn concurrent_engagement_from_many_users_loses_no_updates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hotspot.sqlite3");

    run_workers(&path, |index, conn| {
        let user = format!("user-{index}");
        let mut engine = CounterService::new(conn);
        engine
            .toggle_engagement(EngagementKind::Like, "hot", &user)
            .unwrap();
        engine
            .toggle_engagement(EngagementKind::Retweet, "hot", &user)
            .unwrap();
        engine.add_comment("hot", &format!("from {user}")).unwrap();
        engine.record_share("hot").unwrap();
    });

    let conn = open_db(&path).unwrap();
    let query = QueryService::new(SqliteEngagementRepository::try_new(&conn).unwrap());
    let stats = query.get_stats("hot").unwrap();
    let expected = WORKERS as i64;
    assert_eq!(stats.like_count, expected);
    assert_eq!(stats.retweet_count, expected);
    assert_eq!(stats.comment_count, expected);
    assert_eq!(stats.share_count, expected);
    assert_eq!(detail_rows(&conn, "likes", "hot"), expected);
    assert_eq!(query.list_comments("hot").unwrap().len(), WORKERS);
}
