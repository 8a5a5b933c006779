use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::db;
use crate::importer::{import_game_dir, import_root, ImportReport};
use crate::tests::{fixtures, scratch_dir};

fn test_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::init(&conn).unwrap();
    conn
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT count(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn write_game_dir(dir: &Path) {
    fs::create_dir_all(dir.join("inning")).unwrap();
    fs::write(dir.join("game.xml"), fixtures::load_fixture("game.xml")).unwrap();
    fs::write(dir.join("players.xml"), fixtures::load_fixture("players.xml")).unwrap();
    fs::write(
        dir.join("inning/inning_all.xml"),
        fixtures::load_fixture("inning_all.xml"),
    )
    .unwrap();
}

#[test]
fn test_import_game_dir() {
    let dir = scratch_dir("import_game_dir");
    write_game_dir(&dir);
    let mut conn = test_conn();

    let imported = import_game_dir(&mut conn, &dir).unwrap();
    assert!(imported);

    assert_eq!(count(&conn, "team"), 2);
    assert_eq!(count(&conn, "player"), 4);
    assert_eq!(count(&conn, "umpire"), 1);
    assert_eq!(count(&conn, "stadium"), 1);
    assert_eq!(count(&conn, "game"), 1);
    assert_eq!(count(&conn, "atbat"), 3);
    assert_eq!(count(&conn, "action"), 1);

    let (home, away, stadium, umpire, date) = conn
        .query_row(
            "SELECT home_team, away_team, stadium, umpire_id, date FROM game WHERE game_pk = 380997",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .unwrap();
    assert_eq!(home, 111);
    assert_eq!(away, 142);
    assert_eq!(stadium, 3);
    assert_eq!(umpire, 427058);
    assert_eq!(date, "2014-06-17");
}

#[test]
fn test_hit_by_pitch_excluded() {
    let dir = scratch_dir("hit_by_pitch_excluded");
    write_game_dir(&dir);
    let mut conn = test_conn();

    import_game_dir(&mut conn, &dir).unwrap();

    // The fixture has six pitches, one of them a HBP.
    assert_eq!(count(&conn, "pitch"), 5);
    let hbp: i64 = conn
        .query_row(
            "SELECT count(*) FROM pitch WHERE des = 'Hit By Pitch'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(hbp, 0);
}

#[test]
fn test_import_twice_does_not_duplicate_guarded_rows() {
    let dir = scratch_dir("import_twice");
    write_game_dir(&dir);
    let mut conn = test_conn();

    import_game_dir(&mut conn, &dir).unwrap();
    import_game_dir(&mut conn, &dir).unwrap();

    assert_eq!(count(&conn, "team"), 2);
    assert_eq!(count(&conn, "player"), 4);
    assert_eq!(count(&conn, "umpire"), 1);
    assert_eq!(count(&conn, "stadium"), 1);
    assert_eq!(count(&conn, "game"), 1);
}

#[test]
fn test_spring_training_skipped() {
    let dir = scratch_dir("spring_training_skipped");
    write_game_dir(&dir);
    let game = fixtures::load_fixture("game.xml").replace(r#"type="R""#, r#"type="S""#);
    fs::write(dir.join("game.xml"), game).unwrap();
    let mut conn = test_conn();

    let imported = import_game_dir(&mut conn, &dir).unwrap();

    assert!(!imported);
    assert_eq!(count(&conn, "game"), 0);
    assert_eq!(count(&conn, "team"), 0);
}

#[test]
fn test_incomplete_play_by_play_imports_nothing() {
    let dir = scratch_dir("incomplete_play_by_play");
    write_game_dir(&dir);
    fs::write(
        dir.join("inning/inning_all.xml"),
        r#"<game><inning num="1"><top></top></inning></game>"#,
    )
    .unwrap();
    let mut conn = test_conn();

    assert!(import_game_dir(&mut conn, &dir).is_err());

    // The whole directory is skipped, not partially imported.
    assert_eq!(count(&conn, "team"), 0);
    assert_eq!(count(&conn, "game"), 0);
}

#[test]
fn test_import_root_walks_the_tree() {
    let root = scratch_dir("import_root_walks");
    let game_dir = root.join("year_2014/month_06/day_17/gid_2014_06_17_minmlb_bosmlb_1");
    write_game_dir(&game_dir);
    // A directory missing its roster is not a game directory.
    fs::create_dir_all(root.join("year_2014/month_06/day_18")).unwrap();
    let mut conn = test_conn();

    let report = import_root(&mut conn, &root).unwrap();

    assert_eq!(
        report,
        ImportReport {
            imported: 1,
            skipped: 0,
            failed: 0,
        }
    );
    assert_eq!(count(&conn, "game"), 1);
}
