use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use rusqlite::{params, Connection, Transaction};
use walkdir::WalkDir;

use crate::parser::{self, AtBat, Attributes, Element};

const GAME_FILE: &str = "game.xml";
const ROSTER_FILE: &str = "players.xml";
const INNING_FILE: &str = "inning/inning_all.xml";

/// Spring training and exhibition games are skipped: they carry
/// unreliable, sometimes non-unique player ids.
const SKIPPED_GAME_TYPES: [&str; 2] = ["S", "E"];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Walk `root` and import every game directory found, one transaction
/// per directory. A directory that fails to parse or insert is logged
/// and skipped; earlier commits stay intact.
pub fn import_root(conn: &mut Connection, root: &Path) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_dir() || !is_game_dir(entry.path()) {
            continue;
        }
        match import_game_dir(conn, entry.path()) {
            Ok(true) => report.imported += 1,
            Ok(false) => report.skipped += 1,
            Err(err) => {
                warn!("skipping {}: {:#}", entry.path().display(), err);
                report.failed += 1;
            }
        }
    }

    info!(
        "imported {} games ({} skipped, {} failed)",
        report.imported, report.skipped, report.failed
    );
    Ok(report)
}

/// A game directory holds all three files an import needs.
fn is_game_dir(dir: &Path) -> bool {
    [GAME_FILE, ROSTER_FILE, INNING_FILE]
        .iter()
        .all(|file| dir.join(file).is_file())
}

/// Import one game directory inside a single transaction. Returns false
/// when the game was deliberately skipped by type.
pub fn import_game_dir(conn: &mut Connection, dir: &Path) -> Result<bool> {
    let game_doc = read_document(&dir.join(GAME_FILE))?;
    let roster_doc = read_document(&dir.join(ROSTER_FILE))?;
    let inning_doc = read_document(&dir.join(INNING_FILE))?;

    let game = parser::get_game(&game_doc);
    if SKIPPED_GAME_TYPES.contains(&game.get("type").map(String::as_str).unwrap_or("")) {
        return Ok(false);
    }

    let date = parser::get_date(&roster_doc)?;
    let teams = parser::get_teams(&game_doc)?;
    let players = parser::get_players(&roster_doc);
    let plate_umpire = parser::get_plate_umpire(&roster_doc)?;
    let stadium = parser::get_stadium(&game_doc)?;
    let atbats = parser::get_atbats(&inning_doc)?;
    let pitches = parser::get_pitches(&inning_doc);
    let actions = parser::get_actions(&inning_doc);

    let game_pk: i64 = game
        .get("game_pk")
        .and_then(|pk| pk.parse().ok())
        .context("game record has no game_pk")?;
    // Home/away comes from document order: the first team element is the
    // home club. Every observed game file works this way, but nothing in
    // the data guarantees it.
    let home_team = record_id(&teams[0]).context("home team has no id")?;
    let away_team = record_id(&teams[1]).context("away team has no id")?;
    let stadium_id = record_id(&stadium).context("stadium has no id")?;
    let umpire_id = record_id(&plate_umpire).context("plate umpire has no id")?;

    let tx = conn.transaction()?;

    add_teams(&tx, &teams)?;
    add_players(&tx, &players)?;
    add_umpire(&tx, &plate_umpire)?;
    add_stadium(&tx, &stadium)?;
    add_game(
        &tx, &game, game_pk, date, home_team, away_team, stadium_id, umpire_id,
    )?;
    add_atbats(&tx, game_pk, &atbats)?;
    add_pitches(&tx, game_pk, &pitches)?;
    add_actions(&tx, game_pk, &actions)?;

    tx.commit()?;
    Ok(true)
}

fn read_document(path: &Path) -> Result<Element> {
    let xml =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parser::parse_document(&xml).with_context(|| format!("parsing {}", path.display()))
}

fn record_id(attrs: &Attributes) -> Option<i64> {
    attrs.get("id").and_then(|id| id.parse().ok())
}

fn attr<'a>(attrs: &'a Attributes, key: &str) -> Option<&'a str> {
    attrs.get(key).map(String::as_str)
}

fn exists(tx: &Transaction, sql: &str, id: i64) -> rusqlite::Result<bool> {
    let mut stmt = tx.prepare_cached(sql)?;
    stmt.exists(params![id])
}

fn add_teams(tx: &Transaction, teams: &[Attributes]) -> Result<()> {
    for team in teams {
        let id = record_id(team).context("team record has no id")?;
        if exists(tx, "SELECT 1 FROM team WHERE id = ?1", id)? {
            continue;
        }
        tx.execute(
            "INSERT INTO team (id, code, abbrev, name, league) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                attr(team, "code"),
                attr(team, "abbrev"),
                attr(team, "name"),
                attr(team, "league"),
            ],
        )?;
    }
    Ok(())
}

fn add_players(tx: &Transaction, players: &[Attributes]) -> Result<()> {
    for player in players {
        let id = record_id(player).context("player record has no id")?;
        if exists(tx, "SELECT 1 FROM player WHERE id = ?1", id)? {
            continue;
        }
        tx.execute(
            "INSERT INTO player (id, first, last, num, boxname, rl, bats, position, status, \
             team_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id,
                attr(player, "first"),
                attr(player, "last"),
                attr(player, "num"),
                attr(player, "boxname"),
                attr(player, "rl"),
                attr(player, "bats"),
                attr(player, "position"),
                attr(player, "status"),
                attr(player, "team_id"),
            ],
        )?;
    }
    Ok(())
}

fn add_umpire(tx: &Transaction, umpire: &Attributes) -> Result<()> {
    let id = record_id(umpire).context("umpire record has no id")?;
    if exists(tx, "SELECT 1 FROM umpire WHERE id = ?1", id)? {
        return Ok(());
    }
    tx.execute(
        "INSERT INTO umpire (id, name, first, last, position) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id,
            attr(umpire, "name"),
            attr(umpire, "first"),
            attr(umpire, "last"),
            attr(umpire, "position"),
        ],
    )?;
    Ok(())
}

fn add_stadium(tx: &Transaction, stadium: &Attributes) -> Result<()> {
    let id = record_id(stadium).context("stadium record has no id")?;
    if exists(tx, "SELECT 1 FROM stadium WHERE id = ?1", id)? {
        return Ok(());
    }
    tx.execute(
        "INSERT INTO stadium (id, name, venue_w_chan_loc, location) VALUES (?1, ?2, ?3, ?4)",
        params![
            id,
            attr(stadium, "name"),
            attr(stadium, "venue_w_chan_loc"),
            attr(stadium, "location"),
        ],
    )?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn add_game(
    tx: &Transaction,
    game: &Attributes,
    game_pk: i64,
    date: chrono::NaiveDate,
    home_team: i64,
    away_team: i64,
    stadium: i64,
    umpire: i64,
) -> Result<()> {
    if exists(tx, "SELECT 1 FROM game WHERE game_pk = ?1", game_pk)? {
        return Ok(());
    }
    tx.execute(
        "INSERT INTO game (game_pk, id, type, local_game_time, game_time_et, gameday_sw, date, \
         home_team, away_team, stadium, umpire_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            game_pk,
            attr(game, "id"),
            attr(game, "type"),
            attr(game, "local_game_time"),
            attr(game, "game_time_et"),
            attr(game, "gameday_sw"),
            date.to_string(),
            home_team,
            away_team,
            stadium,
            umpire,
        ],
    )?;
    Ok(())
}

fn add_atbats(tx: &Transaction, game_pk: i64, atbats: &[AtBat]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO atbat (game_pk, num, b, s, o, start_tfs, start_tfs_zulu, batter, stand, \
         b_height, pitcher, p_throws, des, event) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
    )?;
    for atbat in atbats {
        let attrs = &atbat.attrs;
        stmt.execute(params![
            game_pk,
            attr(attrs, "num"),
            attr(attrs, "b"),
            attr(attrs, "s"),
            attr(attrs, "o"),
            attr(attrs, "start_tfs"),
            attr(attrs, "start_tfs_zulu"),
            attr(attrs, "batter"),
            attr(attrs, "stand"),
            attr(attrs, "b_height"),
            attr(attrs, "pitcher"),
            attr(attrs, "p_throws"),
            attr(attrs, "des"),
            attr(attrs, "event"),
        ])?;
    }
    Ok(())
}

fn add_pitches(tx: &Transaction, game_pk: i64, pitches: &[Attributes]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO pitch (game_pk, des, type, tfs, x, y, sv_id, start_speed, end_speed, \
         pitch_type) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    for pitch in pitches {
        // HBP pitch elements carry no pitch data, so skip 'em.
        if attr(pitch, "des") == Some("Hit By Pitch") {
            continue;
        }
        stmt.execute(params![
            game_pk,
            attr(pitch, "des"),
            attr(pitch, "type"),
            attr(pitch, "tfs"),
            attr(pitch, "x"),
            attr(pitch, "y"),
            attr(pitch, "sv_id"),
            attr(pitch, "start_speed"),
            attr(pitch, "end_speed"),
            attr(pitch, "pitch_type"),
        ])?;
    }
    Ok(())
}

fn add_actions(tx: &Transaction, game_pk: i64, actions: &[Attributes]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO action (game_pk, b, s, o, des, event, player, pitch, tfs) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for action in actions {
        stmt.execute(params![
            game_pk,
            attr(action, "b"),
            attr(action, "s"),
            attr(action, "o"),
            attr(action, "des"),
            attr(action, "event"),
            attr(action, "player"),
            attr(action, "pitch"),
            attr(action, "tfs"),
        ])?;
    }
    Ok(())
}
