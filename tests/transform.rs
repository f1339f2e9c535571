use std::fs;
use std::path::PathBuf;

use nba_etl::EtlError;
use nba_etl::extract::{RawTable, parse_table};
use nba_etl::transform::{transform, transform_at};

fn read_fixture(name: &str) -> RawTable {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    parse_table(&raw).expect("fixture should parse")
}

#[test]
fn tables_are_row_aligned_with_source() {
    let raw = read_fixture("player_stats.csv");
    let n = raw.len();
    let snap = transform(raw, "2024-25").expect("fixture should transform");
    assert_eq!(snap.players.len(), n);
    assert_eq!(snap.stats.len(), n);
    for (i, (p, s)) in snap.players.iter().zip(&snap.stats).enumerate() {
        assert_eq!(p.id, i as i64);
        assert_eq!(s.player_id, p.id);
        assert_eq!(s.season, "2024-25");
    }
}

#[test]
fn trimmed_headers_drive_projection() {
    let snap = transform(read_fixture("player_stats.csv"), "2024-25").unwrap();
    let first = &snap.players[0];
    assert_eq!(first.player_name.as_deref(), Some("Shai Gilgeous-Alexander"));
    assert_eq!(first.age, Some(26));
    assert_eq!(first.team.as_deref(), Some("OKC"));
    assert_eq!(first.position.as_deref(), Some("PG"));
    assert_eq!(first.player_additional.as_deref(), Some("gilgesh01"));

    let stat = &snap.stats[0];
    assert_eq!(stat.games_played, Some(76));
    assert_eq!(stat.field_goal_pct, Some(0.519));
    assert_eq!(stat.points, Some(32.7));
    assert_eq!(stat.awards.as_deref(), Some("MVP-1"));
}

#[test]
fn traded_player_rows_are_not_deduplicated() {
    let snap = transform(read_fixture("player_stats.csv"), "2024-25").unwrap();
    let butler = snap
        .players
        .iter()
        .filter(|p| p.player_additional.as_deref() == Some("butleji01"))
        .map(|p| p.id)
        .collect::<Vec<_>>();
    assert_eq!(butler, vec![2, 3]);
}

#[test]
fn missing_tokens_become_absent_not_zero() {
    let snap = transform(read_fixture("player_stats.csv"), "2024-25").unwrap();
    let rookie = &snap.stats[4];
    assert_eq!(rookie.field_goal_pct, None);
    assert_eq!(rookie.three_pt_pct, None);
    assert_eq!(rookie.effective_fg_pct, None);
    assert_eq!(rookie.ft_pct, None);
    assert_eq!(rookie.awards, None);
    // Real zeros stay zeros.
    assert_eq!(rookie.field_goals, Some(0.0));
    assert_eq!(rookie.games_started, Some(0));
}

#[test]
fn one_stamp_per_call() {
    let snap = transform_at(
        read_fixture("player_stats.csv"),
        "2024-25",
        "2025-04-14T02:00:00+00:00".to_string(),
    )
    .unwrap();
    assert!(snap.players.iter().all(|p| p.last_updated == snap.last_updated));
    assert!(snap.stats.iter().all(|s| s.last_updated == snap.last_updated));
    assert_eq!(snap.last_updated, "2025-04-14T02:00:00+00:00");
}

#[test]
fn header_only_source_yields_empty_tables() {
    let snap = transform(read_fixture("header_only.csv"), "2024-25").unwrap();
    assert!(snap.players.is_empty());
    assert!(snap.stats.is_empty());
}

#[test]
fn missing_required_column_is_transformation_error() {
    let err = transform(read_fixture("missing_fg_pct.csv"), "2024-25").unwrap_err();
    match err {
        EtlError::Transformation(msg) => assert!(msg.contains("FG%"), "message: {msg}"),
        other => panic!("expected transformation error, got {other:?}"),
    }
}

#[test]
fn non_numeric_stat_is_transformation_error() {
    let mut raw = read_fixture("player_stats.csv");
    let pts = raw
        .headers
        .iter()
        .position(|h| h.trim() == "PTS")
        .expect("PTS column");
    raw.rows[1][pts] = "lots".to_string();
    let err = transform(raw, "2024-25").unwrap_err();
    match err {
        EtlError::Transformation(msg) => {
            assert!(msg.contains("row 1"), "message: {msg}");
            assert!(msg.contains("PTS"), "message: {msg}");
        }
        other => panic!("expected transformation error, got {other:?}"),
    }
}
