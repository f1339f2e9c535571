use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::error::{EtlError, EtlResult};
use crate::extract::RawTable;

/// Source token for "no value".
pub const MISSING_TOKEN: &str = "-";

pub const PLAYER_COLUMNS: [&str; 5] = ["Player", "Age", "Team", "Pos", "Player-additional"];

pub const STAT_COLUMNS: [&str; 26] = [
    "G", "GS", "MP", "FG", "FGA", "FG%", "3P", "3PA", "3P%", "2P", "2PA", "2P%", "eFG%", "FT",
    "FTA", "FT%", "ORB", "DRB", "TRB", "AST", "STL", "BLK", "TOV", "PF", "PTS", "Awards",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub id: i64,
    pub player_name: Option<String>,
    pub age: Option<i64>,
    pub team: Option<String>,
    pub position: Option<String>,
    pub player_additional: Option<String>,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStat {
    pub player_id: i64,
    pub season: String,
    pub games_played: Option<i64>,
    pub games_started: Option<i64>,
    pub minutes_per_game: Option<f64>,
    pub field_goals: Option<f64>,
    pub field_goal_attempts: Option<f64>,
    pub field_goal_pct: Option<f64>,
    pub three_pt_made: Option<f64>,
    pub three_pt_attempts: Option<f64>,
    pub three_pt_pct: Option<f64>,
    pub two_pt_made: Option<f64>,
    pub two_pt_attempts: Option<f64>,
    pub two_pt_pct: Option<f64>,
    pub effective_fg_pct: Option<f64>,
    pub ft_made: Option<f64>,
    pub ft_attempts: Option<f64>,
    pub ft_pct: Option<f64>,
    pub offensive_rebounds: Option<f64>,
    pub defensive_rebounds: Option<f64>,
    pub total_rebounds: Option<f64>,
    pub assists: Option<f64>,
    pub steals: Option<f64>,
    pub blocks: Option<f64>,
    pub turnovers: Option<f64>,
    pub personal_fouls: Option<f64>,
    pub points: Option<f64>,
    pub awards: Option<String>,
    pub last_updated: String,
}

/// Both derived tables of one transform call. `players[i].id ==
/// stats[i].player_id` for every `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub players: Vec<PlayerRecord>,
    pub stats: Vec<PlayerStat>,
    pub last_updated: String,
}

pub fn transform(raw: RawTable, season: &str) -> EtlResult<Snapshot> {
    transform_at(raw, season, Utc::now().to_rfc3339())
}

/// Same as [`transform`] with a caller-supplied ingestion stamp.
pub fn transform_at(raw: RawTable, season: &str, last_updated: String) -> EtlResult<Snapshot> {
    info!("Transforming player data");
    let snapshot = build_snapshot(raw, season, last_updated).map_err(EtlError::transformation)?;
    info!(
        "Data transformation complete: {} players, {} stat records",
        snapshot.players.len(),
        snapshot.stats.len()
    );
    Ok(snapshot)
}

fn build_snapshot(raw: RawTable, season: &str, last_updated: String) -> Result<Snapshot> {
    let table = CleanTable::from_raw(raw);
    table.require_columns()?;

    let mut players = Vec::with_capacity(table.rows.len());
    let mut stats = Vec::with_capacity(table.rows.len());
    for (idx, cells) in table.rows.iter().enumerate() {
        let id = i64::try_from(idx).context("row index overflow")?;
        let row = RowView {
            table: &table,
            cells,
            id,
        };
        players.push(row.player(&last_updated)?);
        stats.push(row.stat(season, &last_updated)?);
    }

    Ok(Snapshot {
        players,
        stats,
        last_updated,
    })
}

struct CleanTable {
    index: HashMap<String, usize>,
    rows: Vec<Vec<Option<String>>>,
}

impl CleanTable {
    fn from_raw(raw: RawTable) -> Self {
        let mut index = HashMap::new();
        for (pos, header) in raw.headers.iter().enumerate() {
            // First occurrence wins on a duplicated trimmed name.
            index.entry(header.trim().to_string()).or_insert(pos);
        }
        let rows = raw
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(normalize_cell).collect())
            .collect();
        Self { index, rows }
    }

    fn require_columns(&self) -> Result<()> {
        let missing = PLAYER_COLUMNS
            .iter()
            .chain(STAT_COLUMNS.iter())
            .filter(|col| !self.index.contains_key(**col))
            .copied()
            .collect::<Vec<_>>();
        if missing.is_empty() {
            return Ok(());
        }
        Err(anyhow!(
            "missing required column(s): {}",
            missing.join(", ")
        ))
    }
}

/// `-` and empty cells become absent; everything else passes through untouched.
pub fn normalize_cell(value: String) -> Option<String> {
    if value == MISSING_TOKEN || value.is_empty() {
        None
    } else {
        Some(value)
    }
}

struct RowView<'a> {
    table: &'a CleanTable,
    cells: &'a [Option<String>],
    id: i64,
}

impl RowView<'_> {
    fn cell(&self, col: &str) -> Result<Option<&str>> {
        let pos = self
            .table
            .index
            .get(col)
            .ok_or_else(|| anyhow!("missing required column: {col}"))?;
        Ok(self.cells.get(*pos).and_then(|v| v.as_deref()))
    }

    fn text(&self, col: &str) -> Result<Option<String>> {
        Ok(self.cell(col)?.map(|v| v.to_string()))
    }

    fn float(&self, col: &str) -> Result<Option<f64>> {
        let Some(raw) = self.cell(col)? else {
            return Ok(None);
        };
        parse_float(raw)
            .map(Some)
            .ok_or_else(|| anyhow!("row {} column {col}: not a number: {raw:?}", self.id))
    }

    fn int(&self, col: &str) -> Result<Option<i64>> {
        let Some(raw) = self.cell(col)? else {
            return Ok(None);
        };
        parse_int(raw)
            .map(Some)
            .ok_or_else(|| anyhow!("row {} column {col}: not an integer: {raw:?}", self.id))
    }

    fn player(&self, last_updated: &str) -> Result<PlayerRecord> {
        Ok(PlayerRecord {
            id: self.id,
            player_name: self.text("Player")?,
            age: self.int("Age")?,
            team: self.text("Team")?,
            position: self.text("Pos")?,
            player_additional: self.text("Player-additional")?,
            last_updated: last_updated.to_string(),
        })
    }

    fn stat(&self, season: &str, last_updated: &str) -> Result<PlayerStat> {
        Ok(PlayerStat {
            player_id: self.id,
            season: season.to_string(),
            games_played: self.int("G")?,
            games_started: self.int("GS")?,
            minutes_per_game: self.float("MP")?,
            field_goals: self.float("FG")?,
            field_goal_attempts: self.float("FGA")?,
            field_goal_pct: self.float("FG%")?,
            three_pt_made: self.float("3P")?,
            three_pt_attempts: self.float("3PA")?,
            three_pt_pct: self.float("3P%")?,
            two_pt_made: self.float("2P")?,
            two_pt_attempts: self.float("2PA")?,
            two_pt_pct: self.float("2P%")?,
            effective_fg_pct: self.float("eFG%")?,
            ft_made: self.float("FT")?,
            ft_attempts: self.float("FTA")?,
            ft_pct: self.float("FT%")?,
            offensive_rebounds: self.float("ORB")?,
            defensive_rebounds: self.float("DRB")?,
            total_rebounds: self.float("TRB")?,
            assists: self.float("AST")?,
            steals: self.float("STL")?,
            blocks: self.float("BLK")?,
            turnovers: self.float("TOV")?,
            personal_fouls: self.float("PF")?,
            points: self.float("PTS")?,
            awards: self.text("Awards")?,
            last_updated: last_updated.to_string(),
        })
    }
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// Integer columns occasionally arrive as "12.0".
fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    let v = parse_float(trimmed)?;
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}
