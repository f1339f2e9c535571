use std::fmt::Write as _;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Leaderboard {
    Points,
    Rebounds,
    Assists,
}

impl Leaderboard {
    fn order_column(self) -> &'static str {
        match self {
            Leaderboard::Points => "ps.points",
            Leaderboard::Rebounds => "ps.total_rebounds",
            Leaderboard::Assists => "ps.assists",
        }
    }

    pub fn title(self, limit: usize) -> String {
        match self {
            Leaderboard::Points => format!("Top {limit} NBA Scorers"),
            Leaderboard::Rebounds => format!("Top {limit} NBA Rebounders"),
            Leaderboard::Assists => format!("Top {limit} NBA Assist Leaders"),
        }
    }

    /// Boards and sizes of the standard summary.
    pub fn summary_layout() -> [(Leaderboard, usize); 3] {
        [
            (Leaderboard::Points, 10),
            (Leaderboard::Rebounds, 5),
            (Leaderboard::Assists, 5),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderRow {
    pub player_name: Option<String>,
    pub team: Option<String>,
    pub points: Option<f64>,
    pub total_rebounds: Option<f64>,
    pub assists: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderSection {
    pub board: Leaderboard,
    pub title: String,
    pub rows: Vec<LeaderRow>,
}

/// Current snapshot ordered by the board's stat, highest first. Rows without
/// a value for that stat sort last.
pub fn top_players(conn: &Connection, board: Leaderboard, limit: usize) -> Result<Vec<LeaderRow>> {
    let order = board.order_column();
    let sql = format!(
        "SELECT p.player_name, p.team, ps.points, ps.total_rebounds, ps.assists
         FROM player_stats ps
         JOIN players p ON ps.player_id = p.id
         ORDER BY {order} IS NULL, {order} DESC, ps.player_id ASC
         LIMIT ?1"
    );
    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("prepare {board:?} leaders query"))?;
    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(LeaderRow {
                player_name: row.get(0)?,
                team: row.get(1)?,
                points: row.get(2)?,
                total_rebounds: row.get(3)?,
                assists: row.get(4)?,
            })
        })
        .with_context(|| format!("query {board:?} leaders"))?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode leader row")?);
    }
    Ok(out)
}

pub fn summary(conn: &Connection) -> Result<Vec<LeaderSection>> {
    Leaderboard::summary_layout()
        .into_iter()
        .map(|(board, limit)| {
            Ok(LeaderSection {
                board,
                title: board.title(limit),
                rows: top_players(conn, board, limit)?,
            })
        })
        .collect()
}

pub fn render_text(sections: &[LeaderSection]) -> String {
    let mut out = String::new();
    for section in sections {
        let _ = writeln!(out, "\n{}:", section.title);
        let _ = writeln!(
            out,
            "{:<28} {:<5} {:>6} {:>6} {:>6}",
            "player", "team", "pts", "trb", "ast"
        );
        if section.rows.is_empty() {
            let _ = writeln!(out, "(no rows)");
            continue;
        }
        for row in &section.rows {
            let _ = writeln!(
                out,
                "{:<28} {:<5} {:>6} {:>6} {:>6}",
                row.player_name.as_deref().unwrap_or("n/a"),
                row.team.as_deref().unwrap_or("n/a"),
                fmt_stat(row.points),
                fmt_stat(row.total_rebounds),
                fmt_stat(row.assists),
            );
        }
    }
    out
}

fn fmt_stat(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string())
}
