use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, params};
use serde::Serialize;
use tracing::{error, info};

use crate::error::{EtlError, EtlResult};
use crate::transform::{PlayerRecord, PlayerStat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `etl_runs` row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EtlRun {
    pub id: i64,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    pub records_processed: i64,
    pub error_message: Option<String>,
}

/// SQLite-backed target for the snapshot relations and the audit log. Every
/// operation opens its own connection and drops it before returning.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    db_path: PathBuf,
}

impl SnapshotStore {
    /// Creates the database file and schema if absent.
    pub fn open(db_path: impl Into<PathBuf>) -> EtlResult<Self> {
        let store = Self {
            db_path: db_path.into(),
        };
        store
            .connect()
            .and_then(|conn| init_schema(&conn))
            .map_err(EtlError::load)?;
        info!("Database initialized at {}", store.db_path.display());
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Handle on an existing database without creating the file or schema.
    pub fn attach(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn connect(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        let conn = Connection::open(&self.db_path)
            .with_context(|| format!("open sqlite db {}", self.db_path.display()))?;
        apply_pragmas(&conn)?;
        Ok(conn)
    }

    /// Fails when the database file does not exist yet.
    pub fn connect_read_only(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(&self.db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("open sqlite db {} read-only", self.db_path.display()))?;
        apply_pragmas(&conn)?;
        Ok(conn)
    }

    /// Replaces the full contents of `players` in one transaction.
    pub fn load_players(&self, players: &[PlayerRecord]) -> EtlResult<usize> {
        info!("Loading {} player records into database", players.len());
        let count = self
            .replace_players(players)
            .map_err(EtlError::load)?;
        info!("Successfully loaded {count} player records");
        Ok(count)
    }

    /// Replaces the full contents of `player_stats` in one transaction. An
    /// empty slice is a no-op.
    pub fn load_stats(&self, stats: &[PlayerStat]) -> EtlResult<usize> {
        if stats.is_empty() {
            info!("No stats data to load");
            return Ok(0);
        }
        info!("Loading {} stats records into database", stats.len());
        let count = self.replace_stats(stats).map_err(EtlError::load)?;
        info!("Successfully loaded {count} stats records");
        Ok(count)
    }

    /// Best effort: a failure here is logged and never returned.
    pub fn log_run(
        &self,
        start_time: DateTime<Utc>,
        status: RunStatus,
        records_processed: usize,
        error_message: Option<&str>,
    ) {
        match self.insert_run(start_time, status, records_processed, error_message) {
            Ok(()) => info!("ETL run logged: {status}, {records_processed} records processed"),
            Err(err) => error!("Error logging ETL run: {err:#}"),
        }
    }

    /// Most recent audit rows first.
    pub fn recent_runs(&self, limit: usize) -> EtlResult<Vec<EtlRun>> {
        self.connect_read_only()
            .and_then(|conn| query_recent_runs(&conn, limit))
            .map_err(EtlError::load)
    }

    fn replace_players(&self, players: &[PlayerRecord]) -> Result<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction().context("begin players transaction")?;
        tx.execute("DELETE FROM players", [])
            .context("clear players")?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO players
                        (id, player_name, age, team, position, player_additional, last_updated)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .context("prepare player insert")?;
            for p in players {
                stmt.execute(params![
                    p.id,
                    p.player_name,
                    p.age,
                    p.team,
                    p.position,
                    p.player_additional,
                    p.last_updated,
                ])
                .with_context(|| format!("insert player {}", p.id))?;
            }
        }
        tx.commit().context("commit players transaction")?;
        Ok(players.len())
    }

    fn replace_stats(&self, stats: &[PlayerStat]) -> Result<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction().context("begin stats transaction")?;
        tx.execute("DELETE FROM player_stats", [])
            .context("clear player_stats")?;
        {
            let mut stmt = tx
                .prepare(
                    r#"
                    INSERT INTO player_stats (
                        player_id, season, games_played, games_started, minutes_per_game,
                        field_goals, field_goal_attempts, field_goal_pct,
                        three_pt_made, three_pt_attempts, three_pt_pct,
                        two_pt_made, two_pt_attempts, two_pt_pct, effective_fg_pct,
                        ft_made, ft_attempts, ft_pct,
                        offensive_rebounds, defensive_rebounds, total_rebounds,
                        assists, steals, blocks, turnovers, personal_fouls, points,
                        awards, last_updated
                    ) VALUES (
                        ?1, ?2, ?3, ?4, ?5,
                        ?6, ?7, ?8,
                        ?9, ?10, ?11,
                        ?12, ?13, ?14, ?15,
                        ?16, ?17, ?18,
                        ?19, ?20, ?21,
                        ?22, ?23, ?24, ?25, ?26, ?27,
                        ?28, ?29
                    )
                    "#,
                )
                .context("prepare stats insert")?;
            for s in stats {
                stmt.execute(params![
                    s.player_id,
                    s.season,
                    s.games_played,
                    s.games_started,
                    s.minutes_per_game,
                    s.field_goals,
                    s.field_goal_attempts,
                    s.field_goal_pct,
                    s.three_pt_made,
                    s.three_pt_attempts,
                    s.three_pt_pct,
                    s.two_pt_made,
                    s.two_pt_attempts,
                    s.two_pt_pct,
                    s.effective_fg_pct,
                    s.ft_made,
                    s.ft_attempts,
                    s.ft_pct,
                    s.offensive_rebounds,
                    s.defensive_rebounds,
                    s.total_rebounds,
                    s.assists,
                    s.steals,
                    s.blocks,
                    s.turnovers,
                    s.personal_fouls,
                    s.points,
                    s.awards,
                    s.last_updated,
                ])
                .with_context(|| format!("insert stats for player {}", s.player_id))?;
            }
        }
        tx.commit().context("commit stats transaction")?;
        Ok(stats.len())
    }

    fn insert_run(
        &self,
        start_time: DateTime<Utc>,
        status: RunStatus,
        records_processed: usize,
        error_message: Option<&str>,
    ) -> Result<()> {
        let conn = self.connect()?;
        let end_time = Utc::now();
        conn.execute(
            "INSERT INTO etl_runs (start_time, end_time, status, records_processed, error_message)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                start_time.to_rfc3339(),
                end_time.to_rfc3339(),
                status.as_str(),
                records_processed as i64,
                error_message,
            ],
        )
        .context("insert etl run")?;
        Ok(())
    }
}

// The two snapshot relations are replaced in separate transactions, so
// `player_stats.player_id` is not enforced while `players` is cleared. The
// bundled SQLite enables enforcement by default.
fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", false)
        .context("disable foreign key enforcement")?;
    Ok(())
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY,
            player_name TEXT,
            age INTEGER,
            team TEXT,
            position TEXT,
            player_additional TEXT,
            last_updated TEXT
        );

        CREATE TABLE IF NOT EXISTS player_stats (
            id INTEGER PRIMARY KEY,
            player_id INTEGER REFERENCES players (id),
            season TEXT,
            games_played INTEGER,
            games_started INTEGER,
            minutes_per_game REAL,
            field_goals REAL,
            field_goal_attempts REAL,
            field_goal_pct REAL,
            three_pt_made REAL,
            three_pt_attempts REAL,
            three_pt_pct REAL,
            two_pt_made REAL,
            two_pt_attempts REAL,
            two_pt_pct REAL,
            effective_fg_pct REAL,
            ft_made REAL,
            ft_attempts REAL,
            ft_pct REAL,
            offensive_rebounds REAL,
            defensive_rebounds REAL,
            total_rebounds REAL,
            assists REAL,
            steals REAL,
            blocks REAL,
            turnovers REAL,
            personal_fouls REAL,
            points REAL,
            awards TEXT,
            last_updated TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_player_stats_player ON player_stats(player_id);

        CREATE TABLE IF NOT EXISTS etl_runs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            start_time TEXT,
            end_time TEXT,
            status TEXT,
            records_processed INTEGER,
            error_message TEXT
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

fn query_recent_runs(conn: &Connection, limit: usize) -> Result<Vec<EtlRun>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, start_time, end_time, status, records_processed, error_message
             FROM etl_runs
             ORDER BY id DESC
             LIMIT ?1",
        )
        .context("prepare recent runs query")?;
    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(EtlRun {
                id: row.get(0)?,
                start_time: row.get(1)?,
                end_time: row.get(2)?,
                status: row.get(3)?,
                records_processed: row.get(4)?,
                error_message: row.get(5)?,
            })
        })
        .context("query recent runs")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode etl run row")?);
    }
    Ok(out)
}
