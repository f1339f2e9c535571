use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::config::EtlConfig;
use crate::error::EtlResult;
use crate::extract::{SourcePaths, extract};
use crate::store::{RunStatus, SnapshotStore};
use crate::transform::transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Extracting,
    Transforming,
    LoadingPlayers,
    LoadingStats,
    Done(RunStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub start_time: DateTime<Utc>,
    pub players_loaded: usize,
    pub stats_loaded: usize,
    pub records_processed: usize,
}

/// One extract → transform → load pass over a single source. Runs must not
/// overlap; the caller serializes invocations.
#[derive(Debug, Clone)]
pub struct Pipeline {
    source: SourcePaths,
    season: String,
    store: SnapshotStore,
}

impl Pipeline {
    pub fn new(source: SourcePaths, season: impl Into<String>, store: SnapshotStore) -> Self {
        Self {
            source,
            season: season.into(),
            store,
        }
    }

    pub fn from_config(cfg: &EtlConfig) -> EtlResult<Self> {
        let store = SnapshotStore::open(&cfg.db_path)?;
        Ok(Self::new(cfg.source_paths(), cfg.season.clone(), store))
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Writes exactly one audit row, then returns the outcome. On failure the
    /// audit row carries the rows loaded before the error.
    pub fn run_once(&self) -> EtlResult<RunSummary> {
        let mut run = RunState::default();
        let start_time = Utc::now();
        info!("Starting NBA Stats ETL pipeline run at {}", start_time.to_rfc3339());

        match self.execute(&mut run, start_time) {
            Ok(summary) => {
                run.enter(Phase::Done(RunStatus::Success));
                self.store
                    .log_run(start_time, RunStatus::Success, summary.records_processed, None);
                info!(
                    "NBA Stats ETL pipeline completed successfully. Processed {} total records.",
                    summary.records_processed
                );
                Ok(summary)
            }
            Err(err) => {
                let failed_in = run.phase;
                run.enter(Phase::Done(RunStatus::Failed));
                error!("NBA Stats ETL pipeline failed during {failed_in:?}: {err}");
                let message = err.to_string();
                self.store.log_run(
                    start_time,
                    RunStatus::Failed,
                    run.records_processed,
                    Some(&message),
                );
                Err(err)
            }
        }
    }

    fn execute(&self, run: &mut RunState, start_time: DateTime<Utc>) -> EtlResult<RunSummary> {
        run.enter(Phase::Extracting);
        let raw = extract(&self.source)?;

        run.enter(Phase::Transforming);
        let snapshot = transform(raw, &self.season)?;

        run.enter(Phase::LoadingPlayers);
        let players_loaded = self.store.load_players(&snapshot.players)?;
        run.records_processed += players_loaded;

        run.enter(Phase::LoadingStats);
        let stats_loaded = self.store.load_stats(&snapshot.stats)?;
        run.records_processed += stats_loaded;

        Ok(RunSummary {
            start_time,
            players_loaded,
            stats_loaded,
            records_processed: run.records_processed,
        })
    }
}

#[derive(Debug)]
struct RunState {
    phase: Phase,
    records_processed: usize,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            records_processed: 0,
        }
    }
}

impl RunState {
    fn enter(&mut self, next: Phase) {
        debug!("pipeline phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}
