use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use crate::extract::SourcePaths;
use crate::schedule::DailySchedule;

pub const DEFAULT_DB_PATH: &str = "nba_stats.db";
pub const DEFAULT_CSV_PATH: &str = "nba_player_stats.csv";
pub const DEFAULT_STAGED_PATH: &str = "paste.txt";
pub const DEFAULT_SEASON: &str = "2024-25";
pub const DEFAULT_LOG_DIR: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlConfig {
    pub db_path: PathBuf,
    pub csv_path: PathBuf,
    pub staged_path: PathBuf,
    pub season: String,
    pub log_dir: PathBuf,
    pub daily_at: Option<DailySchedule>,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            staged_path: PathBuf::from(DEFAULT_STAGED_PATH),
            season: DEFAULT_SEASON.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            daily_at: None,
        }
    }
}

impl EtlConfig {
    /// Defaults overlaid with `NBA_ETL_*` environment variables. Blank values
    /// are ignored.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(v) = env_value("NBA_ETL_DB_PATH") {
            cfg.db_path = PathBuf::from(v);
        }
        if let Some(v) = env_value("NBA_ETL_CSV_PATH") {
            cfg.csv_path = PathBuf::from(v);
        }
        if let Some(v) = env_value("NBA_ETL_STAGED_PATH") {
            cfg.staged_path = PathBuf::from(v);
        }
        if let Some(v) = env_value("NBA_ETL_SEASON") {
            cfg.season = v;
        }
        if let Some(v) = env_value("NBA_ETL_LOG_DIR") {
            cfg.log_dir = PathBuf::from(v);
        }
        if let Some(v) = env_value("NBA_ETL_DAILY_AT") {
            cfg.daily_at = Some(
                DailySchedule::parse(&v).context("invalid NBA_ETL_DAILY_AT")?,
            );
        }
        Ok(cfg)
    }

    /// Command-line flags take precedence over the environment.
    pub fn apply_args(mut self, args: &[String]) -> Result<Self> {
        if let Some(v) = arg_value(args, "--db") {
            self.db_path = PathBuf::from(v);
        }
        if let Some(v) = arg_value(args, "--csv") {
            self.csv_path = PathBuf::from(v);
        }
        if let Some(v) = arg_value(args, "--staged") {
            self.staged_path = PathBuf::from(v);
        }
        if let Some(v) = arg_value(args, "--season") {
            self.season = v;
        }
        if let Some(v) = arg_value(args, "--log-dir") {
            self.log_dir = PathBuf::from(v);
        }
        if let Some(v) = arg_value(args, "--daily-at") {
            self.daily_at = Some(DailySchedule::parse(&v).context("invalid --daily-at")?);
        }
        Ok(self)
    }

    pub fn source_paths(&self) -> SourcePaths {
        SourcePaths {
            primary: self.csv_path.clone(),
            staged: self.staged_path.clone(),
        }
    }
}

/// Accepts both `--flag value` and `--flag=value`.
pub fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

/// A non-negative count flag. Absent means `default`; unparsable is an error.
pub fn count_arg(args: &[String], flag: &str, default: usize) -> Result<usize> {
    let Some(raw) = arg_value(args, flag) else {
        return Ok(default);
    };
    raw.parse::<usize>()
        .map_err(|_| anyhow!("{flag} expects a non-negative integer, got {raw:?}"))
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn arg_value_accepts_both_forms() {
        let a = args(&["--db", "x.db", "--season=2023-24"]);
        assert_eq!(arg_value(&a, "--db").as_deref(), Some("x.db"));
        assert_eq!(arg_value(&a, "--season").as_deref(), Some("2023-24"));
        assert_eq!(arg_value(&a, "--csv"), None);
    }

    #[test]
    fn arg_value_skips_dangling_flag() {
        let a = args(&["--db"]);
        assert_eq!(arg_value(&a, "--db"), None);
    }

    #[test]
    fn count_arg_defaults_and_rejects_garbage() {
        assert_eq!(count_arg(&args(&[]), "--runs", 5).unwrap(), 5);
        assert_eq!(count_arg(&args(&["--runs=12"]), "--runs", 5).unwrap(), 12);
        let err = count_arg(&args(&["--runs", "ten"]), "--runs", 5).unwrap_err();
        assert!(err.to_string().contains("--runs"));
        assert!(count_arg(&args(&["--runs", "-1"]), "--runs", 5).is_err());
    }

    #[test]
    fn apply_args_overrides_defaults() {
        let cfg = EtlConfig::default()
            .apply_args(&args(&["--csv", "in.csv", "--daily-at", "02:00"]))
            .unwrap();
        assert_eq!(cfg.csv_path, PathBuf::from("in.csv"));
        assert_eq!(cfg.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(cfg.season, DEFAULT_SEASON);
        assert!(cfg.daily_at.is_some());
    }

    #[test]
    fn apply_args_rejects_bad_time() {
        let err = EtlConfig::default()
            .apply_args(&args(&["--daily-at", "25:99"]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("--daily-at"));
    }
}
