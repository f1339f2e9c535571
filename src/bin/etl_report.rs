use anyhow::{Context, Result};

use nba_etl::config::{EtlConfig, count_arg, has_flag};
use nba_etl::report;
use nba_etl::store::SnapshotStore;

const DEFAULT_RUNS: usize = 5;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = EtlConfig::from_env()?.apply_args(&args)?;
    let runs_limit = count_arg(&args, "--runs", DEFAULT_RUNS)?;

    // Read-only: never creates the database or its schema.
    let store = SnapshotStore::attach(&cfg.db_path);
    let conn = store.connect_read_only()?;
    let sections = report::summary(&conn).context("build leader summary")?;
    let runs = store.recent_runs(runs_limit)?;

    if has_flag(&args, "--json") {
        let payload = serde_json::json!({
            "db": cfg.db_path.display().to_string(),
            "leaders": sections,
            "recent_runs": runs,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("serialize report")?
        );
        return Ok(());
    }

    println!("DB: {}", cfg.db_path.display());
    print!("{}", report::render_text(&sections));
    println!("\nRecent ETL runs:");
    if runs.is_empty() {
        println!("(none)");
    }
    for run in &runs {
        println!(
            "#{} {} {} -> {} records={}{}",
            run.id,
            run.status,
            run.start_time,
            run.end_time,
            run.records_processed,
            run.error_message
                .as_deref()
                .map(|e| format!(" error={e}"))
                .unwrap_or_default()
        );
    }
    Ok(())
}
