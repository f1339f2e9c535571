use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info};

use nba_etl::config::EtlConfig;
use nba_etl::logging::init_logging;
use nba_etl::pipeline::Pipeline;
use nba_etl::report;

fn main() -> Result<ExitCode> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = EtlConfig::from_env()?.apply_args(&args)?;
    let _log_guard = init_logging(&cfg.log_dir)?;

    let pipeline = Pipeline::from_config(&cfg).context("initialize pipeline")?;

    info!("Running initial ETL job");
    let first_ok = run_job(&pipeline);
    print_summary(&pipeline);

    let Some(schedule) = cfg.daily_at else {
        return Ok(if first_ok {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    };

    info!("ETL job scheduled to run daily at {}", schedule.at.format("%H:%M"));
    loop {
        std::thread::sleep(schedule.delay_until_next());
        run_job(&pipeline);
    }
}

fn run_job(pipeline: &Pipeline) -> bool {
    match pipeline.run_once() {
        Ok(summary) => {
            info!(
                "ETL job completed: {} players, {} stats",
                summary.players_loaded, summary.stats_loaded
            );
            true
        }
        Err(err) => {
            error!("ETL job failed: {err}");
            false
        }
    }
}

fn print_summary(pipeline: &Pipeline) {
    let sections = pipeline
        .store()
        .connect()
        .and_then(|conn| report::summary(&conn));
    match sections {
        Ok(sections) => print!("{}", report::render_text(&sections)),
        Err(err) => println!("Error generating summary: {err:#}"),
    }
}
