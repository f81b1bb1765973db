//! Page-load measurement program.
//!
//! Measures each selected domain in a fresh set of containers, writes the
//! per-domain HAR and flat CSV, then the run's page-load summary.

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use dane_webperf::config::{MeasurementConfig, PageLoadOpt};
use dane_webperf::initialization::init_logger_with;
use dane_webperf::orchestrator::{run_pageload, SystemRunner};
use dane_webperf::ProcessingStats;

#[tokio::main]
async fn main() -> Result<()> {
    let opt = PageLoadOpt::parse();
    init_logger_with(opt.logging.log_level.clone().into(), opt.logging.log_format.clone())
        .context("Failed to initialize logger")?;

    let config = MeasurementConfig::from(opt);
    let stats = Arc::new(ProcessingStats::new());

    match run_pageload(&config, Arc::new(SystemRunner), Arc::clone(&stats)).await {
        Ok(report) => {
            stats.print();
            println!(
                "Measured {} domain{} ({} succeeded, {} failed)",
                report.total,
                if report.total == 1 { "" } else { "s" },
                report.succeeded.len(),
                report.failed.len()
            );
            println!("Summary saved in {}", report.summary_path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("pageloadtime error: {:#}", e);
            process::exit(1);
        }
    }
}
