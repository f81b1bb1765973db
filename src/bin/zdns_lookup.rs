//! DNS lookup program: runs `zdns` for every selected domain.

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use dane_webperf::config::{LookupConfig, LookupOpt};
use dane_webperf::initialization::init_logger_with;
use dane_webperf::lookup::run_lookup;
use dane_webperf::orchestrator::SystemRunner;
use dane_webperf::ProcessingStats;

#[tokio::main]
async fn main() -> Result<()> {
    let opt = LookupOpt::parse();
    init_logger_with(opt.logging.log_level.clone().into(), opt.logging.log_format.clone())
        .context("Failed to initialize logger")?;

    let config = LookupConfig::from(opt);
    let stats = Arc::new(ProcessingStats::new());

    match run_lookup(&config, Arc::new(SystemRunner), Arc::clone(&stats)).await {
        Ok(report) => {
            stats.print();
            println!(
                "Looked up {} domains ({} failed), results saved in {}",
                report.total,
                report.failed.len(),
                report.output_csv.display()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("zdns_lookup error: {:#}", e);
            process::exit(1);
        }
    }
}
