//! Status-code tally program.

use std::process;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use dane_webperf::aggregate::{run_status_tally, write_status_tally_csv};
use dane_webperf::config::{StatusCodeOpt, StorageConfig};
use dane_webperf::initialization::init_logger_with;
use dane_webperf::storage::{ObjectStore, S3Store};
use dane_webperf::ProcessingStats;

async fn run(opt: StatusCodeOpt, stats: Arc<ProcessingStats>) -> Result<usize> {
    let start_time = Instant::now();
    let options = opt.tally_options();
    let storage = StorageConfig::from(opt.storage);
    let store: Arc<dyn ObjectStore> =
        Arc::new(S3Store::connect(&storage).context("Failed to create storage client")?);

    let records = run_status_tally(store, &opt.measurement_id, options, stats)
        .await
        .with_context(|| format!("Failed to list objects of {}", opt.measurement_id))?;
    write_status_tally_csv(&opt.output_file, &records, options.split_502)
        .with_context(|| format!("Failed to write {}", opt.output_file.display()))?;

    info!("elapsed time: {:.2?}", start_time.elapsed());
    Ok(records.len())
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = StatusCodeOpt::parse();
    init_logger_with(opt.logging.log_level.clone().into(), opt.logging.log_format.clone())
        .context("Failed to initialize logger")?;

    let output_file = opt.output_file.clone();
    let stats = Arc::new(ProcessingStats::new());
    match run(opt, Arc::clone(&stats)).await {
        Ok(rows) => {
            stats.print();
            println!("Wrote {} rows to {}", rows, output_file.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("status_code_info error: {:#}", e);
            process::exit(1);
        }
    }
}
