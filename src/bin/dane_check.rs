//! DANE cross-reference program.
//!
//! Counts, per stored validation log, how many requests of the matching
//! request log went to DANE-validated hosts, and appends the result rows.

use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use dane_webperf::aggregate::{append_dane_success_csv, run_dane_check};
use dane_webperf::config::{DaneCheckOpt, StorageConfig};
use dane_webperf::initialization::init_logger_with;
use dane_webperf::storage::S3Store;
use dane_webperf::ProcessingStats;

async fn run(opt: DaneCheckOpt, stats: &ProcessingStats) -> Result<usize> {
    let start_time = Instant::now();
    let storage = StorageConfig::from(opt.storage);
    let store = S3Store::connect(&storage).context("Failed to create storage client")?;

    let records = run_dane_check(&store, &opt.measurement_id, stats)
        .await
        .with_context(|| format!("Failed to list objects of {}", opt.measurement_id))?;
    append_dane_success_csv(&opt.output_file, &records)
        .with_context(|| format!("Failed to write {}", opt.output_file.display()))?;

    info!("elapsed time: {:.2?}", start_time.elapsed());
    Ok(records.len())
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = DaneCheckOpt::parse();
    init_logger_with(opt.logging.log_level.clone().into(), opt.logging.log_format.clone())
        .context("Failed to initialize logger")?;

    let output_file = opt.output_file.clone();
    let stats = ProcessingStats::new();
    match run(opt, &stats).await {
        Ok(rows) => {
            stats.print();
            println!("Appended {} rows to {}", rows, output_file.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("dane_check error: {:#}", e);
            process::exit(1);
        }
    }
}
