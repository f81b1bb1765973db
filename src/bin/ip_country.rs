//! IP country enrichment program.

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use dane_webperf::config::{IpCountryOpt, IP_LOCATION_ENDPOINT};
use dane_webperf::geo::{run_ip_country, IpLocationClient};
use dane_webperf::initialization::{init_client, init_logger_with};
use dane_webperf::ProcessingStats;

#[tokio::main]
async fn main() -> Result<()> {
    let opt = IpCountryOpt::parse();
    init_logger_with(opt.logging.log_level.clone().into(), opt.logging.log_format.clone())
        .context("Failed to initialize logger")?;

    let client = match init_client() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("ip_country error: {}", e);
            process::exit(1);
        }
    };
    let lookup = Arc::new(IpLocationClient::new(client, IP_LOCATION_ENDPOINT));
    let stats = Arc::new(ProcessingStats::new());

    match run_ip_country(
        &opt.input_csv,
        &opt.output_csv,
        opt.concurrency,
        lookup,
        Arc::clone(&stats),
    )
    .await
    {
        Ok(records) => {
            stats.print();
            println!(
                "Looked up {} addresses, results saved in {}",
                records.len(),
                opt.output_csv.display()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("ip_country error: {:#}", e);
            process::exit(1);
        }
    }
}
