//! Domain list program: derives measurement inputs from earlier exports.

use std::fs::File;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use dane_webperf::config::{DomainListCommand, DomainListOpt};
use dane_webperf::domain::{load_merged_domain_lists, save_domain_list, DomainRecord};
use dane_webperf::initialization::init_logger_with;
use dane_webperf::lookup::read_usage_domains;

fn build_list(command: &DomainListCommand) -> Result<(Vec<DomainRecord>, PathBuf)> {
    match command {
        DomainListCommand::Usage {
            input_csv,
            output_csv,
            usage,
        } => {
            let file = File::open(input_csv)
                .with_context(|| format!("Failed to open {}", input_csv.display()))?;
            let domains = read_usage_domains(file, *usage)
                .with_context(|| format!("Failed to read TLSA records from {}", input_csv.display()))?;
            info!("{} domains hold a TLSA record with usage {}", domains.len(), usage);
            Ok((domains, output_csv.clone()))
        }
        DomainListCommand::Merge {
            input_csv,
            output_csv,
        } => {
            let domains = load_merged_domain_lists(input_csv)?;
            info!("Merged {} lists into {} domains", input_csv.len(), domains.len());
            Ok((domains, output_csv.clone()))
        }
    }
}

fn main() -> Result<()> {
    let opt = DomainListOpt::parse();
    init_logger_with(opt.logging.log_level.clone().into(), opt.logging.log_format.clone())
        .context("Failed to initialize logger")?;

    let result = build_list(&opt.command).and_then(|(domains, output_csv)| {
        save_domain_list(&output_csv, &domains)?;
        Ok((domains.len(), output_csv))
    });
    match result {
        Ok((count, output_csv)) => {
            println!("Wrote {} domains to {}", count, output_csv.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("domain_list error: {:#}", e);
            process::exit(1);
        }
    }
}
