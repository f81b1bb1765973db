//! DNS lookup batch runner.
//!
//! This module provides:
//! - The zdns invocation and its JSON output model
//! - The batch driver (`run_lookup`) over the domain list
//! - A-record and TLSA-record CSV exports
//!
//! zdns reads the query name on stdin and prints one JSON object per name.

mod export;
mod model;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{error, info};

use crate::config::{LookupConfig, RecordType};
use crate::domain::{load_domain_list, select_range};
use crate::error_handling::{ErrorType, LookupError, ProcessingStats};
use crate::orchestrator::{CommandRunner, Invocation};
use crate::utils::run_bounded;

pub use export::{read_usage_domains, write_a_records, write_lookup_csv, write_tlsa_records};
pub use model::{LookupRecord, ZdnsAdditional, ZdnsAnswer, ZdnsData, ZdnsResponse};

/// A zdns binary bound to one record type and resolver configuration.
#[derive(Debug, Clone)]
pub struct Zdns {
    pub program: PathBuf,
    pub conf_file: PathBuf,
    pub record_type: RecordType,
}

impl Zdns {
    pub fn from_config(config: &LookupConfig) -> Self {
        Zdns {
            program: config.zdns_path.clone(),
            conf_file: config.conf_file.clone(),
            record_type: config.record_type,
        }
    }

    pub fn invocation(&self, domain: &str) -> Invocation {
        Invocation::new(
            self.program.display().to_string(),
            [
                self.record_type.as_zdns_arg().to_string(),
                "--conf-file".to_string(),
                self.conf_file.display().to_string(),
            ],
        )
        .with_stdin(format!("{}\n", self.record_type.query_name(domain)))
    }

    /// Looks up `domain` and decodes the response.
    pub async fn lookup(
        &self,
        runner: &dyn CommandRunner,
        domain: &str,
    ) -> Result<ZdnsResponse, LookupError> {
        let stdout = runner.output(&self.invocation(domain)).await?;
        let response = serde_json::from_slice(stdout.trim_ascii())?;
        Ok(response)
    }
}

/// Outcome of a lookup run.
#[derive(Debug, Clone)]
pub struct LookupReport {
    pub total: usize,
    /// Domains whose lookup failed, sorted
    pub failed: Vec<String>,
    pub output_csv: PathBuf,
}

/// Looks up every selected domain and writes the record-type CSV.
///
/// A failed lookup is logged, counted, and kept as an answer-less record so
/// every domain is accounted for.
///
/// # Errors
///
/// Setup failures: unreadable domain list, invalid range, or an output file
/// that cannot be written.
pub async fn run_lookup(
    config: &LookupConfig,
    runner: Arc<dyn CommandRunner>,
    stats: Arc<ProcessingStats>,
) -> Result<LookupReport> {
    let start_time = Instant::now();
    let domains = load_domain_list(&config.input_csv)?;
    let selected = select_range(&domains, config.range)?;
    let zdns = Arc::new(Zdns::from_config(config));

    info!(
        "Looking up {} records of {} domains, concurrency {}",
        config.record_type.as_zdns_arg(),
        selected.len(),
        config.concurrency
    );

    let results = run_bounded(selected.iter().enumerate(), config.concurrency, |(index, record)| {
        let domain = record.domain.clone();
        let zdns = Arc::clone(&zdns);
        let runner = Arc::clone(&runner);
        let stats = Arc::clone(&stats);
        async move {
            let outcome = zdns.lookup(runner.as_ref(), &domain).await;
            info!("index: {}, domain: {}", index + 1, domain);
            match outcome {
                Ok(response) => (LookupRecord { domain, response }, true),
                Err(e) => {
                    error!("zdns lookup failed for {}: {}", domain, e);
                    stats.increment_error(match e {
                        LookupError::Command(_) => ErrorType::ZdnsCommandError,
                        LookupError::Decode(_) => ErrorType::ZdnsDecodeError,
                    });
                    let record = LookupRecord {
                        domain,
                        response: ZdnsResponse::default(),
                    };
                    (record, false)
                }
            }
        }
    })
    .await;

    let mut failed: Vec<String> = results
        .iter()
        .filter(|(_, ok)| !ok)
        .map(|(record, _)| record.domain.clone())
        .collect();
    failed.sort();
    let mut records: Vec<LookupRecord> = results.into_iter().map(|(record, _)| record).collect();
    records.sort_by(|a, b| a.domain.cmp(&b.domain));

    write_lookup_csv(&config.output_csv, config.record_type, &records).with_context(|| {
        format!("Failed to write {}", config.output_csv.display())
    })?;

    info!("finish! wrote {}", config.output_csv.display());
    info!("elapsed time: {:.2?}", start_time.elapsed());

    Ok(LookupReport {
        total: records.len(),
        failed,
        output_csv: config.output_csv.clone(),
    })
}
