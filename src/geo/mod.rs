//! IP address to country code enrichment.
//!
//! This module provides:
//! - The `CountryLookup` seam and its iplocation.net client
//! - Reading the `domain,ip` input and writing `domain,country_code`
//! - The batch driver (`run_ip_country`)

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{error, info};
use serde::Deserialize;
use url::Url;

use crate::config::COUNTRY_CSV_HEADER;
use crate::error_handling::{ErrorType, GeoError, ProcessingStats};
use crate::utils::run_bounded;

/// One row of the address input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainIp {
    pub domain: String,
    pub ip: String,
}

/// One row of the country output. A failed lookup leaves the code empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRecord {
    pub domain: String,
    pub country_code: String,
}

/// The iplocation.net response; only `country_code2` is used.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IpLocationResponse {
    pub ip: String,
    pub ip_number: String,
    pub ip_version: u8,
    pub country_name: String,
    pub country_code2: String,
    pub isp: String,
    pub response_code: String,
    pub response_message: String,
}

/// Resolves an IP address to a two-letter country code.
#[async_trait]
pub trait CountryLookup: Send + Sync {
    async fn country_code(&self, ip: &str) -> Result<String, GeoError>;
}

/// [`CountryLookup`] backed by the iplocation.net HTTP API.
pub struct IpLocationClient {
    client: Arc<reqwest::Client>,
    endpoint: String,
}

impl IpLocationClient {
    pub fn new(client: Arc<reqwest::Client>, endpoint: impl Into<String>) -> Self {
        IpLocationClient {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn request_url(&self, ip: &str) -> Result<Url, url::ParseError> {
        Url::parse_with_params(&self.endpoint, &[("ip", ip)])
    }
}

#[async_trait]
impl CountryLookup for IpLocationClient {
    async fn country_code(&self, ip: &str) -> Result<String, GeoError> {
        let url = self.request_url(ip)?;
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let response: IpLocationResponse = serde_json::from_slice(&body)?;
        Ok(response.country_code2)
    }
}

/// Reads a CSV whose first row is a header and whose first two columns are
/// domain and address. Rows with fewer columns are skipped.
pub fn read_domain_ips<R: Read>(reader: R) -> Result<Vec<DomainIp>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row?;
        if let (Some(domain), Some(ip)) = (row.get(0), row.get(1)) {
            rows.push(DomainIp {
                domain: domain.trim().to_string(),
                ip: ip.trim().to_string(),
            });
        }
    }
    Ok(rows)
}

pub fn write_country_records<W: Write>(
    writer: W,
    records: &[CountryRecord],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(COUNTRY_CSV_HEADER)?;
    for record in records {
        writer.write_record([record.domain.as_str(), record.country_code.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Looks up the country of every address in `input_csv` and writes
/// `output_csv` in input order.
///
/// # Errors
///
/// Setup failures: unreadable input or unwritable output.
pub async fn run_ip_country(
    input_csv: &Path,
    output_csv: &Path,
    concurrency: usize,
    lookup: Arc<dyn CountryLookup>,
    stats: Arc<ProcessingStats>,
) -> Result<Vec<CountryRecord>> {
    let start_time = Instant::now();
    let file = std::fs::File::open(input_csv)
        .with_context(|| format!("Failed to open {}", input_csv.display()))?;
    let rows = read_domain_ips(file)
        .with_context(|| format!("Failed to read {}", input_csv.display()))?;
    info!("Looking up countries of {} addresses", rows.len());

    let mut results = run_bounded(rows.into_iter().enumerate(), concurrency, |(index, row)| {
        let lookup = Arc::clone(&lookup);
        let stats = Arc::clone(&stats);
        async move {
            let country_code = match lookup.country_code(&row.ip).await {
                Ok(code) => code,
                Err(e) => {
                    error!("country lookup failed for {} ({}): {}", row.domain, row.ip, e);
                    stats.increment_error(match e {
                        GeoError::Decode(_) => ErrorType::GeoDecodeError,
                        GeoError::Url(_) | GeoError::Request(_) => ErrorType::GeoLookupError,
                    });
                    String::new()
                }
            };
            info!(
                "index: {}, domain: {}, country: {}",
                index + 1,
                row.domain,
                country_code
            );
            (
                index,
                CountryRecord {
                    domain: row.domain,
                    country_code,
                },
            )
        }
    })
    .await;

    results.sort_by_key(|(index, _)| *index);
    let records: Vec<CountryRecord> = results.into_iter().map(|(_, record)| record).collect();

    let file = std::fs::File::create(output_csv)
        .with_context(|| format!("Failed to create {}", output_csv.display()))?;
    write_country_records(file, &records)
        .with_context(|| format!("Failed to write {}", output_csv.display()))?;

    info!("elapsed time: {:.2?}", start_time.elapsed());
    Ok(records)
}
