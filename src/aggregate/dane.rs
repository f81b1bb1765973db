//! DANE cross-reference of validation logs and request logs.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use log::{info, warn};

use crate::config::DANE_SUCCESS_HEADER;
use crate::csv_schema::{
    DaneValidationRecord, RequestLogRecord, DANE_VALIDATION_SCHEMA, REQUEST_LOG_SCHEMA,
};
use crate::error_handling::{ProcessingStats, StorageError, WarningType};
use crate::storage::keys::{
    csv_file_name, measurement_prefix, request_log_key, request_log_match_key,
    validated_hosts_key, validation_file_name,
};
use crate::storage::ObjectStore;
use crate::variant::MeasurementVariant;

use super::fetch_and_decode;

/// How many requests of one measurement went to DANE-validated hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaneSuccessRecord {
    pub measurement_id: String,
    pub domain: String,
    pub cache: bool,
    pub dane: bool,
    pub dane_success_count: usize,
    pub total: usize,
    pub dane_all_success: bool,
}

/// Hosts the proxy validated during one measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedHosts {
    /// Derived from the validation log's file name
    pub key: String,
    pub hosts: HashSet<String>,
}

impl ValidatedHosts {
    /// Keeps the hosts of `records` whose validation succeeded.
    pub fn from_records(key: String, records: &[DaneValidationRecord]) -> Self {
        let hosts = records
            .iter()
            .filter(|record| record.validated())
            .map(|record| record.host.clone())
            .collect();
        ValidatedHosts { key, hosts }
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Number of `requests` whose domain was validated under `match_key`.
    ///
    /// A different key matches nothing.
    pub fn count_matches(&self, match_key: &str, requests: &[RequestLogRecord]) -> usize {
        if match_key != self.key {
            return 0;
        }
        requests
            .iter()
            .filter(|request| self.hosts.contains(&request.domain))
            .count()
    }
}

/// Builds the record of one request log against its validated hosts.
pub fn cross_reference(
    measurement_id: &str,
    domain: &str,
    variant: MeasurementVariant,
    validated: &ValidatedHosts,
    match_key: &str,
    requests: &[RequestLogRecord],
) -> DaneSuccessRecord {
    let dane_success_count = validated.count_matches(match_key, requests);
    let total = requests.len();
    DaneSuccessRecord {
        measurement_id: measurement_id.to_string(),
        domain: domain.to_string(),
        cache: variant.cache(),
        dane: variant.dane(),
        dane_success_count,
        total,
        dane_all_success: dane_success_count == total,
    }
}

/// Cross-references every validation log stored under `measurement_id`.
///
/// Objects are processed in listing order. An object that cannot be fetched
/// or decoded, or that has no validated host, is logged and skipped.
///
/// # Errors
///
/// Returns the storage error if the listing itself fails.
pub async fn run_dane_check(
    store: &dyn ObjectStore,
    measurement_id: &str,
    stats: &ProcessingStats,
) -> Result<Vec<DaneSuccessRecord>, StorageError> {
    let prefix = measurement_prefix(measurement_id);
    info!("listing objects with prefix {prefix}");
    let keys = store.list_objects(&prefix).await?;

    let mut results = Vec::new();
    for (index, key) in keys.iter().enumerate() {
        info!("now processing {} ({}/{})", key, index + 1, keys.len());
        let Some(validation_file) = validation_file_name(key) else {
            continue;
        };
        let record = check_object(store, measurement_id, key, validation_file, stats).await;
        results.extend(record);
    }
    Ok(results)
}

async fn check_object(
    store: &dyn ObjectStore,
    measurement_id: &str,
    validation_key: &str,
    validation_file: &str,
    stats: &ProcessingStats,
) -> Option<DaneSuccessRecord> {
    let validation_rows: Vec<DaneValidationRecord> =
        fetch_and_decode(store, validation_key, DANE_VALIDATION_SCHEMA, stats).await?;
    let validated = ValidatedHosts::from_records(
        validated_hosts_key(validation_file, measurement_id),
        &validation_rows,
    );
    if validated.is_empty() {
        info!("no validated hosts in {validation_key}");
        stats.increment_warning(WarningType::NoValidatedHosts);
        return None;
    }

    let request_key = request_log_key(validation_key);
    let Some(request_file) = csv_file_name(&request_key) else {
        warn!("derived request log key {request_key} is not a measurement CSV");
        stats.increment_warning(WarningType::UnknownVariant);
        return None;
    };
    let Some((domain, variant)) = MeasurementVariant::parse_file_name(request_file) else {
        warn!("no measurement variant in {request_key}");
        stats.increment_warning(WarningType::UnknownVariant);
        return None;
    };

    let requests: Vec<RequestLogRecord> =
        fetch_and_decode(store, &request_key, REQUEST_LOG_SCHEMA, stats).await?;
    let match_key = request_log_match_key(request_file, measurement_id);

    Some(cross_reference(
        measurement_id,
        domain,
        variant,
        &validated,
        &match_key,
        &requests,
    ))
}

/// Writes `records` as CSV rows, preceded by the header when `with_header`.
pub fn write_dane_success<W: Write>(
    writer: W,
    records: &[DaneSuccessRecord],
    with_header: bool,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    if with_header {
        writer.write_record(DANE_SUCCESS_HEADER)?;
    }
    for record in records {
        writer.write_record([
            record.measurement_id.as_str(),
            record.domain.as_str(),
            &record.cache.to_string(),
            &record.dane.to_string(),
            &record.dane_success_count.to_string(),
            &record.total.to_string(),
            &record.dane_all_success.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Appends `records` to `path`, writing the header only into an empty file.
pub fn append_dane_success_csv(
    path: &Path,
    records: &[DaneSuccessRecord],
) -> Result<(), csv::Error> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let empty = file.metadata()?.len() == 0;
    write_dane_success(file, records, empty)
}
