//! Status-code class tally of stored request logs.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use crate::config::{
    TallyOptions, STATUS_TALLY_502_COLUMN, STATUS_TALLY_LEADING_HEADER,
    STATUS_TALLY_TRAILING_HEADER,
};
use crate::csv_schema::{RequestLogRecord, REQUEST_LOG_SCHEMA};
use crate::error_handling::{ProcessingStats, StorageError, WarningType};
use crate::storage::keys::{csv_file_name, measurement_prefix, VALIDATION_PREFIX};
use crate::storage::ObjectStore;
use crate::utils::run_bounded;
use crate::variant::MeasurementVariant;

use super::fetch_and_decode;

/// Response counts per status class.
///
/// `five_02` is a subset of `five_xx`; `total` is the sum of the classes
/// and `xxx`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTally {
    pub one_xx: usize,
    pub two_xx: usize,
    pub three_xx: usize,
    pub four_xx: usize,
    pub five_xx: usize,
    pub five_02: usize,
    /// Out of range or unparseable
    pub xxx: usize,
    pub total: usize,
}

impl StatusTally {
    pub fn record(&mut self, status: &str) {
        match status.trim().parse::<i64>() {
            Ok(100..=199) => self.one_xx += 1,
            Ok(200..=299) => self.two_xx += 1,
            Ok(300..=399) => self.three_xx += 1,
            Ok(400..=499) => self.four_xx += 1,
            Ok(code @ 500..=599) => {
                self.five_xx += 1;
                if code == 502 {
                    self.five_02 += 1;
                }
            }
            _ => self.xxx += 1,
        }
        self.total += 1;
    }

    pub fn from_statuses<'a>(statuses: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tally = StatusTally::default();
        for status in statuses {
            tally.record(status);
        }
        tally
    }
}

/// Tally of one stored request log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTallyRecord {
    pub measurement_id: String,
    pub domain: String,
    pub cache: bool,
    pub dane: bool,
    pub tally: StatusTally,
}

/// Orders by DANE flag, then cache flag, then domain, then measurement id.
pub fn sort_tally_records(records: &mut [StatusTallyRecord]) {
    records.sort_by(|a, b| {
        (a.dane, a.cache, &a.domain, &a.measurement_id).cmp(&(
            b.dane,
            b.cache,
            &b.domain,
            &b.measurement_id,
        ))
    });
}

/// Request logs under `measurement_id`, with the domain and variant their
/// file names encode. Validation logs are not request logs and are left out.
fn tally_candidates(
    keys: &[String],
    stats: &ProcessingStats,
) -> Vec<(String, String, MeasurementVariant)> {
    let mut candidates = Vec::new();
    for key in keys {
        let Some(file_name) = csv_file_name(key) else {
            continue;
        };
        if file_name.starts_with(VALIDATION_PREFIX) {
            continue;
        }
        match MeasurementVariant::parse_file_name(file_name) {
            Some((domain, variant)) => {
                candidates.push((key.clone(), domain.to_string(), variant))
            }
            None => {
                warn!("no measurement variant in {key}, skipping");
                stats.increment_warning(WarningType::UnknownVariant);
            }
        }
    }
    candidates
}

/// Tallies the status codes of every request log under `measurement_id`.
///
/// Objects are fetched on the bounded worker pool. An object that cannot be
/// fetched or decoded is logged and skipped. The result is sorted with
/// [`sort_tally_records`].
///
/// # Errors
///
/// Returns the storage error if the listing itself fails.
pub async fn run_status_tally(
    store: Arc<dyn ObjectStore>,
    measurement_id: &str,
    options: TallyOptions,
    stats: Arc<ProcessingStats>,
) -> Result<Vec<StatusTallyRecord>, StorageError> {
    let prefix = measurement_prefix(measurement_id);
    info!("listing objects with prefix {prefix}");
    let keys = store.list_objects(&prefix).await?;
    let candidates = tally_candidates(&keys, &stats);
    let count = candidates.len();

    let results = run_bounded(
        candidates.into_iter().enumerate(),
        options.concurrency,
        |(index, (key, domain, variant))| {
            let store = Arc::clone(&store);
            let stats = Arc::clone(&stats);
            let measurement_id = measurement_id.to_string();
            async move {
                info!("now processing {} ({}/{})", key, index + 1, count);
                let requests: Vec<RequestLogRecord> =
                    fetch_and_decode(store.as_ref(), &key, REQUEST_LOG_SCHEMA, &stats).await?;
                Some(StatusTallyRecord {
                    measurement_id,
                    domain,
                    cache: variant.cache(),
                    dane: variant.dane(),
                    tally: StatusTally::from_statuses(
                        requests.iter().map(|request| request.status.as_str()),
                    ),
                })
            }
        },
    )
    .await;

    let mut records: Vec<StatusTallyRecord> = results.into_iter().flatten().collect();
    sort_tally_records(&mut records);
    Ok(records)
}

/// Writes the tally CSV; the `502` column is present only with `split_502`.
pub fn write_status_tally<W: Write>(
    writer: W,
    records: &[StatusTallyRecord],
    split_502: bool,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = STATUS_TALLY_LEADING_HEADER.to_vec();
    if split_502 {
        header.push(STATUS_TALLY_502_COLUMN);
    }
    header.extend(STATUS_TALLY_TRAILING_HEADER);
    writer.write_record(&header)?;

    for record in records {
        let tally = &record.tally;
        let mut row = vec![
            record.measurement_id.clone(),
            record.domain.clone(),
            record.cache.to_string(),
            record.dane.to_string(),
            tally.one_xx.to_string(),
            tally.two_xx.to_string(),
            tally.three_xx.to_string(),
            tally.four_xx.to_string(),
            tally.five_xx.to_string(),
        ];
        if split_502 {
            row.push(tally.five_02.to_string());
        }
        row.push(tally.xxx.to_string());
        row.push(tally.total.to_string());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the tally CSV to `path`, replacing any existing file.
pub fn write_status_tally_csv(
    path: &Path,
    records: &[StatusTallyRecord],
    split_502: bool,
) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path)?;
    write_status_tally(file, records, split_502)
}
