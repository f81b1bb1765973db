//! Flat per-request projection of a HAR document and its CSV export.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use log::warn;
use serde::{Deserialize, Serialize};

use super::model::Entry;
use super::Har;
use crate::config::{CSV_TIMESTAMP_FORMAT, MEASUREMENT_CSV_HEADER};
use crate::error_handling::HarError;

/// One row of the flat request log.
///
/// Offsets (`queued`, `started`, `downloaded`) are relative to the start of
/// the first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    #[serde(rename = "Status")]
    pub status: i64,
    #[serde(rename = "Method")]
    pub method: String,
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "File")]
    pub file: String,
    #[serde(rename = "MIMEType")]
    pub mime_type: String,
    #[serde(rename = "CompressedSize(B)")]
    pub compressed_size: i64,
    #[serde(rename = "UnCompressedSize(B)")]
    pub uncompressed_size: i64,
    #[serde(rename = "PageLoadStartedDateTime")]
    pub page_load_started_date_time: String,
    #[serde(rename = "StartedDateTime")]
    pub started_date_time: String,
    #[serde(rename = "Queued(ms)")]
    pub queued: i64,
    #[serde(rename = "Started(ms)")]
    pub started: i64,
    #[serde(rename = "Downloaded(ms)")]
    pub downloaded: i64,
    #[serde(rename = "Blocked(ms)")]
    pub blocked: i64,
    #[serde(rename = "DNSResolution(ms)")]
    pub dns_resolution: i64,
    #[serde(rename = "Connecting(ms)")]
    pub connecting: i64,
    #[serde(rename = "TLSSetup(ms)")]
    pub tls_setup: i64,
    #[serde(rename = "Sending(ms)")]
    pub sending: i64,
    #[serde(rename = "Waiting(ms)")]
    pub waiting: i64,
    #[serde(rename = "Receiving(ms)")]
    pub receiving: i64,
}

impl Har {
    /// Projects every entry to a [`MeasurementRecord`], in entry order.
    ///
    /// Entries whose URL does not parse are skipped. A log without pages
    /// has no reference start time and yields nothing.
    pub fn records(&self) -> impl Iterator<Item = MeasurementRecord> + '_ {
        self.started_date_time_of_first_page()
            .into_iter()
            .flat_map(move |page_start| {
                self.log
                    .entries
                    .iter()
                    .filter_map(move |entry| project_entry(page_start, entry))
            })
    }
}

/// Truncates a HAR timing to whole milliseconds.
pub fn whole_millis(millis: f64) -> i64 {
    millis.trunc() as i64
}

fn project_entry(page_start: DateTime<FixedOffset>, entry: &Entry) -> Option<MeasurementRecord> {
    let url = match url::Url::parse(&entry.request.url) {
        Ok(url) => url,
        Err(e) => {
            warn!("Skipping entry with unparseable URL {:?}: {}", entry.request.url, e);
            return None;
        }
    };

    let domain = match url.host() {
        Some(url::Host::Ipv6(addr)) => addr.to_string(),
        Some(host) => host.to_string(),
        None => String::new(),
    };
    let file = match url.path().rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => "/".to_string(),
    };

    let queued = (entry.started_date_time - page_start).num_milliseconds();
    let timings = &entry.timings;

    Some(MeasurementRecord {
        status: entry.response.status,
        method: entry.request.method.clone(),
        domain,
        file,
        mime_type: entry.response.content.mime_type.clone(),
        compressed_size: entry.response.body_size,
        uncompressed_size: entry.response.content.size,
        page_load_started_date_time: page_start.format(CSV_TIMESTAMP_FORMAT).to_string(),
        started_date_time: entry
            .started_date_time
            .format(CSV_TIMESTAMP_FORMAT)
            .to_string(),
        queued,
        started: queued + whole_millis(timings.blocked),
        downloaded: queued + whole_millis(entry.time),
        blocked: whole_millis(timings.blocked),
        dns_resolution: whole_millis(timings.dns),
        connecting: whole_millis(timings.connect),
        tls_setup: whole_millis(timings.ssl),
        sending: whole_millis(timings.send),
        waiting: whole_millis(timings.wait),
        receiving: whole_millis(timings.receive),
    })
}

/// Writes `records` as CSV with the fixed request-log header.
///
/// The header is written even when there are no records.
pub fn write_records<W, I>(writer: W, records: I) -> Result<(), HarError>
where
    W: Write,
    I: IntoIterator<Item = MeasurementRecord>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(MEASUREMENT_CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `records` to a new CSV file at `path`.
pub fn write_records_csv<I>(path: &Path, records: I) -> Result<(), HarError>
where
    I: IntoIterator<Item = MeasurementRecord>,
{
    let file = std::fs::File::create(path)?;
    write_records(file, records)
}
