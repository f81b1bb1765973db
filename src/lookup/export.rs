//! CSV export of lookup results.

use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::Path;

use crate::config::{RecordType, A_RECORD_CSV_HEADER, TLSA_RECORD_CSV_HEADER};
use crate::csv_schema::{TlsaUsageRecord, TLSA_RECORD_SCHEMA};
use crate::domain::DomainRecord;
use crate::error_handling::CsvDecodeError;

use super::model::LookupRecord;

/// Writes `domain,ip` with the first `A` answer of each domain.
///
/// Domains without an `A` answer get no row.
pub fn write_a_records<W: Write>(writer: W, records: &[LookupRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(A_RECORD_CSV_HEADER)?;
    for record in records {
        if let Some(answer) = record.response.answers_of_type("A").next() {
            writer.write_record([record.domain.as_str(), answer.answer.as_str()])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes one row per `TLSA` answer.
pub fn write_tlsa_records<W: Write>(writer: W, records: &[LookupRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(TLSA_RECORD_CSV_HEADER)?;
    for record in records {
        for answer in record.response.answers_of_type("TLSA") {
            writer.write_record([
                record.domain.as_str(),
                answer.name.as_str(),
                answer.class.as_str(),
                answer.record_type.as_str(),
                &answer.cert_usage.to_string(),
                &answer.selector.to_string(),
                &answer.matching_type.to_string(),
                answer.certificate.as_str(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes `records` to `path` in the layout of `record_type`.
pub fn write_lookup_csv(
    path: &Path,
    record_type: RecordType,
    records: &[LookupRecord],
) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path)?;
    match record_type {
        RecordType::A => write_a_records(file, records),
        RecordType::Tlsa => write_tlsa_records(file, records),
    }
}

/// Reads a TLSA export and returns the domains holding at least one record
/// of certificate `usage`, deduplicated and sorted.
pub fn read_usage_domains<R: Read>(
    reader: R,
    usage: u8,
) -> Result<Vec<DomainRecord>, CsvDecodeError> {
    let rows: Vec<TlsaUsageRecord> = TLSA_RECORD_SCHEMA.decode(reader)?;
    let domains: BTreeSet<String> = rows
        .into_iter()
        .filter(|row| row.usage == usage)
        .map(|row| row.domain)
        .collect();
    Ok(domains
        .into_iter()
        .map(|domain| DomainRecord { domain })
        .collect())
}
