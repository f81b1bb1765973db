//! Typed CSV decoding against a fixed header.
//!
//! Every CSV this crate reads back has a known header. A [`CsvSchema`] checks
//! it once per file, then rows are deserialized by column name; rows with the
//! wrong number of fields are reported as malformed input.

use std::io::Read;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::{DANE_VALIDATION_CSV_HEADER, MEASUREMENT_CSV_HEADER, TLSA_RECORD_CSV_HEADER};
use crate::error_handling::CsvDecodeError;

/// Ordered, named columns of one CSV file kind.
#[derive(Debug, Clone, Copy)]
pub struct CsvSchema {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// `Host,DANEValidated,Error` rows written by the validating proxy.
pub const DANE_VALIDATION_SCHEMA: CsvSchema = CsvSchema {
    name: "dane-validation",
    columns: &DANE_VALIDATION_CSV_HEADER,
};

/// The flat per-request export of a HAR document.
pub const REQUEST_LOG_SCHEMA: CsvSchema = CsvSchema {
    name: "request-log",
    columns: &MEASUREMENT_CSV_HEADER,
};

/// The TLSA lookup export.
pub const TLSA_RECORD_SCHEMA: CsvSchema = CsvSchema {
    name: "tlsa-record",
    columns: &TLSA_RECORD_CSV_HEADER,
};

impl CsvSchema {
    /// Decodes every row of `reader`.
    ///
    /// Empty input (not even a header) decodes to no rows.
    pub fn decode<T, R>(&self, reader: R) -> Result<Vec<T>, CsvDecodeError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|source| self.classify(source))?
            .clone();
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        if !headers.iter().eq(self.columns.iter().copied()) {
            return Err(CsvDecodeError::HeaderMismatch {
                schema: self.name,
                expected: self.columns.iter().map(|c| c.to_string()).collect(),
                found: headers.iter().map(str::to_string).collect(),
            });
        }

        reader
            .deserialize()
            .map(|row| row.map_err(|source| self.classify(source)))
            .collect()
    }

    fn classify(&self, source: csv::Error) -> CsvDecodeError {
        if let csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } = source.kind()
        {
            return CsvDecodeError::WrongColumnCount {
                schema: self.name,
                line: pos.as_ref().map(|p| p.line()).unwrap_or(0),
                expected: *expected_len as usize,
                found: *len as usize,
            };
        }
        CsvDecodeError::Malformed {
            schema: self.name,
            source,
        }
    }
}

/// One row of the DANE validation log.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DaneValidationRecord {
    #[serde(rename = "Host")]
    pub host: String,
    #[serde(rename = "DANEValidated")]
    pub dane_validated: String,
    #[serde(rename = "Error")]
    pub error: String,
}

impl DaneValidationRecord {
    pub fn validated(&self) -> bool {
        self.dane_validated == "true"
    }
}

/// The columns of a flat request log that the aggregators consume.
///
/// Status stays textual so that unparseable codes can still be tallied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RequestLogRecord {
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Method")]
    pub method: String,
    #[serde(rename = "Domain")]
    pub domain: String,
}

/// The columns of a TLSA export row that the domain list filter consumes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TlsaUsageRecord {
    pub domain: String,
    pub usage: u8,
}
