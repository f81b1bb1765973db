//! Error type definitions.
//!
//! This module defines the library error enums and the error/warning
//! categories tallied in [`ProcessingStats`](super::ProcessingStats).

use std::path::PathBuf;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

/// Errors loading or slicing the domain list.
#[derive(Error, Debug)]
pub enum DomainListError {
    #[error("failed to read domain list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write domain list {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid domain range first={first} last={last:?} for a list of {len} domains")]
    InvalidRange {
        first: usize,
        last: Option<usize>,
        len: usize,
    },
}

/// Errors decoding, saving or exporting a HAR document.
#[derive(Error, Debug)]
pub enum HarError {
    #[error("HAR decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("HAR I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HAR CSV export error: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure of one external command invocation.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The process could not be started or its pipes failed.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited unsuccessfully.
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Malformed input found while decoding a CSV file against its schema.
#[derive(Error, Debug)]
pub enum CsvDecodeError {
    #[error("{schema}: header mismatch, expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        schema: &'static str,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("{schema}: line {line} has {found} columns, expected {expected}")]
    WrongColumnCount {
        schema: &'static str,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("{schema}: malformed CSV: {source}")]
    Malformed {
        schema: &'static str,
        #[source]
        source: csv::Error,
    },
}

/// Object storage failures.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Client construction failed (credentials, region, bucket).
    #[error("storage setup error: {0}")]
    Setup(String),

    /// The service answered with a non-success status.
    #[error("storage request for {key} failed with status {status}")]
    Status { key: String, status: u16 },

    /// The request did not complete (network or I/O failure).
    #[error("storage request for {key} failed: {message}")]
    Transport { key: String, message: String },

    /// The request could not be built or its response not read.
    #[error("storage request for {key} rejected: {message}")]
    Client { key: String, message: String },
}

/// DNS lookup failures for one domain.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("zdns output decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// IP geolocation failures for one address.
#[derive(Error, Debug)]
pub enum GeoError {
    #[error("invalid geolocation URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("geolocation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("geolocation response decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Types of errors counted during a run.
///
/// Each variant is a per-unit failure: the offending domain or object is
/// logged and skipped, the run continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Measurement
    MeasurementError,
    HarEmptyError,
    HarDecodeError,
    PageLoadTimeInvalidError,
    HarSaveError,
    CsvWriteError,
    // DNS lookup
    ZdnsCommandError,
    ZdnsDecodeError,
    // Aggregation
    ObjectFetchError,
    CsvDecodeError,
    // IP geolocation
    GeoLookupError,
    GeoDecodeError,
}

/// Types of warnings counted during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    FillCacheFailed,
    TeardownStepFailed,
    NoValidatedHosts,
    UnknownVariant,
}

impl ErrorType {
    /// Returns a human-readable string representation of the error type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::MeasurementError => "Measurement error",
            ErrorType::HarEmptyError => "Empty HAR output",
            ErrorType::HarDecodeError => "HAR decode error",
            ErrorType::PageLoadTimeInvalidError => "Invalid page load time",
            ErrorType::HarSaveError => "HAR save error",
            ErrorType::CsvWriteError => "CSV write error",
            ErrorType::ZdnsCommandError => "zdns command error",
            ErrorType::ZdnsDecodeError => "zdns decode error",
            ErrorType::ObjectFetchError => "Object fetch error",
            ErrorType::CsvDecodeError => "CSV decode error",
            ErrorType::GeoLookupError => "IP location request error",
            ErrorType::GeoDecodeError => "IP location decode error",
        }
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::FillCacheFailed => "Cache warm-up visit failed",
            WarningType::TeardownStepFailed => "Teardown step failed",
            WarningType::NoValidatedHosts => "No DANE-validated hosts",
            WarningType::UnknownVariant => "Unknown measurement variant",
        }
    }
}
