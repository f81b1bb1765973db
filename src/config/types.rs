//! Configuration types.
//!
//! CLI value enums and the typed configuration structs passed explicitly to
//! each program's driver.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_AGGREGATE_CONCURRENCY, DEFAULT_A_RECORD_CSV, DEFAULT_DOMAIN_CSV,
    DEFAULT_LOOKUP_CONCURRENCY, DEFAULT_MEASUREMENT_CONCURRENCY, DEFAULT_RESOLV_CONF,
    DEFAULT_RESULT_DIR, DEFAULT_STORAGE_BUCKET, DEFAULT_STORAGE_PROFILE, DEFAULT_STORAGE_REGION,
    DEFAULT_ZDNS_PATH,
};

/// Logging verbosity level.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and info messages (default)
    Info,
    /// All messages including debug
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// DNS record type queried by the lookup runner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RecordType {
    /// IPv4 address records
    A,
    /// DANE TLSA records for the HTTPS port
    Tlsa,
}

impl RecordType {
    /// Record type name as passed to `zdns`.
    pub fn as_zdns_arg(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Tlsa => "TLSA",
        }
    }

    /// Query name for `domain`. TLSA records live under `_443._tcp.`.
    pub fn query_name(self, domain: &str) -> String {
        match self {
            RecordType::A => domain.to_string(),
            RecordType::Tlsa => format!("_443._tcp.{domain}"),
        }
    }
}

/// 1-based inclusive selection `[first, last]` over the domain list.
///
/// `last = None` selects through the end of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainRange {
    pub first: usize,
    pub last: Option<usize>,
}

impl Default for DomainRange {
    fn default() -> Self {
        DomainRange {
            first: 1,
            last: None,
        }
    }
}

/// Configuration of one page-load measurement run.
#[derive(Debug, Clone)]
pub struct MeasurementConfig {
    /// Run with the caching resolver image and a cache warm-up visit
    pub cache: bool,
    /// Route the browser through the DANE validating proxy
    pub dane: bool,
    pub range: DomainRange,
    /// Header-less CSV of domains
    pub input_csv: PathBuf,
    /// Root directory under which the run directory is created
    pub output_dir: PathBuf,
    /// Run directory name; a start timestamp when not given
    pub sub_dir_name: String,
    /// Maximum number of domains measured at once
    pub concurrency: usize,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        MeasurementConfig {
            cache: false,
            dane: false,
            range: DomainRange::default(),
            input_csv: PathBuf::from(DEFAULT_DOMAIN_CSV),
            output_dir: PathBuf::from(DEFAULT_RESULT_DIR),
            sub_dir_name: chrono::Local::now()
                .format(crate::config::constants::RUN_DIR_TIMESTAMP_FORMAT)
                .to_string(),
            concurrency: DEFAULT_MEASUREMENT_CONCURRENCY,
        }
    }
}

impl MeasurementConfig {
    /// Directory holding every artifact of this run.
    pub fn run_dir(&self) -> PathBuf {
        self.output_dir.join(&self.sub_dir_name)
    }
}

/// Object storage connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Named credentials profile
    pub profile: String,
    pub region: String,
    pub bucket: String,
    /// Also retry calls whose connection was reset
    pub retry_connection_reset: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            profile: DEFAULT_STORAGE_PROFILE.to_string(),
            region: DEFAULT_STORAGE_REGION.to_string(),
            bucket: DEFAULT_STORAGE_BUCKET.to_string(),
            retry_connection_reset: true,
        }
    }
}

/// Configuration of one DNS lookup batch.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub record_type: RecordType,
    pub range: DomainRange,
    pub input_csv: PathBuf,
    pub output_csv: PathBuf,
    pub concurrency: usize,
    /// Path to the `zdns` executable
    pub zdns_path: PathBuf,
    /// Resolver configuration handed to `zdns --conf-file`
    pub conf_file: PathBuf,
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            record_type: RecordType::A,
            range: DomainRange::default(),
            input_csv: PathBuf::from(DEFAULT_DOMAIN_CSV),
            output_csv: PathBuf::from(DEFAULT_A_RECORD_CSV),
            concurrency: DEFAULT_LOOKUP_CONCURRENCY,
            zdns_path: PathBuf::from(DEFAULT_ZDNS_PATH),
            conf_file: PathBuf::from(DEFAULT_RESOLV_CONF),
        }
    }
}

/// Options of the status-tally aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyOptions {
    /// Report 502 responses in their own column
    pub split_502: bool,
    pub concurrency: usize,
}

impl Default for TallyOptions {
    fn default() -> Self {
        TallyOptions {
            split_502: false,
            concurrency: DEFAULT_AGGREGATE_CONCURRENCY,
        }
    }
}
