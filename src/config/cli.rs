//! Command-line options of the six programs.
//!
//! Each program parses its own `*Opt` struct and converts it into the typed
//! configuration its driver takes. Logging and storage flags are shared
//! through `#[command(flatten)]`.
//!
//! # Examples
//!
//! ```bash
//! pageloadtime --cache --dane --first 1 --last 100
//! zdns_lookup --record-type tlsa --output-csv ./dataset/tlsa-record.csv
//! status_code_info --measurement-id 2024-01-01-00-00-00 --split-502
//! domain_list merge --input-csv a.csv b.csv --output-csv merged.csv
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::{
    DEFAULT_AGGREGATE_CONCURRENCY, DEFAULT_A_RECORD_CSV, DEFAULT_COUNTRY_CSV,
    DEFAULT_DANE_CHECK_OUTPUT, DEFAULT_DOMAIN_CSV, DEFAULT_LOOKUP_CONCURRENCY,
    DEFAULT_MEASUREMENT_CONCURRENCY, DEFAULT_MERGED_DOMAIN_CSV, DEFAULT_RESOLV_CONF,
    DEFAULT_RESULT_DIR, DEFAULT_STATUS_CODE_OUTPUT, DEFAULT_STORAGE_BUCKET,
    DEFAULT_STORAGE_PROFILE, DEFAULT_STORAGE_REGION, DEFAULT_TLSA_RECORD_CSV, DEFAULT_TLSA_USAGE,
    DEFAULT_USAGE_DOMAIN_CSV, DEFAULT_ZDNS_PATH, RUN_DIR_TIMESTAMP_FORMAT,
};
use crate::config::types::{
    DomainRange, LogFormat, LogLevel, LookupConfig, MeasurementConfig, RecordType, StorageConfig,
    TallyOptions,
};

#[derive(Debug, Clone, Args)]
pub struct LoggingOpt {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Args)]
pub struct StorageOpt {
    /// Bucket holding the uploaded measurement results
    #[arg(long, default_value = DEFAULT_STORAGE_BUCKET)]
    pub bucket: String,

    #[arg(long, default_value = DEFAULT_STORAGE_REGION)]
    pub region: String,

    /// Named credentials profile
    #[arg(long, default_value = DEFAULT_STORAGE_PROFILE)]
    pub profile: String,

    /// Do not retry storage calls whose connection was reset
    #[arg(long)]
    pub no_reset_retry: bool,
}

impl From<StorageOpt> for StorageConfig {
    fn from(opt: StorageOpt) -> Self {
        StorageConfig {
            profile: opt.profile,
            region: opt.region,
            bucket: opt.bucket,
            retry_connection_reset: !opt.no_reset_retry,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "pageloadtime",
    about = "Measures page-load time of each domain in a fresh set of containers."
)]
pub struct PageLoadOpt {
    /// Use the caching resolver and warm its cache before measuring
    #[arg(long)]
    pub cache: bool,

    /// Route the browser through the DANE validating proxy
    #[arg(long)]
    pub dane: bool,

    /// 1-based index of the first domain to measure
    #[arg(long, default_value_t = 1)]
    pub first: usize,

    /// 1-based index of the last domain to measure (default: end of list)
    #[arg(long)]
    pub last: Option<usize>,

    /// Header-less CSV whose first column is the domain
    #[arg(long, value_parser, default_value = DEFAULT_DOMAIN_CSV)]
    pub input_csv: PathBuf,

    #[arg(long, value_parser, default_value = DEFAULT_RESULT_DIR)]
    pub output_dir: PathBuf,

    /// Run directory name (default: start time as YYYY-MM-DD-hh-mm-ss)
    #[arg(long)]
    pub sub_dir_name: Option<String>,

    /// Number of domains measured at once
    #[arg(long, default_value_t = DEFAULT_MEASUREMENT_CONCURRENCY)]
    pub concurrency: usize,

    #[command(flatten)]
    pub logging: LoggingOpt,
}

impl From<PageLoadOpt> for MeasurementConfig {
    fn from(opt: PageLoadOpt) -> Self {
        MeasurementConfig {
            cache: opt.cache,
            dane: opt.dane,
            range: DomainRange {
                first: opt.first,
                last: opt.last,
            },
            input_csv: opt.input_csv,
            output_dir: opt.output_dir,
            sub_dir_name: opt.sub_dir_name.unwrap_or_else(|| {
                chrono::Local::now()
                    .format(RUN_DIR_TIMESTAMP_FORMAT)
                    .to_string()
            }),
            concurrency: opt.concurrency,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "zdns_lookup",
    about = "Resolves A or TLSA records of each domain with zdns and writes a CSV."
)]
pub struct LookupOpt {
    #[arg(long, value_enum, default_value_t = RecordType::A)]
    pub record_type: RecordType,

    #[arg(long, default_value_t = 1)]
    pub first: usize,

    #[arg(long)]
    pub last: Option<usize>,

    #[arg(long, value_parser, default_value = DEFAULT_DOMAIN_CSV)]
    pub input_csv: PathBuf,

    /// Output CSV (default depends on the record type)
    #[arg(long, value_parser)]
    pub output_csv: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_LOOKUP_CONCURRENCY)]
    pub concurrency: usize,

    /// Path to the zdns executable
    #[arg(long, value_parser, default_value = DEFAULT_ZDNS_PATH)]
    pub zdns_path: PathBuf,

    /// Resolver configuration passed to zdns
    #[arg(long, value_parser, default_value = DEFAULT_RESOLV_CONF)]
    pub conf_file: PathBuf,

    #[command(flatten)]
    pub logging: LoggingOpt,
}

impl From<LookupOpt> for LookupConfig {
    fn from(opt: LookupOpt) -> Self {
        let output_csv = opt.output_csv.unwrap_or_else(|| {
            PathBuf::from(match opt.record_type {
                RecordType::A => DEFAULT_A_RECORD_CSV,
                RecordType::Tlsa => DEFAULT_TLSA_RECORD_CSV,
            })
        });
        LookupConfig {
            record_type: opt.record_type,
            range: DomainRange {
                first: opt.first,
                last: opt.last,
            },
            input_csv: opt.input_csv,
            output_csv,
            concurrency: opt.concurrency,
            zdns_path: opt.zdns_path,
            conf_file: opt.conf_file,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "dane_check",
    about = "Cross-references DANE validation logs with request logs of one measurement."
)]
pub struct DaneCheckOpt {
    /// Top-level key prefix of the measurement run
    #[arg(long)]
    pub measurement_id: String,

    /// Summary CSV; rows are appended
    #[arg(long, value_parser, default_value = DEFAULT_DANE_CHECK_OUTPUT)]
    pub output_file: PathBuf,

    #[command(flatten)]
    pub storage: StorageOpt,

    #[command(flatten)]
    pub logging: LoggingOpt,
}

#[derive(Debug, Parser)]
#[command(
    name = "status_code_info",
    about = "Tallies response status classes of every request log of one measurement."
)]
pub struct StatusCodeOpt {
    #[arg(long)]
    pub measurement_id: String,

    /// Summary CSV; overwritten
    #[arg(long, value_parser, default_value = DEFAULT_STATUS_CODE_OUTPUT)]
    pub output_file: PathBuf,

    /// Report 502 responses in their own column
    #[arg(long)]
    pub split_502: bool,

    #[arg(long, default_value_t = DEFAULT_AGGREGATE_CONCURRENCY)]
    pub concurrency: usize,

    #[command(flatten)]
    pub storage: StorageOpt,

    #[command(flatten)]
    pub logging: LoggingOpt,
}

impl StatusCodeOpt {
    pub fn tally_options(&self) -> TallyOptions {
        TallyOptions {
            split_502: self.split_502,
            concurrency: self.concurrency,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "ip_country",
    about = "Looks up the country code of each domain's address."
)]
pub struct IpCountryOpt {
    /// CSV with a header row and `domain,ip` in its first two columns
    #[arg(long, value_parser, default_value = DEFAULT_A_RECORD_CSV)]
    pub input_csv: PathBuf,

    #[arg(long, value_parser, default_value = DEFAULT_COUNTRY_CSV)]
    pub output_csv: PathBuf,

    #[arg(long, default_value_t = DEFAULT_LOOKUP_CONCURRENCY)]
    pub concurrency: usize,

    #[command(flatten)]
    pub logging: LoggingOpt,
}

#[derive(Debug, Parser)]
#[command(
    name = "domain_list",
    about = "Builds header-less domain lists from lookup exports and other lists."
)]
pub struct DomainListOpt {
    #[command(subcommand)]
    pub command: DomainListCommand,

    #[command(flatten)]
    pub logging: LoggingOpt,
}

#[derive(Debug, Subcommand)]
pub enum DomainListCommand {
    /// Domains with a TLSA record of the given certificate usage
    Usage {
        /// TLSA export written by `zdns_lookup --record-type tlsa`
        #[arg(long, value_parser, default_value = DEFAULT_TLSA_RECORD_CSV)]
        input_csv: PathBuf,

        #[arg(long, value_parser, default_value = DEFAULT_USAGE_DOMAIN_CSV)]
        output_csv: PathBuf,

        #[arg(long, default_value_t = DEFAULT_TLSA_USAGE)]
        usage: u8,
    },
    /// Union of several domain lists
    Merge {
        #[arg(long, value_parser, num_args = 1.., required = true)]
        input_csv: Vec<PathBuf>,

        #[arg(long, value_parser, default_value = DEFAULT_MERGED_DOMAIN_CSV)]
        output_csv: PathBuf,
    },
}
