//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (images, capture paths, storage defaults, CSV headers)
//! - CLI value types
//! - Typed configuration structs for each program
//! - Command-line options of each program

mod cli;
mod constants;
mod types;

pub use cli::{
    DaneCheckOpt, DomainListCommand, DomainListOpt, IpCountryOpt, LoggingOpt, LookupOpt,
    PageLoadOpt, StatusCodeOpt, StorageOpt,
};
// Re-export all constants
pub use constants::*;
pub use types::{
    DomainRange, LogFormat, LogLevel, LookupConfig, MeasurementConfig, RecordType, StorageConfig,
    TallyOptions,
};
