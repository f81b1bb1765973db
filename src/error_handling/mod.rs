//! Error handling and processing statistics.
//!
//! This module provides:
//! - Library error enums, one per concern
//! - Processing statistics tracking (errors and warnings per run)
//! - The retry strategy used by object storage calls
//!
//! Setup failures abort a program; everything counted in
//! [`ProcessingStats`] is a per-unit failure that is logged and skipped.

mod stats;
mod types;

use std::time::Duration;

use tokio_retry::strategy::ExponentialBackoff;

pub use stats::ProcessingStats;
pub use types::{
    CommandError, CsvDecodeError, DomainListError, ErrorType, GeoError, HarError,
    InitializationError, LookupError, StorageError, WarningType,
};

/// Creates an exponential backoff retry strategy.
///
/// Starts at `RETRY_INITIAL_DELAY_MS`, multiplies by `RETRY_FACTOR`, caps each
/// delay at `RETRY_MAX_DELAY_SECS` and yields `RETRY_MAX_ATTEMPTS` delays.
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}
