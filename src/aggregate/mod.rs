//! Aggregation of stored measurement artifacts.
//!
//! This module provides:
//! - The DANE cross-reference of validation logs against request logs
//! - The status-code class tally of request logs
//! - Their summary CSV writers

mod dane;
mod tally;

use log::error;
use serde::de::DeserializeOwned;

use crate::csv_schema::CsvSchema;
use crate::error_handling::{ErrorType, ProcessingStats};
use crate::storage::ObjectStore;

pub use dane::{
    append_dane_success_csv, cross_reference, run_dane_check, write_dane_success,
    DaneSuccessRecord, ValidatedHosts,
};
pub use tally::{
    run_status_tally, sort_tally_records, write_status_tally, write_status_tally_csv,
    StatusTally, StatusTallyRecord,
};

/// Fetches `key` and decodes it against `schema`.
///
/// Failures are logged, counted, and yield `None`.
async fn fetch_and_decode<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    key: &str,
    schema: CsvSchema,
    stats: &ProcessingStats,
) -> Option<Vec<T>> {
    let body = match store.get_object(key).await {
        Ok(body) => body,
        Err(e) => {
            error!("unable to get object {key}: {e}");
            stats.increment_error(ErrorType::ObjectFetchError);
            return None;
        }
    };
    match schema.decode(body.as_slice()) {
        Ok(rows) => Some(rows),
        Err(e) => {
            error!("unable to read csv file {key}: {e}");
            stats.increment_error(ErrorType::CsvDecodeError);
            None
        }
    }
}
