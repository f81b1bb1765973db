//! HTTP Archive (HAR 1.2) model and page-load queries.
//!
//! This module provides:
//! - The HAR document types (`model`)
//! - First-page load time queries and status-class filters
//! - Response body blanking and JSON persistence
//! - The flat per-request projection and its CSV export (`projection`)

mod model;
mod projection;

use std::ops::Range;
use std::path::Path;

use chrono::{DateTime, FixedOffset};

use crate::error_handling::HarError;

pub use model::{
    Cache, CacheState, Content, Cookie, Creator, Entry, Har, Log, NameValue, Page, PageTimings,
    Param, PostData, Request, Response, Timings, NOT_MEASURED,
};
pub use projection::{whole_millis, write_records, write_records_csv, MeasurementRecord};

impl Har {
    /// Decodes a HAR document.
    ///
    /// Accepts either a full `{"log": ...}` document or a bare `log` object,
    /// which is what the browser harness prints.
    pub fn from_slice(bytes: &[u8]) -> Result<Har, HarError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if value.get("log").is_some() {
            Ok(serde_json::from_value(value)?)
        } else {
            Ok(Har {
                log: serde_json::from_value(value)?,
            })
        }
    }

    pub fn exist_pages(&self) -> bool {
        !self.log.pages.is_empty()
    }

    /// True when there is a first page and its `onLoad` is positive.
    pub fn valid_page_load_time(&self) -> bool {
        self.log
            .pages
            .first()
            .is_some_and(|page| page.page_timings.on_load > 0.0)
    }

    pub fn started_date_time_of_first_page(&self) -> Option<DateTime<FixedOffset>> {
        self.log.pages.first().map(|page| page.started_date_time)
    }

    /// `onContentLoad` of the first page, `-1` when there are no pages.
    pub fn on_content_load_of_first_page(&self) -> f64 {
        self.log
            .pages
            .first()
            .map_or(NOT_MEASURED, |page| page.page_timings.on_content_load)
    }

    /// `onLoad` of the first page, `-1` when there are no pages.
    pub fn on_load_of_first_page(&self) -> f64 {
        self.log
            .pages
            .first()
            .map_or(NOT_MEASURED, |page| page.page_timings.on_load)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.log.entries
    }

    fn entries_with_status(&self, class: Range<i64>) -> impl Iterator<Item = &Entry> + '_ {
        self.log
            .entries
            .iter()
            .filter(move |entry| class.contains(&entry.response.status))
    }

    /// Entries with a 1xx status.
    pub fn informational(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries_with_status(100..200)
    }

    /// Entries with a 2xx status.
    pub fn success(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries_with_status(200..300)
    }

    /// Entries with a 3xx status.
    pub fn redirection(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries_with_status(300..400)
    }

    /// Entries with a 4xx status.
    pub fn client_error(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries_with_status(400..500)
    }

    /// Entries with a 5xx status.
    pub fn server_error(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries_with_status(500..600)
    }

    /// Blanks every response body. Irreversible.
    pub fn drop_response_content(&mut self) {
        for entry in &mut self.log.entries {
            entry.response.content.text.clear();
        }
    }

    /// Writes the document as compact JSON, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), HarError> {
        let bytes = serde_json::to_vec(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
