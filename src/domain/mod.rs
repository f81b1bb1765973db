//! Domain list loading and range selection.
//!
//! The domain list is a header-less CSV with one domain per row. Only the
//! first column is used; blank rows are skipped. Lists are written back in
//! the same header-less layout.

use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::DomainRange;
use crate::error_handling::DomainListError;

/// One entry of the domain list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DomainRecord {
    pub domain: String,
}

/// Reads the domain list at `path`.
///
/// # Errors
///
/// Returns `DomainListError::Read` if the file cannot be opened or parsed.
pub fn load_domain_list(path: &Path) -> Result<Vec<DomainRecord>, DomainListError> {
    let file = std::fs::File::open(path).map_err(|e| DomainListError::Read {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    read_domain_list(file).map_err(|source| DomainListError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a domain list from any reader.
pub fn read_domain_list<R: Read>(reader: R) -> Result<Vec<DomainRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut domains = Vec::new();
    for row in reader.records() {
        let row = row?;
        match row.get(0).map(str::trim) {
            Some(domain) if !domain.is_empty() => domains.push(DomainRecord {
                domain: domain.to_string(),
            }),
            _ => continue,
        }
    }
    Ok(domains)
}

/// Concatenates `lists`, drops duplicate domains and sorts the result.
pub fn merge_domain_lists<I>(lists: I) -> Vec<DomainRecord>
where
    I: IntoIterator<Item = Vec<DomainRecord>>,
{
    lists
        .into_iter()
        .flatten()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Loads every list in `paths` and merges them.
///
/// # Errors
///
/// Fails on the first list that cannot be read.
pub fn load_merged_domain_lists(paths: &[PathBuf]) -> Result<Vec<DomainRecord>, DomainListError> {
    let mut lists = Vec::with_capacity(paths.len());
    for path in paths {
        let list = load_domain_list(path)?;
        debug!("Read {} domains from {}", list.len(), path.display());
        lists.push(list);
    }
    Ok(merge_domain_lists(lists))
}

/// Writes one domain per row, without a header.
pub fn write_domain_list<W: Write>(writer: W, domains: &[DomainRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for record in domains {
        writer.write_record([record.domain.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `domains` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns `DomainListError::Write` if the file cannot be created or written.
pub fn save_domain_list(path: &Path, domains: &[DomainRecord]) -> Result<(), DomainListError> {
    let to_error = |source: csv::Error| DomainListError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(path).map_err(|e| to_error(csv::Error::from(e)))?;
    write_domain_list(file, domains).map_err(to_error)
}

/// Selects the 1-based inclusive slice described by `range`.
///
/// # Errors
///
/// Returns `DomainListError::InvalidRange` when `first` is zero, `first`
/// exceeds `last`, or `last` is beyond the end of the list.
pub fn select_range(
    domains: &[DomainRecord],
    range: DomainRange,
) -> Result<&[DomainRecord], DomainListError> {
    let invalid = || DomainListError::InvalidRange {
        first: range.first,
        last: range.last,
        len: domains.len(),
    };

    if domains.is_empty() && range.first == 1 && range.last.is_none() {
        return Ok(domains);
    }
    let last = range.last.unwrap_or(domains.len());
    if range.first == 0 || range.first > last || last > domains.len() {
        return Err(invalid());
    }
    Ok(&domains[range.first - 1..last])
}
