//! Resource and artifact names for one measurement.

use std::path::{Path, PathBuf};

use crate::config::FILL_CACHE_SUFFIX;
use crate::variant::MeasurementVariant;

/// Every name derived from `(domain, variant)`.
///
/// The measurement id `<domain>-<variant>` is part of every container,
/// network and artifact name so that concurrent measurements never collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementNames {
    pub domain: String,
    pub variant: MeasurementVariant,
    pub id: String,
    pub network: String,
    pub resolver: String,
    pub proxy: String,
    pub browser: String,
    /// `<run dir>/<domain>`
    pub output_dir: PathBuf,
}

impl MeasurementNames {
    pub fn new(domain: &str, variant: MeasurementVariant, run_dir: &Path) -> Self {
        let id = variant.measurement_id(domain);
        MeasurementNames {
            domain: domain.to_string(),
            variant,
            network: format!("network-{id}"),
            resolver: format!("unbound-{id}"),
            proxy: format!("letsdane-{id}"),
            browser: format!("firefox-har-{id}"),
            output_dir: run_dir.join(domain),
            id,
        }
    }

    pub fn fill_cache_proxy(&self) -> String {
        format!("{}{FILL_CACHE_SUFFIX}", self.proxy)
    }

    pub fn fill_cache_browser(&self) -> String {
        format!("{}{FILL_CACHE_SUFFIX}", self.browser)
    }

    pub fn website(&self) -> String {
        format!("https://{}", self.domain)
    }

    /// Host path of the capture copied out of `tool`'s container.
    pub fn capture_path(&self, tool: &str) -> PathBuf {
        self.output_dir.join(format!("{tool}-{}.pcap", self.id))
    }

    pub fn har_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.har", self.id))
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.csv", self.id))
    }
}
