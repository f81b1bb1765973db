//! Page-load measurement driver.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{error, info, warn};

use crate::config::{
    MeasurementConfig, FIREFOX_PCAP_PATH, LETSDANE_PCAP_PATH, PAGE_LOAD_SUMMARY_HEADER,
    UNBOUND_PCAP_PATH,
};
use crate::domain::{load_domain_list, select_range};
use crate::error_handling::{CommandError, ErrorType, ProcessingStats, WarningType};
use crate::har::{whole_millis, write_records_csv, Har};
use crate::utils::run_bounded;
use crate::variant::MeasurementVariant;

use super::docker::{BrowserPass, DockerCli};
use super::names::MeasurementNames;
use super::runner::CommandRunner;
use super::teardown::{Release, Teardown};

/// Runs one measurement and returns the browser harness output.
///
/// Every acquired resource is released, newest first, whether or not the
/// measurement succeeded.
pub async fn collect_har(
    docker: &DockerCli<'_>,
    names: &MeasurementNames,
    stats: &ProcessingStats,
) -> Result<Vec<u8>, CommandError> {
    let mut teardown = Teardown::new();
    let result = acquire_and_measure(docker, names, stats, &mut teardown).await;
    teardown.release_all(docker, stats).await;
    result
}

async fn acquire_and_measure(
    docker: &DockerCli<'_>,
    names: &MeasurementNames,
    stats: &ProcessingStats,
    teardown: &mut Teardown,
) -> Result<Vec<u8>, CommandError> {
    let variant = names.variant;

    docker.create_network(&names.network).await?;
    teardown.push(Release::RemoveNetwork(names.network.clone()));

    docker.run_resolver(names, variant.cache()).await?;
    teardown.push(Release::StopContainer(names.resolver.clone()));

    let resolver_ip = docker.container_ip(&names.resolver).await?;

    if variant.cache() {
        if variant.dane() {
            docker
                .run_proxy(&names.network, &names.fill_cache_proxy(), &resolver_ip)
                .await?;
            teardown.push(Release::StopAndRemoveContainer(names.fill_cache_proxy()));
        }
        if let Err(e) = docker
            .run_browser(names, &resolver_ip, BrowserPass::FillCache)
            .await
        {
            info!("ignoring cache warm-up failure for {}: {}", names.domain, e);
            stats.increment_warning(WarningType::FillCacheFailed);
        }
        info!("finished filling cache: {}", names.website());
    }

    docker
        .start_capture(&names.resolver, UNBOUND_PCAP_PATH)
        .await?;
    teardown.push(Release::CopyCapture {
        container: names.resolver.clone(),
        source: UNBOUND_PCAP_PATH.to_string(),
        destination: names.capture_path("unbound"),
    });

    if variant.dane() {
        docker
            .run_proxy(&names.network, &names.proxy, &resolver_ip)
            .await?;
        teardown.push(Release::StopAndRemoveContainer(names.proxy.clone()));

        docker
            .start_capture(&names.proxy, LETSDANE_PCAP_PATH)
            .await?;
        teardown.push(Release::CopyCapture {
            container: names.proxy.clone(),
            source: LETSDANE_PCAP_PATH.to_string(),
            destination: names.capture_path("letsdane"),
        });
    }

    let result = docker
        .run_browser(names, &resolver_ip, BrowserPass::Measure)
        .await;
    // the browser container exists even when the run failed
    teardown.push(Release::RemoveContainer(names.browser.clone()));
    teardown.push(Release::CopyCapture {
        container: names.browser.clone(),
        source: FIREFOX_PCAP_PATH.to_string(),
        destination: names.capture_path("firefox"),
    });
    result
}

/// Raw harness output of one domain.
#[derive(Debug)]
struct HarOutput {
    names: MeasurementNames,
    content: Vec<u8>,
}

/// Outcome of a page-load run.
#[derive(Debug, Clone)]
pub struct PageLoadReport {
    pub total: usize,
    /// Measurement ids with a valid page load time
    pub succeeded: Vec<String>,
    /// Domains without one
    pub failed: Vec<String>,
    pub summary_path: PathBuf,
}

/// Measures every selected domain and writes the run artifacts.
///
/// Per domain: `<id>.har` (bodies blanked), `<id>.csv` and the packet
/// captures under `<run dir>/<domain>/`. The run summary is
/// `<run dir>/pageloadtime-<variant>.csv`.
///
/// # Errors
///
/// Setup failures only: unreadable domain list, invalid range, or a run
/// directory that cannot be created. Per-domain failures are logged,
/// counted in `stats`, and leave a blank page load time.
pub async fn run_pageload(
    config: &MeasurementConfig,
    runner: Arc<dyn CommandRunner>,
    stats: Arc<ProcessingStats>,
) -> Result<PageLoadReport> {
    let start_time = Instant::now();
    let variant = MeasurementVariant::from_flags(config.cache, config.dane);

    let domains = load_domain_list(&config.input_csv)?;
    let selected = select_range(&domains, config.range)?.to_vec();

    let run_dir = config.run_dir();
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create run directory {}", run_dir.display()))?;

    info!(
        "Measuring page load time of {} domains ({}), concurrency {}",
        selected.len(),
        variant,
        config.concurrency
    );

    let outputs = run_bounded(selected.iter().enumerate(), config.concurrency, |(index, record)| {
        let names = MeasurementNames::new(&record.domain, variant, &run_dir);
        let runner = Arc::clone(&runner);
        let stats = Arc::clone(&stats);
        async move {
            if let Err(e) = tokio::fs::create_dir_all(&names.output_dir).await {
                error!(
                    "Failed to create directory {}: {}",
                    names.output_dir.display(),
                    e
                );
            }
            let docker = DockerCli::new(runner.as_ref());
            let content = match collect_har(&docker, &names, &stats).await {
                Ok(content) => content,
                Err(e) => {
                    error!("Failed to collect HAR for {}: {}", names.domain, e);
                    stats.increment_error(ErrorType::MeasurementError);
                    Vec::new()
                }
            };
            info!("finished measuring {}: {}", index + 1, names.domain);
            HarOutput { names, content }
        }
    })
    .await;

    let mut page_load_times: BTreeMap<String, Option<i64>> = BTreeMap::new();
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();

    for output in outputs {
        let names = &output.names;
        match process_har_output(&output, &stats) {
            Some(on_load) => {
                succeeded.push(names.id.clone());
                page_load_times.insert(names.domain.clone(), Some(on_load));
            }
            None => {
                failed.push(names.domain.clone());
                page_load_times.insert(names.domain.clone(), None);
            }
        }
    }

    let summary_path = run_dir.join(format!("pageloadtime{}.csv", variant.suffix()));
    if let Err(e) = write_page_load_summary(&summary_path, &page_load_times, variant) {
        error!(
            "Failed to write page load summary {}: {}",
            summary_path.display(),
            e
        );
        stats.increment_error(ErrorType::CsvWriteError);
    }

    succeeded.sort();
    failed.sort();
    for id in &succeeded {
        info!("success: {id}");
    }
    for domain in &failed {
        info!("failed: {domain}");
    }
    info!(
        "all: {} success: {}, failed: {}",
        selected.len(),
        succeeded.len(),
        failed.len()
    );
    info!("elapsed time: {:.2?}", start_time.elapsed());

    Ok(PageLoadReport {
        total: selected.len(),
        succeeded,
        failed,
        summary_path,
    })
}

/// Persists one domain's HAR and returns its page load time, if valid.
fn process_har_output(output: &HarOutput, stats: &ProcessingStats) -> Option<i64> {
    let names = &output.names;
    if output.content.is_empty() {
        info!("HAR output is empty: {}", names.id);
        stats.increment_error(ErrorType::HarEmptyError);
        return None;
    }

    let mut har = match Har::from_slice(&output.content) {
        Ok(har) => har,
        Err(e) => {
            error!("Failed to decode HAR for {}: {}", names.id, e);
            stats.increment_error(ErrorType::HarDecodeError);
            return None;
        }
    };
    har.drop_response_content();

    if !har.valid_page_load_time() {
        warn!("No valid page load time in HAR for {}", names.id);
        stats.increment_error(ErrorType::PageLoadTimeInvalidError);
        return None;
    }
    info!("got page load time from HAR: {}", names.id);

    if let Err(e) = har.save(&names.har_path()) {
        error!("Failed to save {}: {}", names.har_path().display(), e);
        stats.increment_error(ErrorType::HarSaveError);
    }
    if let Err(e) = write_records_csv(&names.csv_path(), har.records()) {
        error!("Failed to write {}: {}", names.csv_path().display(), e);
        stats.increment_error(ErrorType::CsvWriteError);
    }

    Some(whole_millis(har.on_load_of_first_page()))
}

/// Writes `domain,pageLoadTime,cache,dane`, one row per domain in domain order.
///
/// Failed domains get an empty page load time.
pub fn write_page_load_summary(
    path: &Path,
    page_load_times: &BTreeMap<String, Option<i64>>,
    variant: MeasurementVariant,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(PAGE_LOAD_SUMMARY_HEADER)?;
    let cache = variant.cache().to_string();
    let dane = variant.dane().to_string();
    for (domain, on_load) in page_load_times {
        let on_load = on_load.map(|ms| ms.to_string()).unwrap_or_default();
        writer.write_record([domain.as_str(), &on_load, &cache, &dane])?;
    }
    writer.flush()?;
    Ok(())
}
