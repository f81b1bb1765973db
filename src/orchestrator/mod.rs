//! Docker-driven page-load measurement.
//!
//! This module provides:
//! - The external command seam (`CommandRunner`) and its `tokio::process` implementation
//! - The docker operations a measurement issues (`DockerCli`)
//! - Per-measurement resource names (`MeasurementNames`)
//! - Reverse-order resource release (`Teardown`)
//! - The measurement driver (`collect_har`, `run_pageload`)
//!
//! One measurement creates a private network, a DNS resolver, optionally a
//! DANE validating proxy, and a browser harness whose stdout is the HAR log.

mod docker;
mod names;
mod pageload;
mod runner;
mod teardown;

pub use docker::{resolver_image, BrowserPass, DockerCli};
pub use names::MeasurementNames;
pub use pageload::{collect_har, run_pageload, write_page_load_summary, PageLoadReport};
pub use runner::{CommandRunner, Invocation, SystemRunner};
pub use teardown::{Release, Teardown};
