//! dane_webperf library: measurement and aggregation tools for studying how
//! DANE validation affects web page-load performance.
//!
//! The library drives external collaborators (Docker containers for the DNS
//! resolver, the DANE validating proxy and the instrumented browser; the
//! `zdns` binary; object storage) and turns what they produce into flat CSV
//! summaries.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dane_webperf::config::MeasurementConfig;
//! use dane_webperf::error_handling::ProcessingStats;
//! use dane_webperf::orchestrator::{run_pageload, SystemRunner};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = MeasurementConfig {
//!     cache: true,
//!     dane: true,
//!     ..Default::default()
//! };
//! let stats = Arc::new(ProcessingStats::new());
//! let report = run_pageload(&config, Arc::new(SystemRunner), stats).await?;
//! println!(
//!     "Measured {} domains: {} succeeded, {} failed",
//!     report.total,
//!     report.succeeded.len(),
//!     report.failed.len()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! The async entry points require a Tokio runtime.

pub mod aggregate;
pub mod config;
pub mod csv_schema;
pub mod domain;
pub mod error_handling;
pub mod geo;
pub mod har;
pub mod initialization;
pub mod lookup;
pub mod orchestrator;
pub mod storage;
pub mod utils;
pub mod variant;

// Re-export public API
pub use config::{LogFormat, LogLevel};
pub use error_handling::ProcessingStats;
pub use har::Har;
pub use variant::MeasurementVariant;
