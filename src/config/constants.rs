//! Configuration constants.
//!
//! Container images, in-container capture paths, storage defaults, retry
//! parameters and the fixed CSV headers shared by the measurement and
//! aggregation programs.

// Docker images (must be built before a measurement run)
pub const UNBOUND_WITH_CACHE_IMAGE: &str = "unbound:with-cache";
pub const UNBOUND_WITHOUT_CACHE_IMAGE: &str = "unbound:without-cache";
pub const LETSDANE_IMAGE: &str = "letsdane:latest";
pub const FIREFOX_HAR_IMAGE: &str = "firefox-har:latest";

// Packet capture paths inside the containers
pub const FIREFOX_PCAP_PATH: &str = "/captured/firefox.pcap";
pub const UNBOUND_PCAP_PATH: &str = "/captured/unbound.pcap";
pub const LETSDANE_PCAP_PATH: &str = "/captured/letsdane.pcap";

// Certificate material baked into the letsdane image
pub const LETSDANE_CERT_PATH: &str = "/root/.letsdane/cert.crt";
pub const LETSDANE_KEY_PATH: &str = "/root/.letsdane/cert.key";

/// Executable used for every container operation.
pub const DOCKER_BIN: &str = "docker";

/// Name suffix of the throwaway proxy that warms the resolver cache.
pub const FILL_CACHE_SUFFIX: &str = "-fill-cache";

/// Run directory name format (`YYYY-MM-DD-hh-mm-ss`).
pub const RUN_DIR_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Timestamp format used for the flat HAR CSV export.
pub const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

// Default paths
pub const DEFAULT_RESULT_DIR: &str = "./result/pageloadtime";
pub const DEFAULT_DOMAIN_CSV: &str = "./dataset/test/test-data.csv";
pub const DEFAULT_A_RECORD_CSV: &str = "./dataset/a-record.csv";
pub const DEFAULT_TLSA_RECORD_CSV: &str = "./dataset/tlsa-record.csv";
pub const DEFAULT_COUNTRY_CSV: &str = "./dataset/country-code.csv";
pub const DEFAULT_USAGE_DOMAIN_CSV: &str = "./dataset/usage3-domain.csv";
pub const DEFAULT_MERGED_DOMAIN_CSV: &str = "./dataset/merged-domain.csv";

/// TLSA certificate usage kept by the domain list filter (DANE-EE)
pub const DEFAULT_TLSA_USAGE: u8 = 3;
pub const DEFAULT_DANE_CHECK_OUTPUT: &str = "./analysis/dane-validation-all-success.csv";
pub const DEFAULT_STATUS_CODE_OUTPUT: &str = "./analysis/status-code-info.csv";
pub const DEFAULT_ZDNS_PATH: &str = "zdns";
pub const DEFAULT_RESOLV_CONF: &str = "resolv.conf";

// Concurrency defaults
pub const DEFAULT_MEASUREMENT_CONCURRENCY: usize = 1;
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 10;
pub const DEFAULT_AGGREGATE_CONCURRENCY: usize = 10;

// Object storage defaults
pub const DEFAULT_STORAGE_PROFILE: &str = "default";
pub const DEFAULT_STORAGE_REGION: &str = "ap-northeast-1";
pub const DEFAULT_STORAGE_BUCKET: &str = "pageloadtime-results";

/// IP geolocation endpoint; the address is appended as the `ip` query parameter.
pub const IP_LOCATION_ENDPOINT: &str = "https://api.iplocation.net/";

// Retry strategy (object storage only)
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 1000;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 20;
/// Maximum number of retries after the initial attempt
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// CSV headers
pub const MEASUREMENT_CSV_HEADER: [&str; 19] = [
    "Status",
    "Method",
    "Domain",
    "File",
    "MIMEType",
    "CompressedSize(B)",
    "UnCompressedSize(B)",
    "PageLoadStartedDateTime",
    "StartedDateTime",
    "Queued(ms)",
    "Started(ms)",
    "Downloaded(ms)",
    "Blocked(ms)",
    "DNSResolution(ms)",
    "Connecting(ms)",
    "TLSSetup(ms)",
    "Sending(ms)",
    "Waiting(ms)",
    "Receiving(ms)",
];
pub const DANE_VALIDATION_CSV_HEADER: [&str; 3] = ["Host", "DANEValidated", "Error"];
pub const PAGE_LOAD_SUMMARY_HEADER: [&str; 4] = ["domain", "pageLoadTime", "cache", "dane"];
pub const DANE_SUCCESS_HEADER: [&str; 7] = [
    "measurementID",
    "domain",
    "cache",
    "dane",
    "dane-success-count",
    "total",
    "dane-all-success",
];
/// Status-tally columns before the optional `502` column.
pub const STATUS_TALLY_LEADING_HEADER: [&str; 9] = [
    "measurementID",
    "domain",
    "cache",
    "dane",
    "1xx",
    "2xx",
    "3xx",
    "4xx",
    "5xx",
];
pub const STATUS_TALLY_502_COLUMN: &str = "502";
pub const STATUS_TALLY_TRAILING_HEADER: [&str; 2] = ["xxx", "total"];
pub const A_RECORD_CSV_HEADER: [&str; 2] = ["domain", "ip"];
pub const TLSA_RECORD_CSV_HEADER: [&str; 8] = [
    "domain",
    "host",
    "class",
    "type",
    "usage",
    "selector",
    "matching_type",
    "certificate",
];
pub const COUNTRY_CSV_HEADER: [&str; 2] = ["domain", "country_code"];

/// Timeout for one IP geolocation request in seconds
pub const GEO_REQUEST_TIMEOUT_SECS: u64 = 10;
