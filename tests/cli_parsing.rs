//! Tests for command-line parsing of every program.

use std::path::PathBuf;

use clap::Parser;
use dane_webperf::config::{
    IpCountryOpt, LogLevel, LookupConfig, LookupOpt, MeasurementConfig, PageLoadOpt,
    StatusCodeOpt, DEFAULT_A_RECORD_CSV, DEFAULT_COUNTRY_CSV, DEFAULT_DOMAIN_CSV,
    DEFAULT_STATUS_CODE_OUTPUT,
};

#[test]
fn test_pageload_defaults() {
    let opt = PageLoadOpt::try_parse_from(["pageloadtime"]).expect("Defaults should parse");
    assert!(matches!(opt.logging.log_level, LogLevel::Info));
    let config = MeasurementConfig::from(opt);
    assert!(!config.cache);
    assert!(!config.dane);
    assert_eq!(config.range.first, 1);
    assert_eq!(config.input_csv, PathBuf::from(DEFAULT_DOMAIN_CSV));
    assert!(!config.sub_dir_name.is_empty());
}

#[test]
fn test_unknown_record_type_rejected() {
    assert!(LookupOpt::try_parse_from(["zdns_lookup", "--record-type", "mx"]).is_err());
    let opt = LookupOpt::try_parse_from(["zdns_lookup", "--record-type", "a"])
        .expect("A records should parse");
    assert_eq!(
        LookupConfig::from(opt).output_csv,
        PathBuf::from(DEFAULT_A_RECORD_CSV)
    );
}

#[test]
fn test_status_code_defaults() {
    let opt = StatusCodeOpt::try_parse_from(["status_code_info", "--measurement-id", "m1"])
        .expect("Should parse");
    assert!(!opt.split_502);
    assert_eq!(opt.output_file, PathBuf::from(DEFAULT_STATUS_CODE_OUTPUT));
    assert_eq!(opt.storage.profile, "default");
}

#[test]
fn test_ip_country_defaults() {
    let opt = IpCountryOpt::try_parse_from(["ip_country", "--log-level", "debug"])
        .expect("Should parse");
    assert!(matches!(opt.logging.log_level, LogLevel::Debug));
    assert_eq!(opt.input_csv, PathBuf::from(DEFAULT_A_RECORD_CSV));
    assert_eq!(opt.output_csv, PathBuf::from(DEFAULT_COUNTRY_CSV));
}
