// Lookup module tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::config::DomainRange;
use crate::domain::DomainRecord;
use crate::error_handling::{CommandError, CsvDecodeError};

/// Answers zdns invocations by query name; unknown names exit non-zero.
struct ScriptedZdns {
    outputs: HashMap<String, String>,
    seen: Mutex<Vec<Invocation>>,
}

impl ScriptedZdns {
    fn new(outputs: &[(&str, &str)]) -> Self {
        ScriptedZdns {
            outputs: outputs
                .iter()
                .map(|(name, json)| (name.to_string(), json.to_string()))
                .collect(),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CommandRunner for ScriptedZdns {
    async fn output(&self, invocation: &Invocation) -> Result<Vec<u8>, CommandError> {
        self.seen.lock().unwrap().push(invocation.clone());
        let stdin = invocation.stdin.clone().unwrap_or_default();
        let name = String::from_utf8_lossy(&stdin).trim().to_string();
        match self.outputs.get(&name) {
            Some(json) => Ok(format!("{json}\n").into_bytes()),
            None => Err(CommandError::Failed {
                command: invocation.to_string(),
                status: "exit status: 1".to_string(),
                stderr: "resolution failed".to_string(),
            }),
        }
    }

    async fn spawn_detached(&self, _invocation: &Invocation) -> Result<(), CommandError> {
        Ok(())
    }
}

const A_RESPONSE: &str = r#"{"data":{"answers":[{"answer":"www.example.com.cdn.net","class":"IN","name":"example.com","ttl":300,"type":"CNAME"},{"answer":"93.184.216.34","class":"IN","name":"example.com","ttl":300,"type":"A"},{"answer":"93.184.216.35","class":"IN","name":"example.com","ttl":300,"type":"A"}],"protocol":"udp","resolver":"127.0.0.1:53"},"name":"example.com","status":"NOERROR","timestamp":"2024-01-01T00:00:00Z"}"#;

const TLSA_RESPONSE: &str = r#"{"data":{"answers":[{"cert_usage":3,"certificate":"abcdef","class":"IN","matching_type":1,"name":"_443._tcp.dane.org","selector":1,"ttl":3600,"type":"TLSA"},{"answer":"x","class":"IN","name":"_443._tcp.dane.org","ttl":3600,"type":"RRSIG"}]},"name":"_443._tcp.dane.org","status":"NOERROR"}"#;

fn record(domain: &str, json: &str) -> LookupRecord {
    LookupRecord {
        domain: domain.to_string(),
        response: serde_json::from_str(json).unwrap(),
    }
}

#[test]
fn test_invocation_arguments() {
    let zdns = Zdns {
        program: PathBuf::from("./zdns"),
        conf_file: PathBuf::from("resolv.conf"),
        record_type: RecordType::Tlsa,
    };
    let invocation = zdns.invocation("dane.org");
    assert_eq!(invocation.program, "./zdns");
    assert_eq!(invocation.args, ["TLSA", "--conf-file", "resolv.conf"]);
    assert_eq!(
        invocation.stdin.as_deref(),
        Some(b"_443._tcp.dane.org\n".as_slice())
    );
}

#[test]
fn test_decode_error_response_without_data() {
    let response: ZdnsResponse =
        serde_json::from_str(r#"{"name":"nx.example","status":"NXDOMAIN"}"#).unwrap();
    assert_eq!(response.status, "NXDOMAIN");
    assert!(response.data.answers.is_empty());
}

#[test]
fn test_a_csv_uses_first_a_answer() {
    let records = vec![
        record("example.com", A_RESPONSE),
        LookupRecord {
            domain: "empty.org".to_string(),
            response: ZdnsResponse::default(),
        },
    ];
    let mut out = Vec::new();
    write_a_records(&mut out, &records).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "domain,ip\nexample.com,93.184.216.34\n"
    );
}

#[test]
fn test_tlsa_csv_keeps_only_tlsa_answers() {
    let records = vec![record("dane.org", TLSA_RESPONSE)];
    let mut out = Vec::new();
    write_tlsa_records(&mut out, &records).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "domain,host,class,type,usage,selector,matching_type,certificate\n\
         dane.org,_443._tcp.dane.org,IN,TLSA,3,1,1,abcdef\n"
    );
}

const TLSA_EXPORT_HEADER: &str =
    "domain,host,class,type,usage,selector,matching_type,certificate\n";

fn domain_names(records: &[DomainRecord]) -> Vec<&str> {
    records.iter().map(|r| r.domain.as_str()).collect()
}

#[test]
fn test_usage_domains_filter_dedupe_and_sort() {
    let input = format!(
        "{TLSA_EXPORT_HEADER}\
         zeta.org,_443._tcp.zeta.org,IN,TLSA,3,1,1,aa\n\
         alpha.net,_443._tcp.alpha.net,IN,TLSA,2,0,1,bb\n\
         beta.com,_443._tcp.beta.com,IN,TLSA,3,1,1,cc\n\
         zeta.org,_443._tcp.zeta.org,IN,TLSA,3,1,2,dd\n\
         gamma.io,_443._tcp.gamma.io,IN,TLSA,1,0,0,ee\n\
         alpha.net,_443._tcp.alpha.net,IN,TLSA,3,0,1,ff\n"
    );
    let domains = read_usage_domains(input.as_bytes(), 3).unwrap();
    assert_eq!(domain_names(&domains), vec!["alpha.net", "beta.com", "zeta.org"]);

    let domains = read_usage_domains(input.as_bytes(), 2).unwrap();
    assert_eq!(domain_names(&domains), vec!["alpha.net"]);

    assert!(read_usage_domains(input.as_bytes(), 0).unwrap().is_empty());
}

#[test]
fn test_usage_domains_empty_input() {
    assert!(read_usage_domains("".as_bytes(), 3).unwrap().is_empty());
    assert!(read_usage_domains(TLSA_EXPORT_HEADER.as_bytes(), 3)
        .unwrap()
        .is_empty());
}

#[test]
fn test_usage_domains_reads_own_export() {
    let records = vec![record("dane.org", TLSA_RESPONSE)];
    let mut out = Vec::new();
    write_tlsa_records(&mut out, &records).unwrap();
    let domains = read_usage_domains(out.as_slice(), 3).unwrap();
    assert_eq!(domain_names(&domains), vec!["dane.org"]);
}

#[test]
fn test_usage_domains_rejects_header_less_list() {
    let result = read_usage_domains("a.com\nb.com\n".as_bytes(), 3);
    assert!(matches!(result, Err(CsvDecodeError::HeaderMismatch { .. })));
}

#[tokio::test]
async fn test_lookup_decodes_output() {
    let runner = ScriptedZdns::new(&[("example.com", A_RESPONSE)]);
    let zdns = Zdns {
        program: PathBuf::from("zdns"),
        conf_file: PathBuf::from("resolv.conf"),
        record_type: RecordType::A,
    };
    let response = zdns.lookup(&runner, "example.com").await.unwrap();
    assert_eq!(response.answers_of_type("A").count(), 2);

    let err = zdns.lookup(&runner, "missing.org").await.unwrap_err();
    assert!(matches!(err, LookupError::Command(_)));
}

#[tokio::test]
async fn test_lookup_rejects_malformed_json() {
    let runner = ScriptedZdns::new(&[("example.com", "not json")]);
    let zdns = Zdns {
        program: PathBuf::from("zdns"),
        conf_file: PathBuf::from("resolv.conf"),
        record_type: RecordType::A,
    };
    let err = zdns.lookup(&runner, "example.com").await.unwrap_err();
    assert!(matches!(err, LookupError::Decode(_)));
}

#[tokio::test]
async fn test_run_lookup_sorts_and_keeps_failures() {
    let dir = tempfile::tempdir().unwrap();
    let input_csv = dir.path().join("domains.csv");
    std::fs::write(&input_csv, "zeta.org\nexample.com\nbroken.net\n").unwrap();
    let output_csv = dir.path().join("a-record.csv");

    let zeta = A_RESPONSE.replace("93.184.216.34", "10.0.0.1");
    let runner = Arc::new(ScriptedZdns::new(&[
        ("example.com", A_RESPONSE),
        ("zeta.org", zeta.as_str()),
    ]));
    let stats = Arc::new(ProcessingStats::new());
    let config = LookupConfig {
        record_type: RecordType::A,
        range: DomainRange::default(),
        input_csv,
        output_csv: output_csv.clone(),
        concurrency: 2,
        ..Default::default()
    };

    let report = run_lookup(&config, runner.clone(), Arc::clone(&stats))
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.failed, vec!["broken.net"]);
    assert_eq!(stats.get_error_count(ErrorType::ZdnsCommandError), 1);
    assert_eq!(runner.seen.lock().unwrap().len(), 3);
    assert_eq!(
        std::fs::read_to_string(&output_csv).unwrap(),
        "domain,ip\nexample.com,93.184.216.34\nzeta.org,10.0.0.1\n"
    );
}

#[tokio::test]
async fn test_run_lookup_honors_range() {
    let dir = tempfile::tempdir().unwrap();
    let input_csv = dir.path().join("domains.csv");
    std::fs::write(&input_csv, "a.org\nexample.com\nc.org\n").unwrap();

    let runner = Arc::new(ScriptedZdns::new(&[("example.com", A_RESPONSE)]));
    let config = LookupConfig {
        record_type: RecordType::A,
        range: DomainRange {
            first: 2,
            last: Some(2),
        },
        input_csv,
        output_csv: dir.path().join("out.csv"),
        ..Default::default()
    };

    let report = run_lookup(&config, runner.clone(), Arc::new(ProcessingStats::new()))
        .await
        .unwrap();
    assert_eq!(report.total, 1);
    assert!(report.failed.is_empty());
}
