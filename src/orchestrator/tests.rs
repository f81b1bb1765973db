// Orchestrator tests. Docker is replaced by a runner that records every
// invocation and answers from a closure.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::*;
use crate::config::MeasurementConfig;
use crate::error_handling::{CommandError, ErrorType, ProcessingStats, WarningType};
use crate::variant::MeasurementVariant;

type Responder = Box<dyn Fn(&Invocation) -> Result<Vec<u8>, String> + Send + Sync>;

struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    respond: Responder,
}

impl RecordingRunner {
    fn new(
        respond: impl Fn(&Invocation) -> Result<Vec<u8>, String> + Send + Sync + 'static,
    ) -> Self {
        RecordingRunner {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    /// Arguments of every recorded call, space separated.
    fn commands(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|invocation| invocation.args.join(" "))
            .collect()
    }

    fn answer(&self, invocation: &Invocation) -> Result<Vec<u8>, CommandError> {
        self.calls.lock().unwrap().push(invocation.clone());
        (self.respond)(invocation).map_err(|stderr| CommandError::Failed {
            command: invocation.to_string(),
            status: "exit status: 1".to_string(),
            stderr,
        })
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn output(&self, invocation: &Invocation) -> Result<Vec<u8>, CommandError> {
        self.answer(invocation)
    }

    async fn spawn_detached(&self, invocation: &Invocation) -> Result<(), CommandError> {
        self.answer(invocation).map(drop)
    }
}

const RESOLVER_IP: &str = "172.18.0.2";

fn has_arg(invocation: &Invocation, arg: &str) -> bool {
    invocation.args.iter().any(|a| a == arg)
}

/// Answers `inspect` with the resolver address, everything else with nothing.
fn default_response(invocation: &Invocation) -> Result<Vec<u8>, String> {
    if invocation.args.first().map(String::as_str) == Some("inspect") {
        return Ok(format!("{RESOLVER_IP}\n").into_bytes());
    }
    Ok(Vec::new())
}

fn is_measured_visit(invocation: &Invocation, domain: &str) -> bool {
    has_arg(invocation, &format!("https://{domain}")) && !has_arg(invocation, "--fill_cache_only")
}

fn har_log_bytes() -> Vec<u8> {
    serde_json::json!({
        "version": "1.2",
        "creator": {"name": "Firefox", "version": "128.0"},
        "pages": [{
            "startedDateTime": "2024-01-01T00:00:00.000Z",
            "id": "page_1",
            "pageTimings": {"onContentLoad": 120, "onLoad": 300}
        }],
        "entries": [{
            "startedDateTime": "2024-01-01T00:00:00.050Z",
            "time": 200,
            "request": {"method": "GET", "url": "https://example.com/"},
            "response": {
                "status": 200,
                "bodySize": 512,
                "content": {"size": 2048, "mimeType": "text/html", "text": "<html></html>"}
            },
            "timings": {"blocked": 10, "dns": 20, "connect": 30, "send": 1, "wait": 100, "receive": 39}
        }]
    })
    .to_string()
    .into_bytes()
}

#[test]
fn test_measurement_names() {
    let names = MeasurementNames::new(
        "example.com",
        MeasurementVariant::WithCacheWithDane,
        Path::new("/tmp/run"),
    );
    assert_eq!(names.id, "example.com-with-cache-with-dane");
    assert_eq!(names.network, "network-example.com-with-cache-with-dane");
    assert_eq!(names.resolver, "unbound-example.com-with-cache-with-dane");
    assert_eq!(names.proxy, "letsdane-example.com-with-cache-with-dane");
    assert_eq!(names.browser, "firefox-har-example.com-with-cache-with-dane");
    assert_eq!(
        names.fill_cache_proxy(),
        "letsdane-example.com-with-cache-with-dane-fill-cache"
    );
    assert_eq!(names.output_dir, Path::new("/tmp/run/example.com"));
    assert_eq!(
        names.har_path(),
        Path::new("/tmp/run/example.com/example.com-with-cache-with-dane.har")
    );
    assert_eq!(
        names.capture_path("unbound"),
        Path::new("/tmp/run/example.com/unbound-example.com-with-cache-with-dane.pcap")
    );
}

#[test]
fn test_resolver_image_follows_cache_flag() {
    assert_eq!(resolver_image(true), crate::config::UNBOUND_WITH_CACHE_IMAGE);
    assert_eq!(resolver_image(false), crate::config::UNBOUND_WITHOUT_CACHE_IMAGE);
}

#[tokio::test]
async fn test_cache_dane_command_sequence() {
    let har = har_log_bytes();
    let expected_har = har.clone();
    let runner = RecordingRunner::new(move |invocation| {
        if is_measured_visit(invocation, "example.com") {
            return Ok(har.clone());
        }
        default_response(invocation)
    });
    let docker = DockerCli::new(&runner);
    let names = MeasurementNames::new(
        "example.com",
        MeasurementVariant::WithCacheWithDane,
        Path::new("/tmp/run"),
    );
    let stats = ProcessingStats::new();

    let content = collect_har(&docker, &names, &stats).await.unwrap();
    assert_eq!(content, expected_har);

    let id = "example.com-with-cache-with-dane";
    let dir = "/tmp/run/example.com";
    let proxy_args = |container: &str| {
        format!(
            "run --network network-{id} --name {container} -d letsdane:latest -verbose -r {RESOLVER_IP} -cert /root/.letsdane/cert.crt -key /root/.letsdane/cert.key"
        )
    };
    let expected = vec![
        format!("network create network-{id}"),
        format!("run --rm --network network-{id} --name unbound-{id} -d -p :53/udp -p :53/tcp unbound:with-cache"),
        format!("inspect -f {{{{range.NetworkSettings.Networks}}}}{{{{.IPAddress}}}}{{{{end}}}} unbound-{id}"),
        proxy_args(&format!("letsdane-{id}-fill-cache")),
        format!("run --rm --network network-{id} --name firefox-har-{id}-fill-cache firefox-har:latest https://example.com -ph letsdane-{id}-fill-cache --dane --fill_cache_only"),
        format!("exec -d unbound-{id} tcpdump -i any -w /captured/unbound.pcap"),
        proxy_args(&format!("letsdane-{id}")),
        format!("exec -d letsdane-{id} tcpdump -i any -w /captured/letsdane.pcap"),
        format!("run --network network-{id} --name firefox-har-{id} firefox-har:latest https://example.com -ph letsdane-{id} --dane"),
        // teardown, newest first
        format!("cp firefox-har-{id}:/captured/firefox.pcap {dir}/firefox-{id}.pcap"),
        format!("rm firefox-har-{id}"),
        format!("cp letsdane-{id}:/captured/letsdane.pcap {dir}/letsdane-{id}.pcap"),
        format!("stop letsdane-{id}"),
        format!("rm letsdane-{id}"),
        format!("cp unbound-{id}:/captured/unbound.pcap {dir}/unbound-{id}.pcap"),
        format!("stop letsdane-{id}-fill-cache"),
        format!("rm letsdane-{id}-fill-cache"),
        format!("stop unbound-{id}"),
        format!("network rm network-{id}"),
    ];
    assert_eq!(runner.commands(), expected);
    assert_eq!(stats.total_warnings(), 0);
}

#[tokio::test]
async fn test_without_dane_uses_resolver_address() {
    let runner = RecordingRunner::new(default_response);
    let docker = DockerCli::new(&runner);
    let names = MeasurementNames::new(
        "example.com",
        MeasurementVariant::WithoutCacheWithoutDane,
        Path::new("/tmp/run"),
    );
    let stats = ProcessingStats::new();

    collect_har(&docker, &names, &stats).await.unwrap();

    let commands = runner.commands();
    // no warm-up pass and no proxy without cache and DANE
    assert!(commands.iter().all(|c| !c.contains("fill-cache")));
    assert!(commands.iter().all(|c| !c.contains("letsdane")));
    assert!(commands.contains(&format!(
        "run --network network-{id} --name firefox-har-{id} firefox-har:latest https://example.com -ri {RESOLVER_IP}",
        id = names.id
    )));
    assert!(commands.contains(&format!(
        "run --rm --network network-{id} --name unbound-{id} -d -p :53/udp -p :53/tcp unbound:without-cache",
        id = names.id
    )));
}

#[tokio::test]
async fn test_teardown_continues_after_failed_step() {
    let runner = RecordingRunner::new(|invocation| {
        if invocation.args.first().map(String::as_str) == Some("stop") {
            return Err("no such container".to_string());
        }
        default_response(invocation)
    });
    let docker = DockerCli::new(&runner);
    let names = MeasurementNames::new(
        "example.com",
        MeasurementVariant::WithoutCacheWithoutDane,
        Path::new("/tmp/run"),
    );
    let stats = ProcessingStats::new();

    let result = collect_har(&docker, &names, &stats).await;
    assert!(result.is_ok());

    let commands = runner.commands();
    let teardown: Vec<&String> = commands.iter().skip(5).collect();
    assert_eq!(teardown.len(), 5);
    assert!(teardown[0].starts_with("cp firefox-har-"));
    assert!(teardown[1].starts_with("rm firefox-har-"));
    assert!(teardown[2].starts_with("cp unbound-"));
    assert!(teardown[3].starts_with("stop unbound-"));
    assert_eq!(*teardown[4], format!("network rm {}", names.network));
    assert_eq!(stats.get_warning_count(WarningType::TeardownStepFailed), 1);
}

#[tokio::test]
async fn test_early_failure_releases_only_acquired_resources() {
    let runner = RecordingRunner::new(|invocation| {
        if has_arg(invocation, "unbound:with-cache") {
            return Err("image not found".to_string());
        }
        default_response(invocation)
    });
    let docker = DockerCli::new(&runner);
    let names = MeasurementNames::new(
        "example.com",
        MeasurementVariant::WithCacheWithDane,
        Path::new("/tmp/run"),
    );
    let stats = ProcessingStats::new();

    let result = collect_har(&docker, &names, &stats).await;
    assert!(matches!(result, Err(CommandError::Failed { .. })));

    let commands = runner.commands();
    assert_eq!(commands.len(), 3);
    assert_eq!(commands[0], format!("network create {}", names.network));
    assert!(commands[1].contains(&names.resolver));
    assert_eq!(commands[2], format!("network rm {}", names.network));
}

#[tokio::test]
async fn test_browser_failure_still_releases_browser() {
    let runner = RecordingRunner::new(|invocation| {
        if is_measured_visit(invocation, "example.com") {
            return Err("harness crashed".to_string());
        }
        default_response(invocation)
    });
    let docker = DockerCli::new(&runner);
    let names = MeasurementNames::new(
        "example.com",
        MeasurementVariant::WithoutCacheWithoutDane,
        Path::new("/tmp/run"),
    );
    let stats = ProcessingStats::new();

    let result = collect_har(&docker, &names, &stats).await;
    assert!(result.is_err());
    let commands = runner.commands();
    assert!(commands.contains(&format!("rm {}", names.browser)));
    assert_eq!(
        commands.last().unwrap(),
        &format!("network rm {}", names.network)
    );
}

#[tokio::test]
async fn test_fill_cache_failure_is_ignored() {
    let har = har_log_bytes();
    let runner = RecordingRunner::new(move |invocation| {
        if has_arg(invocation, "--fill_cache_only") {
            return Err("timeout".to_string());
        }
        if is_measured_visit(invocation, "example.com") {
            return Ok(har.clone());
        }
        default_response(invocation)
    });
    let docker = DockerCli::new(&runner);
    let names = MeasurementNames::new(
        "example.com",
        MeasurementVariant::WithCacheWithoutDane,
        Path::new("/tmp/run"),
    );
    let stats = ProcessingStats::new();

    let content = collect_har(&docker, &names, &stats).await.unwrap();
    assert!(!content.is_empty());
    assert_eq!(stats.get_warning_count(WarningType::FillCacheFailed), 1);
}

#[tokio::test]
async fn test_release_all_runs_each_step_once() {
    let runner = RecordingRunner::new(|invocation| {
        if invocation.args == ["stop", "proxy"] {
            return Err("already stopped".to_string());
        }
        Ok(Vec::new())
    });
    let docker = DockerCli::new(&runner);
    let stats = ProcessingStats::new();

    let mut teardown = Teardown::new();
    teardown.push(Release::RemoveNetwork("net".to_string()));
    teardown.push(Release::StopContainer("resolver".to_string()));
    teardown.push(Release::StopAndRemoveContainer("proxy".to_string()));
    assert_eq!(teardown.len(), 3);

    let failures = teardown.release_all(&docker, &stats).await;
    assert_eq!(failures, 1);
    assert!(teardown.is_empty());
    assert_eq!(
        runner.commands(),
        vec!["stop proxy", "rm proxy", "stop resolver", "network rm net"]
    );

    // a drained stack does nothing
    assert_eq!(teardown.release_all(&docker, &stats).await, 0);
    assert_eq!(runner.commands().len(), 4);
}

#[test]
fn test_invocation_display_and_stdin() {
    let invocation = Invocation::new("zdns", ["A", "--conf-file", "resolv.conf"])
        .with_stdin("example.com\n");
    assert_eq!(invocation.to_string(), "zdns A --conf-file resolv.conf");
    assert_eq!(invocation.stdin.as_deref(), Some(b"example.com\n".as_slice()));
}

#[test]
fn test_write_page_load_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.csv");
    let mut times = BTreeMap::new();
    times.insert("b.org".to_string(), None);
    times.insert("a.com".to_string(), Some(1200));

    write_page_load_summary(&path, &times, MeasurementVariant::WithCacheWithoutDane).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        written,
        "domain,pageLoadTime,cache,dane\na.com,1200,true,false\nb.org,,true,false\n"
    );
}

#[tokio::test]
async fn test_run_pageload_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input_csv = dir.path().join("domains.csv");
    std::fs::write(&input_csv, "example.com\nbroken.org\n").unwrap();

    let har = har_log_bytes();
    let runner = Arc::new(RecordingRunner::new(move |invocation| {
        if is_measured_visit(invocation, "example.com") {
            return Ok(har.clone());
        }
        default_response(invocation)
    }));
    let stats = Arc::new(ProcessingStats::new());
    let config = MeasurementConfig {
        cache: false,
        dane: false,
        input_csv,
        output_dir: dir.path().join("result"),
        sub_dir_name: "run".to_string(),
        concurrency: 2,
        ..Default::default()
    };

    let report = run_pageload(&config, runner.clone(), Arc::clone(&stats))
        .await
        .unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, vec!["example.com-without-cache-without-dane"]);
    assert_eq!(report.failed, vec!["broken.org"]);
    assert_eq!(stats.get_error_count(ErrorType::HarEmptyError), 1);

    let run_dir = dir.path().join("result").join("run");
    assert_eq!(
        report.summary_path,
        run_dir.join("pageloadtime-without-cache-without-dane.csv")
    );
    let summary = std::fs::read_to_string(&report.summary_path).unwrap();
    assert_eq!(
        summary,
        "domain,pageLoadTime,cache,dane\nbroken.org,,false,false\nexample.com,300,false,false\n"
    );

    let domain_dir = run_dir.join("example.com");
    let saved = std::fs::read(domain_dir.join("example.com-without-cache-without-dane.har")).unwrap();
    let saved = crate::har::Har::from_slice(&saved).unwrap();
    assert!(saved
        .entries()
        .iter()
        .all(|entry| entry.response.content.text.is_empty()));

    let csv = std::fs::read_to_string(domain_dir.join("example.com-without-cache-without-dane.csv"))
        .unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(run_dir.join("broken.org").is_dir());
}

#[tokio::test]
async fn test_run_pageload_rejects_invalid_range() {
    let dir = tempfile::tempdir().unwrap();
    let input_csv = dir.path().join("domains.csv");
    std::fs::write(&input_csv, "example.com\n").unwrap();

    let runner = Arc::new(RecordingRunner::new(default_response));
    let config = MeasurementConfig {
        input_csv,
        output_dir: dir.path().join("result"),
        range: crate::config::DomainRange {
            first: 2,
            last: Some(5),
        },
        ..Default::default()
    };

    let result = run_pageload(&config, runner.clone(), Arc::new(ProcessingStats::new())).await;
    assert!(result.is_err());
    assert!(runner.commands().is_empty());
}
