// Shared fixture builders for the integration tests.

use std::path::{Path, PathBuf};

use serde_json::json;

/// A Firefox-style HAR document with one page and one entry per
/// `(status, url)`.
#[allow(dead_code)]
pub fn har_document(on_load: i64, entries: &[(i64, &str)]) -> String {
    let entries: Vec<serde_json::Value> = entries
        .iter()
        .enumerate()
        .map(|(i, (status, url))| {
            json!({
                "pageref": "page_1",
                "startedDateTime": format!("2024-01-01T00:00:00.{:03}Z", 10 * (i + 1)),
                "time": 40,
                "request": {"method": "GET", "url": url},
                "response": {
                    "status": status,
                    "bodySize": 100,
                    "content": {"size": 400, "mimeType": "text/html", "text": "<html></html>"}
                },
                "timings": {"blocked": 5, "dns": 1, "connect": 2, "ssl": 3, "send": 1, "wait": 20, "receive": 8}
            })
        })
        .collect();
    json!({
        "log": {
            "version": "1.2",
            "creator": {"name": "Firefox", "version": "128.0"},
            "pages": [{
                "startedDateTime": "2024-01-01T00:00:00.000Z",
                "id": "page_1",
                "title": "fixture",
                "pageTimings": {"onContentLoad": on_load / 2, "onLoad": on_load}
            }],
            "entries": entries
        }
    })
    .to_string()
}

/// A proxy validation log with one row per `(host, validated)`.
#[allow(dead_code)]
pub fn validation_log(rows: &[(&str, bool)]) -> String {
    let mut out = String::from("Host,DANEValidated,Error\n");
    for (host, validated) in rows {
        let error = if *validated { "" } else { "tlsa lookup failed" };
        out.push_str(&format!("{host},{validated},{error}\n"));
    }
    out
}

/// Writes a header-less domain list into `dir`.
#[allow(dead_code)]
pub fn write_domain_list(dir: &Path, domains: &[&str]) -> PathBuf {
    let path = dir.join("domains.csv");
    let mut body = domains.join("\n");
    body.push('\n');
    std::fs::write(&path, body).expect("Failed to write domain list");
    path
}
