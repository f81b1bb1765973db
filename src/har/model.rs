//! HAR 1.2 document types.
//!
//! Field names follow the HAR 1.2 JSON layout. Optional members default
//! when absent. Timings keep the numbers as recorded; size fields accept
//! integral or floating JSON numbers.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// Value of a timing that does not apply to the request.
pub const NOT_MEASURED: f64 = -1.0;

/// Value of a size that is not known.
const UNKNOWN_SIZE: i64 = -1;

fn not_measured() -> f64 {
    NOT_MEASURED
}

/// Reads a timing in milliseconds; `null` means not measured.
fn lenient_millis<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(NOT_MEASURED))
}

/// Reads a JSON number as whole bytes (or a status code), truncating floats.
fn lenient_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Number>::deserialize(deserializer)? {
        Some(Number::Int(v)) => v,
        Some(Number::Float(v)) => v.trunc() as i64,
        None => UNKNOWN_SIZE,
    })
}

/// Top-level HAR object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Har {
    pub log: Log,
}

/// Main HAR log object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Log {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub creator: Creator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<Creator>,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Creator/Browser information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Creator {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename = "startedDateTime")]
    pub started_date_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "pageTimings", default)]
    pub page_timings: PageTimings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Milliseconds since the page started loading, `-1` when not available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageTimings {
    #[serde(
        rename = "onContentLoad",
        default = "not_measured",
        deserialize_with = "lenient_millis"
    )]
    pub on_content_load: f64,
    #[serde(
        rename = "onLoad",
        default = "not_measured",
        deserialize_with = "lenient_millis"
    )]
    pub on_load: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Default for PageTimings {
    fn default() -> Self {
        PageTimings {
            on_content_load: NOT_MEASURED,
            on_load: NOT_MEASURED,
            comment: None,
        }
    }
}

/// Individual HTTP transaction entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pageref: Option<String>,
    #[serde(rename = "startedDateTime")]
    pub started_date_time: DateTime<FixedOffset>,
    /// Total elapsed time of the request in milliseconds
    #[serde(default, deserialize_with = "lenient_millis")]
    pub time: f64,
    #[serde(default)]
    pub request: Request,
    #[serde(default)]
    pub response: Response,
    #[serde(default)]
    pub cache: Cache,
    #[serde(default)]
    pub timings: Timings,
    #[serde(
        rename = "serverIPAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub server_ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(
        rename = "_securityState",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub security_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Entry {
    /// Whether `time` equals the sum of the measured phases.
    pub fn timings_consistent(&self) -> bool {
        (self.time - self.timings.total()).abs() < 1e-6
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "httpVersion", default)]
    pub http_version: String,
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    #[serde(default)]
    pub headers: Vec<NameValue>,
    #[serde(rename = "queryString", default)]
    pub query_string: Vec<NameValue>,
    #[serde(rename = "postData", default, skip_serializing_if = "Option::is_none")]
    pub post_data: Option<PostData>,
    #[serde(rename = "headersSize", default, deserialize_with = "lenient_number")]
    pub headers_size: i64,
    #[serde(rename = "bodySize", default, deserialize_with = "lenient_number")]
    pub body_size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, deserialize_with = "lenient_number")]
    pub status: i64,
    #[serde(rename = "statusText", default)]
    pub status_text: String,
    #[serde(rename = "httpVersion", default)]
    pub http_version: String,
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    #[serde(default)]
    pub headers: Vec<NameValue>,
    #[serde(default)]
    pub content: Content,
    #[serde(rename = "redirectURL", default)]
    pub redirect_url: String,
    #[serde(rename = "headersSize", default, deserialize_with = "lenient_number")]
    pub headers_size: i64,
    /// Bytes received on the wire (compressed)
    #[serde(rename = "bodySize", default, deserialize_with = "lenient_number")]
    pub body_size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cookie {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(rename = "httpOnly", default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Header or query string parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameValue {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostData {
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(
        rename = "contentType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Response body details
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    /// Decoded (uncompressed) body length
    #[serde(default, deserialize_with = "lenient_number")]
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<i64>,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cache {
    #[serde(
        rename = "beforeRequest",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub before_request: Option<CacheState>,
    #[serde(
        rename = "afterRequest",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub after_request: Option<CacheState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(rename = "lastAccess", default, skip_serializing_if = "Option::is_none")]
    pub last_access: Option<String>,
    #[serde(rename = "eTag", default)]
    pub e_tag: String,
    #[serde(rename = "hitCount", default, deserialize_with = "lenient_number")]
    pub hit_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Request phase durations in milliseconds, `-1` when a phase does not apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timings {
    #[serde(default = "not_measured", deserialize_with = "lenient_millis")]
    pub blocked: f64,
    #[serde(default = "not_measured", deserialize_with = "lenient_millis")]
    pub dns: f64,
    #[serde(default = "not_measured", deserialize_with = "lenient_millis")]
    pub connect: f64,
    #[serde(default = "not_measured", deserialize_with = "lenient_millis")]
    pub send: f64,
    #[serde(default = "not_measured", deserialize_with = "lenient_millis")]
    pub wait: f64,
    #[serde(default = "not_measured", deserialize_with = "lenient_millis")]
    pub receive: f64,
    /// TLS negotiation, already included in `connect`
    #[serde(default = "not_measured", deserialize_with = "lenient_millis")]
    pub ssl: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            blocked: NOT_MEASURED,
            dns: NOT_MEASURED,
            connect: NOT_MEASURED,
            send: NOT_MEASURED,
            wait: NOT_MEASURED,
            receive: NOT_MEASURED,
            ssl: NOT_MEASURED,
            comment: None,
        }
    }
}

impl Timings {
    /// Sum of the measured phases. `ssl` is part of `connect` and not added.
    pub fn total(&self) -> f64 {
        [
            self.blocked,
            self.dns,
            self.connect,
            self.send,
            self.wait,
            self.receive,
        ]
        .iter()
        .filter(|&&phase| phase != NOT_MEASURED)
        .sum()
    }
}
