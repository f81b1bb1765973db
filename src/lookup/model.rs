//! zdns JSON output model.
//!
//! Only the fields the CSV exports use are typed; everything is optional so
//! that an error response (no `data`) still decodes.

use serde::{Deserialize, Serialize};

/// One line of zdns output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZdnsResponse {
    pub name: String,
    /// `NOERROR`, `NXDOMAIN`, `TIMEOUT`, ...
    pub status: String,
    pub timestamp: String,
    pub data: ZdnsData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZdnsData {
    pub answers: Vec<ZdnsAnswer>,
    pub additionals: Vec<ZdnsAdditional>,
    pub protocol: String,
    pub resolver: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZdnsAdditional {
    pub flags: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub udpsize: u32,
    pub version: u32,
}

/// One answer record. `answer` is set for address records, the TLSA fields
/// for TLSA records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZdnsAnswer {
    pub name: String,
    pub class: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub ttl: u32,
    pub answer: String,
    #[serde(alias = "usage")]
    pub cert_usage: u8,
    pub selector: u8,
    pub matching_type: u8,
    pub certificate: String,
}

impl ZdnsResponse {
    /// Answers of the given type (`"A"`, `"TLSA"`), in response order.
    pub fn answers_of_type<'a>(
        &'a self,
        record_type: &'a str,
    ) -> impl Iterator<Item = &'a ZdnsAnswer> + 'a {
        self.data
            .answers
            .iter()
            .filter(move |answer| answer.record_type == record_type)
    }
}

/// The lookup result of one domain.
///
/// A failed lookup carries a default, answer-less response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRecord {
    pub domain: String,
    pub response: ZdnsResponse,
}
