use serde::{Deserialize, Serialize};
use std::net::IpAddr;

#[derive(Serialize, Debug)]
pub struct RecordRequest {
    pub content: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub ttl: u32,
    pub proxied: bool,
}

impl RecordRequest {
    pub fn new(name: &str, ip: IpAddr, ttl: u32) -> Self {
        let record_type = match ip {
            IpAddr::V4(_) => "A",
            IpAddr::V6(_) => "AAAA",
        };
        Self {
            content: ip.to_string(),
            name: name.to_string(),
            record_type: record_type.to_string(),
            ttl,
            proxied: false,
        }
    }
}

/// Cloudflare v4 response envelope. A 2xx status alone is not success; the
/// body carries its own flag.
#[derive(Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    pub result: Option<T>,
}

#[derive(Deserialize, Debug)]
pub struct ApiMessage {
    pub code: i64,
    pub message: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DnsRecord {
    pub id: String,
    #[allow(dead_code)]
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: String,
    #[allow(dead_code)]
    pub ttl: Option<u32>,
}

#[derive(Deserialize, Debug)]
pub struct DeletedRecord {
    #[allow(dead_code)]
    pub id: String,
}
