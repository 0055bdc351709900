use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// One remote A record previously created by this tool. The id is the
/// provider-assigned identifier and is the only durable link between the
/// local store and the remote zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    #[serde(rename = "Record ID")]
    pub id: String,
    #[serde(rename = "IP")]
    pub ip: IpAddr,
}

impl RecordRef {
    pub fn new(id: impl Into<String>, ip: IpAddr) -> Self {
        Self { id: id.into(), ip }
    }
}
