//! Cloudflare v4 DNS API implementation of the provider boundary.

pub mod client;
pub mod error;
pub mod types;


pub use client::CloudflareProvider;
pub use error::CloudflareError;

use crate::core::provider::DnsProvider;
use crate::core::record::RecordRef;
use crate::error::Error;
use crate::providers::cloudflare::error::map_error;
use crate::providers::cloudflare::types::DnsRecord;
use async_trait::async_trait;
use std::net::IpAddr;

fn to_record_ref(record: &DnsRecord) -> Result<RecordRef, Error> {
    let ip: IpAddr = record.content.parse().map_err(|_| {
        Error::Provider(format!(
            "Record {} has non-IP content: {}",
            record.id, record.content
        ))
    })?;
    Ok(RecordRef::new(record.id.clone(), ip))
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    fn name(&self) -> &str {
        "cloudflare"
    }

    async fn create_record(&self, ip: IpAddr) -> Result<String, Error> {
        self.create(ip).await.map(|r| r.id).map_err(map_error)
    }

    async fn update_record(&self, id: &str, ip: IpAddr) -> Result<(), Error> {
        self.update(id, ip).await.map(|_| ()).map_err(map_error)
    }

    async fn delete_record(&self, id: &str) -> Result<(), Error> {
        self.delete(id).await.map(|_| ()).map_err(map_error)
    }

    async fn list_records(&self) -> Result<Vec<RecordRef>, Error> {
        let records = self.list().await.map_err(map_error)?;
        // Other record types may coexist at the hostname; only address
        // records belong to this tool.
        records
            .iter()
            .filter(|r| matches!(r.record_type.as_str(), "A" | "AAAA"))
            .map(to_record_ref)
            .collect()
    }
}
