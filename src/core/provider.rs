use crate::core::record::RecordRef;
use crate::error::Error;
use async_trait::async_trait;
use std::net::IpAddr;

/// Remote DNS API boundary. All four operations are single network calls
/// against the configured zone and hostname; retry policy, if any, belongs
/// to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DnsProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Creates one A record with the given content and returns the
    /// provider-assigned record id.
    async fn create_record(&self, ip: IpAddr) -> Result<String, Error>;

    /// Sets the content of the identified record to the given ip.
    async fn update_record(&self, id: &str, ip: IpAddr) -> Result<(), Error>;

    /// Removes the identified record.
    async fn delete_record(&self, id: &str) -> Result<(), Error>;

    /// Lists the records currently present remotely for the managed
    /// hostname. Used as a consistency check against the local store.
    async fn list_records(&self) -> Result<Vec<RecordRef>, Error>;
}
