use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::net::IpAddr;
use std::time::Duration;

use crate::config::{Auth, Config};
use crate::providers::cloudflare::error::CloudflareError;
use crate::providers::cloudflare::types::*;

pub struct CloudflareProvider {
    config: Config,
    client: Client,
}

impl CloudflareProvider {
    pub fn new(config: Config) -> Result<Self, CloudflareError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { config, client })
    }

    fn records_url(&self) -> String {
        format!(
            "{}/zones/{}/dns_records",
            self.config.api_url, self.config.zone_id
        )
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.config.auth {
            Auth::Token(token) => req.bearer_auth(token),
            Auth::Key { email, key } => req.header("X-Auth-Email", email).header("X-Auth-Key", key),
        }
    }

    /// Checks both the HTTP status and the body's success flag before
    /// unwrapping the result payload.
    async fn handle_response<T>(&self, response: reqwest::Response) -> Result<T, CloudflareError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CloudflareError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ApiResponse<T> = response.json().await?;
        if !envelope.success {
            let body = envelope
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CloudflareError::Api {
                status: status.as_u16(),
                body,
            });
        }

        envelope
            .result
            .ok_or_else(|| CloudflareError::InvalidResponse("missing result".to_string()))
    }

    pub async fn create(&self, ip: IpAddr) -> Result<DnsRecord, CloudflareError> {
        let req = RecordRequest::new(&self.config.record_name, ip, self.config.ttl);
        let response = self
            .authorize(self.client.post(self.records_url()))
            .json(&req)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn update(&self, id: &str, ip: IpAddr) -> Result<DnsRecord, CloudflareError> {
        let req = RecordRequest::new(&self.config.record_name, ip, self.config.ttl);
        let response = self
            .authorize(self.client.put(format!("{}/{}", self.records_url(), id)))
            .json(&req)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn delete(&self, id: &str) -> Result<DeletedRecord, CloudflareError> {
        let response = self
            .authorize(self.client.delete(format!("{}/{}", self.records_url(), id)))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn list(&self) -> Result<Vec<DnsRecord>, CloudflareError> {
        let response = self
            .authorize(self.client.get(self.records_url()))
            .query(&[("name", self.config.record_name.as_str())])
            .send()
            .await?;
        self.handle_response(response).await
    }
}
