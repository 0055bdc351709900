use crate::error::Error;
use std::env;

const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client/v4";
const DEFAULT_TTL: u32 = 60;

/// Cloudflare credential pair. Which variant is used depends on which
/// environment variables are present; the token form is preferred.
#[derive(Clone)]
pub enum Auth {
    Token(String),
    Key { email: String, key: String },
}

#[derive(Clone)]
pub struct Config {
    pub api_url: String,
    pub zone_id: String,
    pub record_name: String,
    pub ttl: u32,
    pub auth: Auth,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        let auth = match env::var("CLOUDFLARE_API_TOKEN") {
            Ok(token) if !token.is_empty() => Auth::Token(token),
            _ => {
                let email = env::var("CLOUDFLARE_API_EMAIL").map_err(|_| {
                    Error::Config(
                        "Set CLOUDFLARE_API_TOKEN, or CLOUDFLARE_API_EMAIL and CLOUDFLARE_API_KEY"
                            .to_string(),
                    )
                })?;
                let key = env::var("CLOUDFLARE_API_KEY").map_err(|_| {
                    Error::Config("CLOUDFLARE_API_KEY is required with CLOUDFLARE_API_EMAIL".to_string())
                })?;
                Auth::Key { email, key }
            }
        };

        Ok(Config {
            api_url: env::var("CLOUDFLARE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            zone_id: env::var("CLOUDFLARE_ZONE_ID")
                .map_err(|_| Error::Config("CLOUDFLARE_ZONE_ID is required".to_string()))?,
            record_name: env::var("CLOUDFLARE_DOMAIN_NAME")
                .map_err(|_| Error::Config("CLOUDFLARE_DOMAIN_NAME is required".to_string()))?,
            ttl: env::var("DNS_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TTL),
            auth,
        })
    }
}
