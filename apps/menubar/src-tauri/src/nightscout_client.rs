use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;

use crate::error::FetchError;
use crate::refresh::ReadingSource;
use crate::types::RemoteProperties;

const PROPERTIES_PATH: &str = "/api/v2/properties";

/// Kept below the default refresh interval so a hung request
/// cannot hold the refresh guard across many ticks.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// HTTP client for the Nightscout properties API
pub struct NightscoutClient {
    client: Client,
}

impl NightscoutClient {
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
        })
    }

    /// GET /api/v2/properties on a Nightscout site
    pub async fn get_properties(&self, base_url: &str) -> Result<RemoteProperties, FetchError> {
        let url = properties_url(base_url);
        let resp = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl ReadingSource for NightscoutClient {
    async fn fetch(&self, base_url: &str) -> Result<RemoteProperties, FetchError> {
        self.get_properties(base_url).await
    }
}

fn properties_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), PROPERTIES_PATH)
}
