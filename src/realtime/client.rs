use std::time::Duration;

use reqwest::Url;
use tracing::warn;

use super::types::{
    decode_active_routes, decode_stop_arrivals, decode_vehicle_feed, VehicleSampleWire,
};
use crate::arrivals::ArrivalRecord;
use crate::error::{Error, Result};

const REQUEST_TIMEOUT_SECS: u64 = 8;

/// Thin JSON client for the schedule backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "HTTP client setup failed, falling back to defaults without a timeout");
                reqwest::Client::new()
            });

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let invalid = |reason: String| Error::InvalidUrl {
            url: self.base_url.clone(),
            reason,
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_body(&self, segments: &[&str]) -> Result<String> {
        let url = self.endpoint(segments)?;
        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }

    pub async fn fetch_vehicles(&self) -> Result<Vec<VehicleSampleWire>> {
        let body = self.get_body(&["api", "vehicles"]).await?;
        decode_vehicle_feed(&body)
    }

    pub async fn fetch_stop_arrivals(&self, stop_id: &str) -> Result<Vec<ArrivalRecord>> {
        let body = self.get_body(&["api", "stop", stop_id]).await?;
        decode_stop_arrivals(&body)
    }

    pub async fn fetch_active_routes(&self) -> Result<Vec<String>> {
        let body = self.get_body(&["api", "active_routes"]).await?;
        decode_active_routes(&body)
    }
}
