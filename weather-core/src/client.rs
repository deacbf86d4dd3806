//! HTTP client for the dashboard proxy.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    error::WeatherError,
    model::{GeoSuggestion, WeatherQuery, WeatherSnapshot},
    provider::{Geocoder, WeatherSource, openweather::parse_current},
};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Talks to `weather-server`; never holds the upstream API key.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    base_url: String,
    http: Client,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|source| WeatherError::Network { endpoint: "proxy", source })?;

        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), http })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let res = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(params)
            .send()
            .await
            .map_err(|source| WeatherError::Network { endpoint, source })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| WeatherError::Network { endpoint, source })?;

        if !status.is_success() {
            debug!(endpoint, status = status.as_u16(), body = %truncate_body(&body), "proxy rejected request");
            return Err(WeatherError::Status { endpoint, status: status.as_u16() });
        }

        serde_json::from_str(&body).map_err(|source| WeatherError::Parse { what: endpoint, source })
    }
}

#[async_trait]
impl WeatherSource for ProxyClient {
    #[instrument(skip(self, query), fields(query = %query))]
    async fn current(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, WeatherError> {
        let body = self.get_json("weather", "/weather", &query.to_pairs()).await?;
        parse_current(body)
    }
}

#[async_trait]
impl Geocoder for ProxyClient {
    async fn search(&self, text: &str, limit: u8) -> Result<Vec<GeoSuggestion>, WeatherError> {
        let params = [("q", text.to_string()), ("limit", limit.to_string())];
        self.get_json("geocode", "/geocode", &params).await
    }

    async fn reverse(
        &self,
        lat: f64,
        lon: f64,
        limit: u8,
    ) -> Result<Vec<GeoSuggestion>, WeatherError> {
        let params = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("limit", limit.to_string()),
        ];
        self.get_json("reverse geocode", "/geocode/reverse", &params).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
