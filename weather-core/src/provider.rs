use crate::{
    Config, GeoSuggestion, UpstreamReply, WeatherError, WeatherQuery, WeatherSnapshot,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// The external weather/geocoding service, as seen by the proxy.
///
/// Every call returns the upstream status and JSON body untouched.
#[async_trait]
pub trait WeatherUpstream: Send + Sync + Debug {
    async fn current(&self, query: &WeatherQuery) -> Result<UpstreamReply, WeatherError>;

    async fn geocode_direct(&self, text: &str, limit: u8) -> Result<UpstreamReply, WeatherError>;

    async fn geocode_reverse(
        &self,
        lat: f64,
        lon: f64,
        limit: u8,
    ) -> Result<UpstreamReply, WeatherError>;
}

/// Where the dashboard gets its current conditions from.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, WeatherError>;
}

/// Forward and reverse geocoding for the search box and the map.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn search(&self, text: &str, limit: u8) -> Result<Vec<GeoSuggestion>, WeatherError>;

    async fn reverse(&self, lat: f64, lon: f64, limit: u8)
    -> Result<Vec<GeoSuggestion>, WeatherError>;
}

/// Construct the upstream provider from config. Fails when no API key is set.
pub fn upstream_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherUpstream>> {
    let api_key = config.require_api_key()?;

    Ok(Arc::new(OpenWeatherProvider::with_base_url(
        api_key.to_owned(),
        &config.upstream.base_url,
    )))
}
