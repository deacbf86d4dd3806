use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    config::DEFAULT_UPSTREAM_URL,
    error::WeatherError,
    model::{UpstreamReply, WeatherQuery, WeatherSnapshot},
};

use super::WeatherUpstream;

const CURRENT_PATH: &str = "/data/2.5/weather";
const DIRECT_PATH: &str = "/geo/1.0/direct";
const REVERSE_PATH: &str = "/geo/1.0/reverse";
const ICON_URL: &str = "https://openweathermap.org/img/wn";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

// Keep the key out of logs and panics.
impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider").field("base_url", &self.base_url).finish()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_UPSTREAM_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn fetch(
        &self,
        endpoint: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<UpstreamReply, WeatherError> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            // The request URL carries the key.
            .map_err(|source| WeatherError::Network { endpoint, source: source.without_url() })?;

        let status = res.status().as_u16();
        let text = res
            .text()
            .await
            .map_err(|source| WeatherError::Network { endpoint, source: source.without_url() })?;
        let body: Value =
            serde_json::from_str(&text).map_err(|source| WeatherError::Parse { what: endpoint, source })?;

        debug!(endpoint, status, "upstream replied");
        Ok(UpstreamReply { status, body })
    }
}

#[async_trait]
impl WeatherUpstream for OpenWeatherProvider {
    #[instrument(skip(self, query), fields(query = %query))]
    async fn current(&self, query: &WeatherQuery) -> Result<UpstreamReply, WeatherError> {
        let mut params = match query {
            WeatherQuery::City(city) => vec![("q", city.clone())],
            WeatherQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        };
        params.push(("units", "metric".to_string()));

        self.fetch("OpenWeather current weather", CURRENT_PATH, &params).await
    }

    #[instrument(skip(self))]
    async fn geocode_direct(&self, text: &str, limit: u8) -> Result<UpstreamReply, WeatherError> {
        let params = [("q", text.to_string()), ("limit", limit.to_string())];
        self.fetch("OpenWeather direct geocoding", DIRECT_PATH, &params).await
    }

    #[instrument(skip(self))]
    async fn geocode_reverse(
        &self,
        lat: f64,
        lon: f64,
        limit: u8,
    ) -> Result<UpstreamReply, WeatherError> {
        let params = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("limit", limit.to_string()),
        ];
        self.fetch("OpenWeather reverse geocoding", REVERSE_PATH, &params).await
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwWind {
    speed: Option<f64>,
    deg: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwSys {
    country: String,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwClouds {
    all: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwCoord {
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: Option<f64>,
    sys: OwSys,
    clouds: OwClouds,
    coord: OwCoord,
    timezone: Option<i32>,
}

/// Flatten an OpenWeather current-weather body into a [`WeatherSnapshot`].
pub fn parse_current(body: Value) -> Result<WeatherSnapshot, WeatherError> {
    let parsed: OwCurrentResponse = serde_json::from_value(body)
        .map_err(|source| WeatherError::Parse { what: "weather data", source })?;

    let first = parsed.weather.first().ok_or(WeatherError::NoConditions)?;
    let condition = first.main.clone();
    let icon = if first.icon.is_empty() {
        String::new()
    } else {
        format!("{ICON_URL}/{}@2x.png", first.icon)
    };

    Ok(WeatherSnapshot {
        city: parsed.name,
        country: parsed.sys.country,
        lat: parsed.coord.lat,
        lon: parsed.coord.lon,
        timezone: parsed.timezone,
        temp: parsed.main.temp,
        feels_like: parsed.main.feels_like,
        temp_min: parsed.main.temp_min,
        temp_max: parsed.main.temp_max,
        humidity: parsed.main.humidity,
        pressure: parsed.main.pressure,
        wind_speed: parsed.wind.speed,
        wind_deg: parsed.wind.deg,
        clouds: parsed.clouds.all,
        visibility: parsed.visibility,
        sunrise: parsed.sys.sunrise,
        sunset: parsed.sys.sunset,
        condition,
        icon,
    })
}
