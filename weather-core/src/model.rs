use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// What the caller wants the weather for.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

impl WeatherQuery {
    /// Build a query from raw request parameters.
    ///
    /// Coordinates take precedence when both `lat` and `lon` are present;
    /// otherwise a non-blank `city` is used.
    pub fn from_params(
        city: Option<&str>,
        lat: Option<&str>,
        lon: Option<&str>,
    ) -> Result<Self, WeatherError> {
        fn non_empty(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }

        if let (Some(lat), Some(lon)) = (non_empty(lat), non_empty(lon)) {
            let invalid = || WeatherError::InvalidCoordinates {
                lat: lat.to_string(),
                lon: lon.to_string(),
            };
            let lat_v: f64 = lat.parse().map_err(|_| invalid())?;
            let lon_v: f64 = lon.parse().map_err(|_| invalid())?;
            if !lat_v.is_finite() || !lon_v.is_finite() {
                return Err(invalid());
            }
            return Ok(Self::Coordinates { lat: lat_v, lon: lon_v });
        }

        match non_empty(city) {
            Some(city) => Ok(Self::City(city.to_string())),
            None => Err(WeatherError::MissingQuery),
        }
    }

    /// Query-string pairs for the proxy's `/weather` routes.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::City(city) => vec![("city", city.clone())],
            Self::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        }
    }
}

impl std::fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::City(city) => write!(f, "city={city}"),
            Self::Coordinates { lat, lon } => write!(f, "lat={lat}, lon={lon}"),
        }
    }
}

/// Current conditions for one location, flattened from the upstream body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Offset from UTC in seconds.
    pub timezone: Option<i32>,
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_deg: Option<f64>,
    pub clouds: Option<f64>,
    /// Meters.
    pub visibility: Option<f64>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    pub condition: String,
    pub icon: String,
}

/// One entry of a forward or reverse geocoding result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoSuggestion {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl GeoSuggestion {
    /// `name[, state][, country]`
    pub fn label(&self) -> String {
        let mut label = self.name.clone();
        for part in [self.state.as_deref(), Some(self.country.as_str())]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
        {
            label.push_str(", ");
            label.push_str(part);
        }
        label
    }
}

/// Raw upstream response, relayed by the proxy without modification.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: serde_json::Value,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
