use thiserror::Error;

/// Errors produced while talking to the proxy or the upstream service.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City or coordinates required")]
    MissingQuery,

    #[error("Invalid coordinates: lat={lat:?}, lon={lon:?}")]
    InvalidCoordinates { lat: String, lon: String },

    #[error("Request to {endpoint} failed: {source}")]
    Network {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("Failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("No weather data found")]
    NoConditions,
}

impl WeatherError {
    /// True for failures that happen before any upstream call is made.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::MissingQuery | Self::InvalidCoordinates { .. })
    }
}
