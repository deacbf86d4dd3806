use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    map::{MapView, coordinate_label},
    model::{WeatherQuery, WeatherSnapshot},
    provider::{Geocoder, WeatherSource},
};

pub const SEARCH_FAILED: &str = "City not found or API error";
pub const LOCATION_FAILED: &str = "Location not found or API error";

/// Page-level state: the current result, the error banner, the location label and the map.
#[derive(Debug)]
pub struct Dashboard {
    weather: Arc<dyn WeatherSource>,
    geocoder: Arc<dyn Geocoder>,
    snapshot: Option<WeatherSnapshot>,
    error: Option<String>,
    location_label: String,
    map: MapView,
}

impl Dashboard {
    pub fn new(weather: Arc<dyn WeatherSource>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            weather,
            geocoder,
            snapshot: None,
            error: None,
            location_label: String::new(),
            map: MapView::default(),
        }
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn location_label(&self) -> &str {
        &self.location_label
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub async fn search(&mut self, query: &WeatherQuery) -> Option<&WeatherSnapshot> {
        self.fetch(query, SEARCH_FAILED).await;
        self.snapshot.as_ref()
    }

    /// Query the clicked point, then label it via reverse geocoding.
    /// A failed weather query skips the lookup and keeps the coordinate label.
    pub async fn map_click(&mut self, lat: f64, lon: f64) -> Option<&WeatherSnapshot> {
        self.map.click(lat, lon);
        if !self.fetch(&WeatherQuery::Coordinates { lat, lon }, LOCATION_FAILED).await {
            self.location_label = coordinate_label(lat, lon);
            return None;
        }

        self.location_label = match self.geocoder.reverse(lat, lon, 1).await {
            Ok(found) => match found.first().filter(|g| !g.name.is_empty()) {
                Some(place) => place.label(),
                None => coordinate_label(lat, lon),
            },
            Err(err) => {
                warn!(error = %err, lat, lon, "reverse geocode failed");
                coordinate_label(lat, lon)
            }
        };

        self.snapshot.as_ref()
    }

    async fn fetch(&mut self, query: &WeatherQuery, failure: &str) -> bool {
        self.error = None;
        self.snapshot = None;

        match self.weather.current(query).await {
            Ok(snapshot) => {
                info!(%query, city = %snapshot.city, "weather loaded");
                self.map.show(&snapshot);
                self.snapshot = Some(snapshot);
                true
            }
            Err(err) => {
                warn!(%query, error = %err, "weather lookup failed");
                self.error = Some(failure.to_string());
                false
            }
        }
    }
}
