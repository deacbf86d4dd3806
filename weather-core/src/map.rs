use std::f64::consts::PI;

use crate::{
    model::WeatherSnapshot,
    present::{Unit, display_value},
};

pub const DEFAULT_CENTER: (f64, f64) = (20.0, 0.0);
pub const DEFAULT_ZOOM: u8 = 10;
const TILE_URL: &str = "https://tile.openstreetmap.org";

#[derive(Debug, Clone, PartialEq)]
pub struct MapPopup {
    pub city: String,
    pub condition: String,
    pub temp: Option<String>,
}

/// Map panel: a centre, a draggable marker and an optional popup.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: (f64, f64),
    pub marker: (f64, f64),
    pub zoom: u8,
    popup: Option<MapPopup>,
}

impl Default for MapView {
    fn default() -> Self {
        Self { center: DEFAULT_CENTER, marker: DEFAULT_CENTER, zoom: DEFAULT_ZOOM, popup: None }
    }
}

impl MapView {
    /// Recentre on a fresh result. Missing coordinates fall back to the default centre.
    pub fn show(&mut self, snapshot: &WeatherSnapshot) {
        let pos = match (snapshot.lat, snapshot.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => DEFAULT_CENTER,
        };
        self.center = pos;
        self.marker = pos;

        self.popup = (!snapshot.city.is_empty()).then(|| MapPopup {
            city: snapshot.city.clone(),
            condition: snapshot.condition.clone(),
            temp: snapshot.temp.map(|t| display_value(Some(t), Unit::Celsius)),
        });
    }

    pub fn click(&mut self, lat: f64, lon: f64) {
        self.marker = (lat, lon);
    }

    pub fn popup(&self) -> Option<&MapPopup> {
        self.popup.as_ref()
    }

    /// Slippy-map tile containing the marker at the current zoom.
    pub fn marker_tile(&self) -> (u32, u32) {
        tile_for(self.marker.0, self.marker.1, self.zoom)
    }

    pub fn marker_tile_url(&self) -> String {
        let (x, y) = self.marker_tile();
        format!("{TILE_URL}/{}/{x}/{y}.png", self.zoom)
    }

    pub fn osm_link(&self) -> String {
        let (lat, lon) = self.marker;
        format!(
            "https://www.openstreetmap.org/?mlat={lat:.4}&mlon={lon:.4}#map={}/{lat:.4}/{lon:.4}",
            self.zoom
        )
    }
}

pub fn tile_for(lat: f64, lon: f64, zoom: u8) -> (u32, u32) {
    let n = f64::from(1u32 << zoom.min(30));
    let lat = lat.clamp(-85.051_128_78, 85.051_128_78).to_radians();

    let x = ((lon + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();

    let max = n - 1.0;
    (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
}

/// Label used when reverse geocoding has nothing for a clicked point.
pub fn coordinate_label(lat: f64, lon: f64) -> String {
    format!("{lat:.4},{lon:.4}")
}
