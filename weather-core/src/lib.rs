//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream OpenWeather provider and the proxy client
//! - Shared domain models (queries, snapshots, geocode suggestions)
//! - The search-box state machine, the dashboard controller and the map model
//! - Pure presentation helpers and the local-time ticker
//!
//! It is used by `weather-server` and `weather-cli`.

pub mod client;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod map;
pub mod model;
pub mod present;
pub mod provider;
pub mod search;

pub use client::ProxyClient;
pub use clock::ClockTicker;
pub use config::Config;
pub use dashboard::Dashboard;
pub use error::WeatherError;
pub use map::MapView;
pub use model::{GeoSuggestion, UpstreamReply, WeatherQuery, WeatherSnapshot};
pub use provider::{Geocoder, WeatherSource, WeatherUpstream, upstream_from_config};
pub use search::{KeyOutcome, NavKey, SearchBox, SearchPhase};
