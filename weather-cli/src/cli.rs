use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, Select, Text};
use tracing::debug;
use weather_core::{
    ClockTicker, Config, Dashboard, ProxyClient, SearchBox, WeatherQuery, clock::TICK,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather dashboard")]
pub struct Cli {
    /// Proxy base URL (overrides config and WEATHER_PROXY_URL)
    #[arg(long, global = true)]
    pub proxy: Option<String>,

    /// Log filter, e.g. "warn" or "weather_core=debug" (RUST_LOG wins)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the proxy URL and, on the server host, the OpenWeather API key.
    Configure,

    /// Show current weather for a city or a coordinate pair.
    Show {
        /// City name.
        #[arg(required_unless_present_all = ["lat", "lon"])]
        city: Option<String>,

        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Keep refreshing the local time until Ctrl-C.
        #[arg(long)]
        watch: bool,
    },

    /// Type-ahead search: pick one of the geocoder's suggestions.
    Search {
        /// Text typed into the search box.
        text: String,
    },

    /// Click on the map at a coordinate pair.
    Pick {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load_with_env()?;
        if let Some(proxy) = self.proxy {
            config.client.proxy_url = proxy;
        }

        match self.command {
            Command::Configure => configure(config),
            Command::Show { city, lat, lon, watch } => {
                let query = match (lat, lon, city) {
                    (Some(lat), Some(lon), _) => WeatherQuery::Coordinates { lat, lon },
                    (_, _, Some(city)) if !city.trim().is_empty() => {
                        WeatherQuery::City(city.trim().to_string())
                    }
                    _ => bail!("Enter a city name or both --lat and --lon"),
                };
                show(&config, query, watch).await
            }
            Command::Search { text } => search(&config, text).await,
            Command::Pick { lat, lon } => pick(&config, lat, lon).await,
        }
    }
}

fn dashboard(config: &Config) -> Result<(Dashboard, Arc<ProxyClient>)> {
    let client = Arc::new(
        ProxyClient::new(config.proxy_url())
            .with_context(|| format!("Failed to create client for {}", config.proxy_url()))?,
    );
    Ok((Dashboard::new(client.clone(), client.clone()), client))
}

fn configure(mut config: Config) -> Result<()> {
    let proxy_url = Text::new("Proxy URL:")
        .with_default(config.proxy_url())
        .prompt()
        .context("Configuration cancelled")?;
    config.client.proxy_url = proxy_url.trim().to_string();

    let api_key = Password::new("OpenWeather API key (server host only, empty to skip):")
        .without_confirmation()
        .prompt()
        .context("Configuration cancelled")?;
    if !api_key.trim().is_empty() {
        config.upsert_api_key(api_key.trim().to_string());
    }

    config.save()?;
    println!("Saved {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(config: &Config, query: WeatherQuery, watch: bool) -> Result<()> {
    let (mut dash, _) = dashboard(config)?;
    dash.search(&query).await;
    println!("{}", render::dashboard(&dash));

    let offset = dash.snapshot().and_then(|s| s.timezone);
    match offset {
        Some(offset) if watch => watch_clock(offset).await,
        _ => Ok(()),
    }
}

async fn watch_clock(offset: i32) -> Result<()> {
    let mut ticker = ClockTicker::spawn(offset, TICK);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            tick = ticker.changed() => match tick {
                Some(time) => println!("Local Time: {time}"),
                None => break,
            },
        }
    }
    Ok(())
}

async fn search(config: &Config, text: String) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Enter a city name");
    }
    let (mut dash, client) = dashboard(config)?;

    let mut search_box = SearchBox::new(client);
    search_box.on_focus();
    search_box.on_text_change(text);
    search_box.settle().await;
    debug!(?search_box, "suggestions settled");

    if search_box.dropdown_visible() {
        let labels: Vec<String> = search_box.suggestions().iter().map(|s| s.label()).collect();
        let chosen = Select::new("Pick a location:", labels)
            .raw_prompt()
            .context("Selection cancelled")?;
        search_box.select(chosen.index);
    } else {
        println!("No suggestions; searching by name.");
    }

    let Some(query) = search_box.submit() else {
        bail!("Enter a city name");
    };
    dash.search(&query).await;
    println!("{}", render::dashboard(&dash));
    Ok(())
}

async fn pick(config: &Config, lat: f64, lon: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        bail!("Coordinates out of range: lat={lat}, lon={lon}");
    }

    let (mut dash, _) = dashboard(config)?;
    dash.map_click(lat, lon).await;
    println!("{}", render::dashboard(&dash));
    Ok(())
}
