//! Binary crate for the weather dashboard proxy.
//!
//! Holds the OpenWeather credential and forwards dashboard queries upstream,
//! relaying status and body unchanged.

mod error;
mod handlers;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use clap::Parser;
use tracing::info;
use weather_core::{Config, WeatherUpstream, logging, upstream_from_config};

pub struct AppState {
    pub upstream: Arc<dyn WeatherUpstream>,
}

#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather dashboard proxy")]
struct Args {
    /// Address to bind (overrides config)
    #[arg(long, env = "WEATHER_BIND_ADDRESS")]
    bind: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(long, env = "WEATHER_PORT")]
    port: Option<u16>,

    /// Log filter, e.g. "info" or "weather_server=debug" (RUST_LOG wins)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    logging::init(&args.log_level)?;

    let mut config = Config::load_with_env()?;
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let upstream = upstream_from_config(&config)?;
    let state = web::Data::new(AppState { upstream });

    let addr = (config.server.bind_address.clone(), config.server.port);
    info!(bind = %addr.0, port = addr.1, upstream = %config.upstream.base_url, "starting proxy");

    HttpServer::new(move || App::new().app_data(state.clone()).configure(handlers::configure))
        .bind(addr.clone())
        .with_context(|| format!("Failed to bind {}:{}", addr.0, addr.1))?
        .run()
        .await
        .context("Proxy server stopped with an error")?;

    Ok(())
}
