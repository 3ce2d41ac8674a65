mod assets;
mod auth;
mod config;
mod delivery;
mod error;
mod map;
mod order;
mod presenter;
mod qr;
mod tracking;
mod util;
mod views;
mod web;

use config::{load as config_load, validate as config_validate};
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match config_load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = config_validate(&config) {
        eprintln!("Configuration error: {err}");
        std::process::exit(1);
    }

    info!(
        auth_config = ?config.auth.sanitized_for_log(),
        assets_dir = %config.assets.dir,
        orders_path = ?config.fixtures.orders_path,
        utc_offset_hours = config.tracking.utc_offset_hours,
        base_date_offset_days = config.tracking.base_date_offset_days,
        "Effective configuration loaded"
    );

    let fixtures = match order::OrderFixtures::load(config.fixtures.orders_path.as_deref()) {
        Ok(fixtures) => fixtures,
        Err(err) => {
            error!(error = %format!("{err:#}"), "Failed to load order fixtures");
            std::process::exit(1);
        }
    };

    info!(orders = fixtures.orders.len(), "Order fixtures loaded");

    // validate() has already checked these.
    let (Some(username), Some(password), Some(utc_offset)) = (
        config.auth.username.clone(),
        config.auth.password.clone(),
        config.tracking.utc_offset(),
    ) else {
        eprintln!("Configuration error: auth credentials and tracking offset are required");
        std::process::exit(1);
    };

    let state = web::AppState {
        credentials: auth::Credentials::new(username, password),
        sessions: Arc::new(auth::SessionStore::new(
            config.auth.session_ttl(),
            config.auth.max_sessions,
        )),
        fixtures: Arc::new(fixtures),
        assets_dir: PathBuf::from(&config.assets.dir),
        utc_offset,
        base_date_offset_days: config.tracking.base_date_offset_days,
        display_name: config.auth.display_name,
        station: config.station,
    };

    let running = Arc::new(AtomicBool::new(true));
    let running_signal = Arc::clone(&running);

    if let Err(err) = ctrlc::set_handler(move || {
        info!("Ctrl-C received, shutting down gracefully");
        running_signal.store(false, Ordering::SeqCst);
    }) {
        error!(error = %err, "Failed to set Ctrl-C handler");
        std::process::exit(1);
    }

    info!("duckdal starting");

    web::start(state, &config.web.bind, config.web.port, running);

    info!("duckdal stopped");
}
