mod app;
mod config;
mod overlay;
mod tiles;
mod wind;

use app::WindMapApp;
use clap::Parser;
use config::AppConfig;

/// Animated wind-field viewer on an OpenStreetMap basemap
#[derive(Parser, Debug)]
#[command(name = "windvane-desktop", version, about)]
struct Args {
    /// Wind document location: local path or http(s) URL
    #[arg(long)]
    data: Option<String>,

    /// Override the configured map center latitude
    #[arg(long)]
    lat: Option<f64>,

    /// Override the configured map center longitude
    #[arg(long)]
    lon: Option<f64>,

    /// Override the configured initial zoom level
    #[arg(long)]
    zoom: Option<f64>,
}

fn main() -> Result<(), eframe::Error> {
    env_logger::init();
    let args = Args::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({}), using defaults", e);
        AppConfig::default()
    });

    if let Some(lat) = args.lat {
        config.center_lat = lat;
    }
    if let Some(lon) = args.lon {
        config.center_lon = lon;
    }
    if let Some(zoom) = args.zoom {
        config.default_zoom = zoom;
    }
    let data_source = args.data.unwrap_or_else(|| config.wind_data_source.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Windvane Desktop"),
        ..Default::default()
    };

    log::info!("Starting Windvane Desktop");
    eframe::run_native(
        "Windvane Desktop",
        options,
        Box::new(move |cc| Ok(Box::new(WindMapApp::new(&cc.egui_ctx, &config, data_source)))),
    )
}
