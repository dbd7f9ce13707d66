use std::sync::Arc;

use lifelog_api::{Geocoder, LocationClient};
use map::GeoJsonSurface;
use playback::{viewer::Reload, Viewer};
use web::{start_web_server, Config, WebState};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::from_env().expect("invalid configuration in env.");
    log::info!("location service at {}", config.api_url);

    // viewer
    let viewer = actors::spawn(Viewer::new(
        GeoJsonSurface::new(),
        Arc::new(LocationClient::new(&config.api_url)),
        Arc::new(Geocoder::new(&config.geocoder_url)),
    ));
    if let Err(why) = viewer.tell(Reload).await {
        log::error!("could not request the initial load: {}", why);
    }

    // web server
    let web_future = start_web_server(&config, WebState::new(viewer, config.map_style.clone()));

    if let Err(why) = web_future.await {
        log::error!("web server stopped: {}", why);
    }
}
