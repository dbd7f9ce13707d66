pub use crate::common::RouteResult;

use std::{path::Path, sync::Arc};

use actors::actor_ref::ActorRef;
use axum::{extract::FromRef, Router};
use map::{GeoJsonSurface, MapStyle};
use playback::Viewer;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};

pub mod api;
pub mod common;
pub mod config;

pub use config::{Config, ConfigError};

pub type SharedViewer = ActorRef<Viewer<GeoJsonSurface>>;

#[derive(Clone, FromRef)]
pub struct WebState {
    pub viewer: SharedViewer,
    pub map_style: Arc<MapStyle>,
}

impl WebState {
    pub fn new(viewer: SharedViewer, map_style: MapStyle) -> Self {
        Self {
            viewer,
            map_style: Arc::new(map_style),
        }
    }
}

pub fn router(state: WebState, www: &Path) -> Router {
    Router::new()
        .nest_service("/api", api::routes(state))
        .fallback_service(
            ServeDir::new(www).not_found_service(ServeFile::new(www.join("error404.html"))),
        )
}

pub async fn start_web_server(config: &Config, state: WebState) -> std::io::Result<()> {
    let routes = router(state, &config.www);

    let listener = TcpListener::bind(config.bind).await?;
    log::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, routes.into_make_service()).await?;

    Ok(())
}
