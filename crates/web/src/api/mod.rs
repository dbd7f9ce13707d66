use axum::{
    extract::State,
    response::IntoResponse,
    routing::{delete, get, on},
    Json, Router,
};
use map::{style::MapConfig, GeoJsonSurface};
use playback::viewer::{DismissNotice, Snapshot};
use serde_json::json;

mod locations;
mod playback_controls;
mod trip;

use crate::{
    common::{route_not_found, RouteResult, View, METHOD_FILTER_ALL},
    SharedViewer, WebState,
};

pub fn routes(state: WebState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/view", get(view))
        .route("/style", get(style))
        .route("/notice", delete(dismiss_notice))
        .nest_service("/playback", playback_controls::routes(state.clone()))
        .nest_service("/trip", trip::routes(state.clone()))
        .merge(locations::routes())
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

/// The viewer's state after everything queued before this call ran.
pub(crate) async fn snapshot(viewer: &SharedViewer) -> RouteResult<Json<View>> {
    Ok(Json(viewer.ask(Snapshot::<GeoJsonSurface>::new()).await?))
}

async fn ping() -> impl IntoResponse {
    Json(json!({
        "message": "pong!"
    }))
}

async fn view(State(WebState { viewer, .. }): State<WebState>) -> RouteResult<Json<View>> {
    snapshot(&viewer).await
}

async fn style(State(WebState { map_style, .. }): State<WebState>) -> Json<MapConfig> {
    Json(map_style.config())
}

async fn dismiss_notice(
    State(WebState { viewer, .. }): State<WebState>,
) -> RouteResult<Json<View>> {
    viewer.ask(DismissNotice).await?;
    snapshot(&viewer).await
}
