use axum::{
    extract::State,
    routing::{on, post, put},
    Json, Router,
};
use playback::viewer::{Pause, Play, SetCursor, TogglePlayback};
use serde::Deserialize;

use crate::{
    api::snapshot,
    common::{route_not_found, RouteResult, View, METHOD_FILTER_ALL},
    WebState,
};

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/play", post(play))
        .route("/pause", post(pause))
        .route("/toggle", post(toggle))
        .route("/cursor", put(set_cursor))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
struct CursorBody {
    index: i64,
}

async fn play(State(WebState { viewer, .. }): State<WebState>) -> RouteResult<Json<View>> {
    viewer.ask(Play).await?;
    snapshot(&viewer).await
}

async fn pause(State(WebState { viewer, .. }): State<WebState>) -> RouteResult<Json<View>> {
    viewer.ask(Pause).await?;
    snapshot(&viewer).await
}

async fn toggle(State(WebState { viewer, .. }): State<WebState>) -> RouteResult<Json<View>> {
    viewer.ask(TogglePlayback).await?;
    snapshot(&viewer).await
}

async fn set_cursor(
    State(WebState { viewer, .. }): State<WebState>,
    Json(body): Json<CursorBody>,
) -> RouteResult<Json<View>> {
    viewer.ask(SetCursor(body.index)).await?;
    snapshot(&viewer).await
}
