use axum::{
    extract::{Path, State},
    routing::{on, post},
    Json, Router,
};
use model::place::{Coordinate, Endpoint};
use playback::viewer::{CancelDashboard, CreateTrip, MapClick, OpenDashboard, Pick, Search};
use serde::Deserialize;

use crate::{
    api::snapshot,
    common::{route_not_found, settle, RouteErrorResponse, RouteResult, View, METHOD_FILTER_ALL},
    WebState,
};

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/open", post(open))
        .route("/cancel", post(cancel))
        .route("/pick/:endpoint", post(pick))
        .route("/click", post(click))
        .route("/search", post(search))
        .route("/create", post(create))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    endpoint: Endpoint,
    query: String,
}

async fn open(State(WebState { viewer, .. }): State<WebState>) -> RouteResult<Json<View>> {
    viewer.ask(OpenDashboard).await?;
    snapshot(&viewer).await
}

async fn cancel(State(WebState { viewer, .. }): State<WebState>) -> RouteResult<Json<View>> {
    viewer.ask(CancelDashboard).await?;
    snapshot(&viewer).await
}

async fn pick(
    State(WebState { viewer, .. }): State<WebState>,
    Path(endpoint): Path<Endpoint>,
) -> RouteResult<Json<View>> {
    if !viewer.ask(Pick(endpoint)).await? {
        return Err(RouteErrorResponse::bad_request("The trip dashboard is closed."));
    }
    snapshot(&viewer).await
}

/// A click on the map. Clicks nobody asked for are accepted and ignored.
async fn click(
    State(WebState { viewer, .. }): State<WebState>,
    Json(coordinate): Json<Coordinate>,
) -> RouteResult<Json<View>> {
    viewer.ask(MapClick(coordinate)).await?;
    snapshot(&viewer).await
}

async fn search(
    State(WebState { viewer, .. }): State<WebState>,
    Json(body): Json<SearchBody>,
) -> RouteResult<Json<View>> {
    let message = Search {
        endpoint: body.endpoint,
        query: body.query,
    };
    if let Some(pending) = viewer.ask(message).await? {
        settle(pending).await?;
    }
    snapshot(&viewer).await
}

async fn create(State(WebState { viewer, .. }): State<WebState>) -> RouteResult<Json<View>> {
    let Some(pending) = viewer.ask(CreateTrip).await? else {
        return Err(RouteErrorResponse::bad_request(
            "Pick a start and an end point first.",
        ));
    };
    settle(pending).await?;
    snapshot(&viewer).await
}
