use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use playback::viewer::{GenerateDemo, Reload, Upload};

use crate::{
    api::snapshot,
    common::{settle, RouteErrorResponse, RouteResult, View},
    WebState,
};

/// Multipart field carrying the export.
pub const UPLOAD_FIELD: &str = "file";

pub(crate) fn routes() -> Router<WebState> {
    Router::new()
        .route("/locations/reload", post(reload))
        .route("/demo", post(demo))
        .route("/upload", post(upload))
}

async fn reload(State(WebState { viewer, .. }): State<WebState>) -> RouteResult<Json<View>> {
    settle(viewer.ask(Reload).await?).await?;
    snapshot(&viewer).await
}

/// Answers right away; playback of the demo starts a moment later.
async fn demo(State(WebState { viewer, .. }): State<WebState>) -> RouteResult<Json<View>> {
    viewer.ask(GenerateDemo).await?;
    snapshot(&viewer).await
}

async fn upload(
    State(WebState { viewer, .. }): State<WebState>,
    mut multipart: Multipart,
) -> RouteResult<Json<View>> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(|why| {
        RouteErrorResponse::bad_request("Malformed upload.")
            .with_detailed_information(why.body_text())
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let content = field.bytes().await.map_err(|why| {
            RouteErrorResponse::bad_request("Could not read the uploaded file.")
                .with_detailed_information(why.body_text())
        })?;
        file = Some((file_name, content.to_vec()));
        break;
    }
    let Some((file_name, content)) = file else {
        return Err(RouteErrorResponse::bad_request(format!(
            "Expected a multipart field named \"{}\".",
            UPLOAD_FIELD
        )));
    };

    if let Some(pending) = viewer.ask(Upload { file_name, content }).await? {
        settle(pending).await?;
    }
    snapshot(&viewer).await
}
