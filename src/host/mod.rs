//! HTTP host for the live dashboard document
//!
//! Serves the rendered page, a JSON view of component states, a
//! Server-Sent Events stream of view events, and the form endpoints of the
//! device control screen.

mod dashboard;

pub use dashboard::{Dashboard, ViewStatus};

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::{get, post},
    Form, Json, Router,
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::connector::CommandKind;
use crate::error::DashboardError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
}

impl AppState {
    pub fn new(dashboard: Arc<Dashboard>) -> Self {
        Self { dashboard }
    }
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

/// Form posted by the device control screen
#[derive(Debug, Deserialize)]
pub struct PayloadForm {
    pub payload: String,
}

/// HTML document wrapper with the Materialize stylesheet and icon font
fn html_doc(title: &str, content: &str) -> String {
    let version = env!("DHD_VERSION");
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <link rel="stylesheet" href="https://fonts.googleapis.com/icon?family=Material+Icons">
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/materialize/1.0.0/css/materialize.min.css">
</head>
<body>
<main class="container">
{content}</main>
<footer class="page-footer"><div class="container">devicehub-dashboard v{version}</div></footer>
</body>
</html>"#
    )
}

/// GET / - the live document
pub async fn page_handler(State(state): State<AppState>) -> Html<String> {
    let title = state.dashboard.ctx.locale.translate("system_status");
    let content = state.dashboard.ctx.document.to_html().await;
    Html(html_doc(&title, &content))
}

/// GET /views - lifecycle state of every component
pub async fn views_handler(State(state): State<AppState>) -> Json<Vec<ViewStatus>> {
    Json(state.dashboard.states())
}

/// GET /events - Server-Sent Events stream of view events
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.dashboard.ctx.bus.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default().data(json))),
            Err(_) => None,
        },
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

async fn submit(state: &AppState, kind: CommandKind, payload: &str) -> Response {
    let Some(control) = state.dashboard.control.as_ref() else {
        return error_response(StatusCode::NOT_FOUND, "no device configured");
    };
    match control.submit(kind, payload).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e @ DashboardError::NotRendered { .. }) => error_response(StatusCode::CONFLICT, e),
        Err(e) => error_response(StatusCode::BAD_GATEWAY, e),
    }
}

/// POST /control/command
pub async fn command_handler(
    State(state): State<AppState>,
    Form(form): Form<PayloadForm>,
) -> Response {
    submit(&state, CommandKind::Command, &form.payload).await
}

/// POST /control/query
pub async fn query_handler(
    State(state): State<AppState>,
    Form(form): Form<PayloadForm>,
) -> Response {
    submit(&state, CommandKind::Query, &form.payload).await
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page_handler))
        .route("/views", get(views_handler))
        .route("/events", get(events_handler))
        .route("/control/command", post(command_handler))
        .route("/control/query", post(query_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
