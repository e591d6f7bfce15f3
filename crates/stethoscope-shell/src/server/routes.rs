use crate::desktop::webview::forward_ipc;

use stethoscope_shell_core::{
    APP_ORIGIN, BuildMode, EventSink, ScanStatus, ServerHooks, origin_policy,
};

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Request, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

/// Shared state handed to every handler.
#[derive(Clone)]
pub(crate) struct ServerState {
    mode: BuildMode,
    hooks: ServerHooks,
    sink: Arc<dyn EventSink>,
}

impl ServerState {
    pub(crate) fn new(mode: BuildMode, hooks: ServerHooks, sink: Arc<dyn EventSink>) -> Self {
        Self { mode, hooks, sink }
    }
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    status: Option<String>,
}

/// Routes, origin policy and CORS.
pub(crate) fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static(APP_ORIGIN))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/shell/status", post(set_status))
        .route("/shell/update", post(request_update))
        .route("/ipc", get(ipc_socket))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(enforce_origin))
                .layer(cors),
        )
        .with_state(state)
}

async fn enforce_origin(request: Request, next: Next) -> Response {
    let origin = request.headers().get(header::ORIGIN);
    let allowed = match origin {
        None => true,
        Some(value) => value
            .to_str()
            .is_ok_and(|origin| origin_policy::is_allowed_origin(Some(origin))),
    };

    if !allowed {
        warn!(origin = ?origin, path = %request.uri().path(), "Rejected request from foreign origin");
        return StatusCode::FORBIDDEN.into_response();
    }

    next.run(request).await
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "mode": state.mode.as_str(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn set_status(State(state): State<ServerState>, Json(body): Json<StatusBody>) -> StatusCode {
    if let Some(raw) = body.status.as_deref() {
        if let Err(e) = raw.parse::<ScanStatus>() {
            warn!(error = %e, "Rejected scan status");
            return StatusCode::UNPROCESSABLE_ENTITY;
        }
    }

    state.hooks.set_scan_status(body.status.as_deref());
    StatusCode::NO_CONTENT
}

async fn request_update(State(state): State<ServerState>) -> StatusCode {
    info!("Update check requested over HTTP");
    state.hooks.request_update();
    StatusCode::ACCEPTED
}

async fn ipc_socket(State(state): State<ServerState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| relay_ipc(socket, state.sink))
}

/// Forward renderer messages to the event loop until the socket closes.
async fn relay_ipc(mut socket: WebSocket, sink: Arc<dyn EventSink>) {
    debug!("Renderer connected");

    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Renderer socket error");
                break;
            }
        };

        match message {
            Message::Text(text) => forward_ipc(sink.as_ref(), text.as_str()),
            Message::Close(_) => break,
            _ => {}
        }
    }

    debug!("Renderer disconnected");
}
