//! Streamable HTTP transport.
//!
//! Routes:
//! - `POST /mcp`: JSON-RPC messages. An `initialize` request without a
//!   session header opens a session; everything else must carry
//!   `mcp-session-id`.
//! - `GET /mcp`: server-to-client SSE stream for a session.
//! - `DELETE /mcp`: close a session.
//! - `GET /`: status document.

use super::session::{SessionError, SessionRegistry};
use crate::clients::{GraphConfig, RemoteCredential};
use crate::server::{McpServer, McpServerResult};
use crate::status::ServerStatus;
use crate::types::{McpError, McpRequest, McpResponse, RequestId};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Header carrying the session ID.
pub const SESSION_HEADER: &str = "mcp-session-id";

const NO_VALID_SESSION: &str = "Bad Request: No valid session ID provided";
const INVALID_SESSION: &str = "Invalid or missing session ID";

/// Shared state of the HTTP transport.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live sessions
    pub registry: Arc<SessionRegistry>,

    /// Server built from the process configuration; sessions start from it
    pub server: McpServer,

    /// Graph configuration used for per-session credentials
    pub config: Arc<GraphConfig>,
}

impl AppState {
    /// Create transport state.
    pub fn new(server: McpServer, config: GraphConfig) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            server,
            config: Arc::new(config),
        }
    }

    /// Server for a new session, honoring any credential in the query.
    fn session_server(&self, query: CredentialQuery) -> McpServerResult<McpServer> {
        if query.is_empty() {
            return Ok(self.server.clone());
        }

        let base = self.config.credential.as_ref();
        let access_token = query
            .access_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| base.map(|c| c.access_token.clone()));
        let page_id = query
            .page_id
            .or_else(|| base.and_then(|c| c.default_page_id.clone()));

        match RemoteCredential::from_parts(access_token, page_id) {
            Some(credential) => {
                debug!("Session credential taken from query parameters");
                self.server.with_credential(&self.config, credential)
            }
            None => Ok(self.server.clone()),
        }
    }
}

/// Credential override accepted on the initialize request.
#[derive(Debug, Default, Deserialize)]
struct CredentialQuery {
    #[serde(rename = "FACEBOOK_PAGE_ACCESS_TOKEN")]
    access_token: Option<String>,

    #[serde(rename = "FACEBOOK_PAGE_ID")]
    page_id: Option<String>,
}

impl CredentialQuery {
    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.page_id.is_none()
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/mcp", post(handle_post).get(handle_stream).delete(handle_delete))
        .with_state(state)
}

/// Serve on `listener` until `shutdown` fires, then close every session.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let registry = Arc::clone(&state.registry);
    let app = router(state);

    info!(address = ?listener.local_addr().ok(), "HTTP transport listening");

    // SSE streams end only when their session closes; close before draining.
    axum::serve(listener, app)
        .with_graceful_shutdown({
            let registry = Arc::clone(&registry);
            async move {
                shutdown.cancelled().await;
                registry.close_all().await;
            }
        })
        .await?;

    // Sessions opened while connections were draining.
    registry.close_all().await;
    info!("HTTP transport stopped");
    Ok(())
}

async fn status(State(state): State<AppState>) -> Json<ServerStatus> {
    Json(ServerStatus::new(&state.server, state.registry.len().await))
}

async fn handle_post(
    State(state): State<AppState>,
    Query(query): Query<CredentialQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let raw = String::from_utf8_lossy(&body);

    if let Some(id) = session_id(&headers) {
        return match state.registry.get(id).await {
            Some(session) => respond(&session.id, session.server.handle_message(&raw).await),
            None => {
                warn!(session_id = %id, "POST for unknown session");
                no_valid_session()
            }
        };
    }

    let request = match serde_json::from_str::<McpRequest>(&raw) {
        Ok(request) if request.is_initialize() => request,
        _ => return no_valid_session(),
    };

    let server = match state.session_server(query) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Could not create session server");
            return internal_error();
        }
    };

    let session = state.registry.create(server).await;
    respond(&session.id, session.server.handle_request(request).await)
}

async fn handle_stream(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = match state.registry.resolve(session_id(&headers)).await {
        Ok(session) => session,
        Err(e) => return invalid_session(e),
    };

    debug!(session_id = %session.id, "SSE stream opened");

    let closed = session.closed();
    let stream = futures_util::stream::once(async move { closed.cancelled_owned().await })
        .filter_map(|()| async { None::<Result<Event, Infallible>> });

    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}

async fn handle_delete(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = match state.registry.resolve(session_id(&headers)).await {
        Ok(session) => session,
        Err(e) => return invalid_session(e),
    };

    state.registry.close(&session.id).await;
    StatusCode::OK.into_response()
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn respond(session_id: &str, response: Option<McpResponse>) -> Response {
    let mut response = match response {
        Some(body) => Json(body).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    };
    if let Ok(value) = HeaderValue::from_str(session_id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

fn no_valid_session() -> Response {
    let body = McpResponse::error(RequestId::Null, McpError::server_error(NO_VALID_SESSION));
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn invalid_session(error: SessionError) -> Response {
    debug!(error = %error, "Rejected session request");
    (StatusCode::BAD_REQUEST, INVALID_SESSION).into_response()
}

fn internal_error() -> Response {
    let body = McpResponse::error(
        RequestId::Null,
        McpError::internal_error("Internal server error"),
    );
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
