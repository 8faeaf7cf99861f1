//! HTTP/SSE transport.
//!
//! A client opens `GET /sse` and receives an `endpoint` event naming the URL
//! to POST its JSON-RPC messages to. Each POST is acknowledged with
//! `202 Accepted`; the JSON-RPC response is delivered later as a `message`
//! event on that client's stream. Every stream is an independent session
//! with its own MCP lifecycle.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Router,
};
use bitbucket_core::{Error, Result};
use futures_util::stream::Stream;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::handlers::ToolHandler;
use crate::protocol::{parse_message, JsonRpcResponse};
use crate::server::McpServer;

pub const SSE_PATH: &str = "/sse";
pub const MESSAGES_PATH: &str = "/messages";

/// First event on every stream; its data is the POST endpoint.
pub const ENDPOINT_EVENT: &str = "endpoint";
/// Event carrying one serialized JSON-RPC response.
pub const MESSAGE_EVENT: &str = "message";

const SESSION_QUEUE: usize = 64;
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Clone)]
struct Session {
    server: Arc<McpServer>,
    sender: mpsc::Sender<JsonRpcResponse>,
}

/// Live SSE sessions keyed by session id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionRegistry {
    /// Register a new session with a fresh protocol state.
    ///
    /// Returns the session id and the receiving end of its outbound queue.
    pub fn open(&self, handler: Arc<ToolHandler>) -> (String, mpsc::Receiver<JsonRpcResponse>) {
        let id = Uuid::new_v4().simple().to_string();
        let (sender, receiver) = mpsc::channel(SESSION_QUEUE);
        let session = Session {
            server: Arc::new(McpServer::new(handler)),
            sender,
        };
        self.lock().insert(id.clone(), session);
        (id, receiver)
    }

    /// Remove a session. Returns whether it existed.
    pub fn close(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn get(&self, id: &str) -> Option<Session> {
        self.lock().get(id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared state of the SSE router.
#[derive(Clone)]
pub struct SseState {
    pub handler: Arc<ToolHandler>,
    pub sessions: Arc<SessionRegistry>,
}

impl SseState {
    pub fn new(handler: Arc<ToolHandler>) -> Self {
        Self {
            handler,
            sessions: Arc::new(SessionRegistry::default()),
        }
    }
}

/// Removes its session when the event stream is dropped.
struct SessionGuard {
    id: String,
    sessions: Arc<SessionRegistry>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.sessions.close(&self.id) {
            info!(session = %self.id, "SSE client disconnected");
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    session_id: Option<String>,
}

/// Build the SSE router for a tool handler.
pub fn router(handler: Arc<ToolHandler>) -> Router {
    routes(SseState::new(handler))
}

/// Build the SSE router over existing state.
pub fn routes(state: SseState) -> Router {
    Router::new()
        .route(SSE_PATH, get(open_stream))
        .route(MESSAGES_PATH, post(post_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port` and serve the SSE transport until the server stops.
pub async fn serve(handler: Arc<ToolHandler>, host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Transport(format!("failed to bind {}: {}", addr, e)))?;

    info!(
        tools = handler.registry().len(),
        "MCP SSE server listening on http://{}{}", addr, SSE_PATH
    );

    axum::serve(listener, router(handler))
        .await
        .map_err(|e| Error::Transport(format!("server error: {}", e)))?;

    Ok(())
}

async fn open_stream(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>> + Send + 'static> {
    let (session_id, receiver) = state.sessions.open(state.handler.clone());
    info!(session = %session_id, "SSE client connected");

    let endpoint = Event::default()
        .event(ENDPOINT_EVENT)
        .data(format!("{}?session_id={}", MESSAGES_PATH, session_id));

    let guard = SessionGuard {
        id: session_id,
        sessions: state.sessions.clone(),
    };

    let messages = ReceiverStream::new(receiver).filter_map(move |response| {
        let _session = &guard;
        match serde_json::to_string(&response) {
            Ok(json) => Some(Ok(Event::default().event(MESSAGE_EVENT).data(json))),
            Err(e) => {
                warn!("Failed to serialize response: {}", e);
                None
            }
        }
    });

    let stream = tokio_stream::once(Ok::<_, Infallible>(endpoint)).chain(messages);

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

async fn post_message(
    State(state): State<SseState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    let Some(session_id) = query.session_id else {
        return (StatusCode::BAD_REQUEST, "Missing session_id").into_response();
    };

    let Some(session) = state.sessions.get(&session_id) else {
        return (StatusCode::NOT_FOUND, "Unknown session").into_response();
    };

    let message = match parse_message(&body) {
        Ok(message) => message,
        Err(e) => {
            warn!(session = %session_id, "Rejected message: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    tokio::spawn(async move {
        if let Some(response) = session.server.handle_message(message).await {
            if session.sender.send(response).await.is_err() {
                debug!(session = %session_id, "Session closed before response was delivered");
            }
        }
    });

    StatusCode::ACCEPTED.into_response()
}
