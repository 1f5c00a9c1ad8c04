use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnFailure, TraceLayer},
};
use tracing::{debug, info, Level};

use crate::{
    error::ChatError,
    llm::{ChatRelay, ProviderKind},
    models::ChatRequest,
};

/**
 * \brief Starts the HTTP relay.
 * \param addr listen address, e.g. "127.0.0.1:8000"
 */
pub async fn run(addr: &str, relay: ChatRelay) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(relay)).await?;
    Ok(())
}

/**
 * \brief Chat routes at the root and again under `/api`, plus a health probe.
 */
pub fn router(relay: ChatRelay) -> Router {
    Router::new()
        .merge(chat_routes())
        .nest("/api", chat_routes())
        .route("/health", get(health_check))
        // Failed relay calls are already logged at error level by the relay itself.
        .layer(TraceLayer::new_for_http().on_failure(DefaultOnFailure::new().level(Level::DEBUG)))
        .layer(CorsLayer::permissive())
        .with_state(relay)
}

fn chat_routes() -> Router<ChatRelay> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat-v2", post(chat_v2))
}

/**
 * \brief POST /chat: OpenAI-compatible router.
 */
async fn chat(
    State(relay): State<ChatRelay>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    handle(&relay, ProviderKind::OpenAiCompatible, body).await
}

/**
 * \brief POST /chat-v2: Cohere v2.
 */
async fn chat_v2(
    State(relay): State<ChatRelay>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    handle(&relay, ProviderKind::CohereV2, body).await
}

async fn handle(
    relay: &ChatRelay,
    kind: ProviderKind,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    // An unreadable body validates like an empty one.
    let body = match body {
        Ok(Json(v)) => v,
        Err(rejection) => {
            debug!(provider = kind.label(), %rejection, "unreadable chat body");
            Value::Null
        }
    };
    let request = match ChatRequest::from_json(&body) {
        Ok(request) => request,
        Err(errors) => return ChatError::from(errors).into_response(),
    };
    match relay.chat(kind, request).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => err.into_response(),
    }
}

/**
 * \brief GET /health: reports configured providers without contacting them.
 */
async fn health_check(State(relay): State<ChatRelay>) -> Json<Value> {
    let describe = |kind: ProviderKind| {
        let provider = kind.config(relay.config());
        json!({
            "provider": kind.label(),
            "url": provider.url,
            "model": provider.model,
            "configured": provider.has_key(),
        })
    };
    Json(json!({
        "ok": true,
        "providers": {
            "chat": describe(ProviderKind::OpenAiCompatible),
            "chat-v2": describe(ProviderKind::CohereV2),
        }
    }))
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}
