//! HTTP surface: client-facing endpoints plus the provider answer webhook.
//!
//! Provider failures inside the client-facing handlers become terse 500
//! responses. The webhook handler is different: whatever happens internally,
//! it answers with a well-formed 200 so the voice provider never enters a
//! retry storm over a signaling fault.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

use callbridge_core::{AnswerOutcome, BridgeOrchestrator, CallId, DialPlan};

pub struct AppState {
    pub orchestrator: BridgeOrchestrator,
    pub dial_plan: DialPlan,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/startBrowserCall", get(start_browser_call))
        .route("/startPSTNCall", get(start_pstn_call))
        .route("/callAnswered", post(call_answered))
        .route("/endPSTNCall", get(end_pstn_call))
        .with_state(state)
}

async fn start_browser_call(State(state): State<Arc<AppState>>) -> Response {
    let tag = format!("browser-{}", Uuid::new_v4());
    match state.orchestrator.start_browser_call(&tag).await {
        Ok(token) => Json(json!({
            "message": "created participant and setup session",
            "token": token.expose(),
        }))
        .into_response(),
        Err(err) => {
            error!(%err, "browser call setup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": err.to_string() })),
            )
                .into_response()
        }
    }
}

async fn start_pstn_call(State(state): State<Arc<AppState>>) -> Response {
    let tag = format!("pstn-{}", Uuid::new_v4());
    match state
        .orchestrator
        .start_pstn_call(&tag, &state.dial_plan)
        .await
    {
        Ok(_handle) => Json(json!({ "status": "ringing" })).into_response(),
        Err(err) => {
            error!(%err, "pstn call setup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": err.to_string() })),
            )
                .into_response()
        }
    }
}

/// Answer event as posted by the voice provider.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerEvent {
    call_id: String,
    #[allow(dead_code)]
    to: Option<String>,
    #[allow(dead_code)]
    event_type: Option<String>,
}

/// Provider answer webhook. Always responds 200: a transfer directive when
/// the call id matches a pending bridge, an empty acknowledgment otherwise
/// (including on malformed payloads). The body is taken as raw bytes so even
/// a non-UTF-8 payload reaches the lenient-parse path instead of being
/// rejected by the extractor.
async fn call_answered(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let event: AnswerEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!(%err, "unparseable answer event, acknowledging");
            return StatusCode::OK.into_response();
        }
    };

    let call_id = CallId(event.call_id);
    match state.orchestrator.handle_answer(&call_id).await {
        AnswerOutcome::Transfer(directive) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/xml")],
            directive,
        )
            .into_response(),
        AnswerOutcome::Acknowledged => StatusCode::OK.into_response(),
    }
}

async fn end_pstn_call(State(state): State<Arc<AppState>>) -> Response {
    match state.orchestrator.end_call().await {
        Ok(_call_id) => Json(json!({ "status": "hungup" })).into_response(),
        Err(err) => {
            error!(%err, "hangup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": err.to_string() })),
            )
                .into_response()
        }
    }
}
