//! End-to-end flows through the HTTP surface, with in-memory providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use callbridge_core::{
    BridgeError, BridgeOrchestrator, CallDispatcher, CallId, Capability, DialPlan, DialRequest,
    IdentityStore, JoinToken, MediaProvider, MediaSession, Participant, ParticipantId,
    SessionManager, SessionId, VoiceProvider,
};
use callbridge_server::{router, AppState};

#[derive(Default)]
struct FakeMedia {
    sessions_created: AtomicUsize,
    participants_created: AtomicUsize,
}

#[async_trait]
impl MediaProvider for FakeMedia {
    async fn create_session(&self, tag: &str) -> callbridge_core::Result<MediaSession> {
        let n = self.sessions_created.fetch_add(1, Ordering::SeqCst);
        Ok(MediaSession {
            id: SessionId(format!("s-{n}")),
            tag: Some(tag.to_string()),
        })
    }

    async fn create_participant(
        &self,
        tag: &str,
        _caps: &[Capability],
    ) -> callbridge_core::Result<Participant> {
        let n = self.participants_created.fetch_add(1, Ordering::SeqCst);
        Ok(Participant {
            id: ParticipantId(format!("p-{n}")),
            token: JoinToken::new(format!("tok-{n}")),
            tag: tag.to_string(),
        })
    }

    async fn admit_participant(
        &self,
        _participant_id: &ParticipantId,
        _session_id: &SessionId,
    ) -> callbridge_core::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct FakeVoice {
    calls_placed: AtomicUsize,
    ended: Mutex<Vec<String>>,
}

#[async_trait]
impl VoiceProvider for FakeVoice {
    async fn create_call(&self, _request: &DialRequest) -> callbridge_core::Result<CallId> {
        let n = self.calls_placed.fetch_add(1, Ordering::SeqCst);
        Ok(CallId(format!("c-{n}")))
    }

    async fn end_call(&self, call_id: &CallId) -> callbridge_core::Result<()> {
        let mut ended = self.ended.lock().unwrap();
        if ended.contains(&call_id.0) {
            return Err(BridgeError::Provider("call already completed".into()));
        }
        ended.push(call_id.0.clone());
        Ok(())
    }
}

fn app(media: Arc<FakeMedia>, voice: Arc<FakeVoice>) -> Router {
    let store = Arc::new(IdentityStore::new());
    let orchestrator = BridgeOrchestrator::new(
        store.clone(),
        SessionManager::new(media, store.clone()),
        CallDispatcher::new(voice),
    );
    router(Arc::new(AppState {
        orchestrator,
        dial_plan: DialPlan {
            from: "+15551110000".into(),
            to: "+15552220000".into(),
            answer_url: "https://bridge.example.com/callAnswered".into(),
        },
    }))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn answer_event(call_id: &str) -> Request<Body> {
    let payload = serde_json::json!({
        "eventType": "answer",
        "callId": call_id,
        "to": "+15552220000",
    });
    Request::builder()
        .method("POST")
        .uri("/callAnswered")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn browser_call_returns_token_and_pstn_reuses_session() {
    let media = Arc::new(FakeMedia::default());
    let app = app(media.clone(), Arc::new(FakeVoice::default()));

    let response = app.clone().oneshot(get("/startBrowserCall")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(!body["token"].as_str().unwrap().is_empty());

    let response = app.clone().oneshot(get("/startPSTNCall")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ringing");

    // One createSession across both flows: the session is cached and reused.
    assert_eq!(media.sessions_created.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn answered_call_yields_directive_then_acknowledgment_on_replay() {
    let app = app(Arc::new(FakeMedia::default()), Arc::new(FakeVoice::default()));

    let response = app.clone().oneshot(get("/startPSTNCall")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // First answer event: a signaling document referencing the participant's
    // token and the call id.
    let response = app.clone().oneshot(answer_event("c-0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/xml"
    );
    let body = body_string(response).await;
    assert!(body.contains("tok-0"));
    assert!(body.contains("c-0"));

    // Replay: the binding is already consumed, so a bare 200 with no body.
    let response = app.clone().oneshot(answer_event("c-0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.is_empty());
}

#[tokio::test]
async fn unknown_call_id_gets_empty_acknowledgment() {
    let app = app(Arc::new(FakeMedia::default()), Arc::new(FakeVoice::default()));

    let response = app.clone().oneshot(get("/startPSTNCall")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(answer_event("unknown")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.is_empty());
}

#[tokio::test]
async fn malformed_answer_event_is_still_acknowledged() {
    let app = app(Arc::new(FakeMedia::default()), Arc::new(FakeVoice::default()));

    let request = Request::builder()
        .method("POST")
        .uri("/callAnswered")
        .body(Body::from("this is not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.is_empty());
}

#[tokio::test]
async fn non_utf8_answer_event_is_still_acknowledged() {
    let app = app(Arc::new(FakeMedia::default()), Arc::new(FakeVoice::default()));

    // The provider must see a 200 even for a body that is not valid UTF-8;
    // anything else reads as a signaling fault and triggers retries.
    let request = Request::builder()
        .method("POST")
        .uri("/callAnswered")
        .body(Body::from(vec![0xff, 0xfe, 0x80]))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.is_empty());
}

#[tokio::test]
async fn end_without_dial_is_500_and_service_keeps_running() {
    let app = app(Arc::new(FakeMedia::default()), Arc::new(FakeVoice::default()));

    let response = app.clone().oneshot(get("/endPSTNCall")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // The process (here: the router) is still serving.
    let response = app.clone().oneshot(get("/startBrowserCall")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn end_after_dial_hangs_up() {
    let voice = Arc::new(FakeVoice::default());
    let app = app(Arc::new(FakeMedia::default()), voice.clone());

    let response = app.clone().oneshot(get("/startPSTNCall")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/endPSTNCall")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "hungup");
    assert_eq!(voice.ended.lock().unwrap().as_slice(), ["c-0"]);

    // A second hangup reaches the provider again and its refusal surfaces.
    let response = app.clone().oneshot(get("/endPSTNCall")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
