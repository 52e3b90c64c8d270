use std::sync::Arc;

use anyhow::Context;
use tower_http::trace::TraceLayer;
use tracing::info;

use callbridge_core::{
    BridgeOrchestrator, CallDispatcher, DialPlan, HttpMediaProvider, HttpVoiceProvider,
    IdentityStore, MediaProvider, ProviderCredentials, SessionManager, VoiceProvider,
};
use callbridge_server::{router, AppState, BridgeConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("callbridge=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Fail fast: no credentials, no process.
    let config = BridgeConfig::from_env().context("loading configuration")?;

    let credentials = ProviderCredentials {
        account_id: config.account_id.clone(),
        username: config.api_username.clone(),
        password: config.api_password.clone(),
    };
    let media: Arc<dyn MediaProvider> = Arc::new(HttpMediaProvider::new(
        config.media_api_url.clone(),
        credentials.clone(),
    ));
    let voice: Arc<dyn VoiceProvider> = Arc::new(HttpVoiceProvider::new(
        config.voice_api_url.clone(),
        credentials,
        config.voice_application_id.clone(),
    ));

    let store = Arc::new(IdentityStore::new());
    let orchestrator = BridgeOrchestrator::new(
        store.clone(),
        SessionManager::new(media, store.clone()),
        CallDispatcher::new(voice),
    );
    let state = Arc::new(AppState {
        orchestrator,
        dial_plan: DialPlan {
            from: config.from_number.clone(),
            to: config.to_number.clone(),
            answer_url: config.answer_url(),
        },
    });

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "callbridge server listening");
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
