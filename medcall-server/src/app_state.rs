use crate::ServerConfig;
use crate::room::RoomRegistry;
use crate::signaling::{Admission, SignalingRelay, SignalingService, ws_handler};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: SignalingService,
    pub relay: SignalingRelay,
}

impl AppState {
    pub fn new(config: &ServerConfig, admission: Arc<dyn Admission>) -> Self {
        let service = SignalingService::new();
        let registry = RoomRegistry::new(config.replacement_policy());
        let relay = SignalingRelay::new(
            registry,
            Arc::new(service.clone()),
            admission,
            config.ice_servers(),
        );

        Self { service, relay }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "rooms": state.relay.registry().room_count(),
        "connections": state.service.connection_count(),
    }))
}
