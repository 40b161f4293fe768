//! HTTP + WebSocket API for Nod-0
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /status - Engine status
//! - POST /event/{name} - Fire a behavior event
//! - POST /pose - Set the commanded target pose
//! - GET /prefs - Read preferences
//! - POST /prefs - Update preferences
//! - WS /ws - Live state updates

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::core::{BehaviorEngine, Preferences};
use crate::types::{Pose, StateUpdate};

/// Engine status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: String,
    pub animation: Option<String>,
    pub face_tracked: bool,
    pub suspended: bool,
    pub perception_rate_hz: f64,
    pub body_yaw: f64,
    pub antennas: (f64, f64),
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub state: String,
}

/// Commanded target pose request: Euler angles in radians plus a
/// translation in meters
#[derive(Debug, Deserialize)]
pub struct PoseRequest {
    #[serde(default)]
    pub roll: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub translation: [f64; 3],
}

/// Event response
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub state: String,
    pub accepted: bool,
}

/// Create the API router
pub fn create_router(engine: BehaviorEngine) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/event/:name", post(fire_event))
        .route("/pose", post(set_pose))
        .route("/prefs", get(get_prefs).post(set_prefs))
        .route("/ws", get(websocket_handler))
        .with_state(engine)
}

/// Health check endpoint
async fn health(State(engine): State<BehaviorEngine>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        state: engine.state().to_string(),
    })
}

/// Engine status
async fn status(State(engine): State<BehaviorEngine>) -> Json<StatusResponse> {
    let command = engine.last_command();
    Json(StatusResponse {
        state: engine.state().to_string(),
        animation: engine.current_animation(),
        face_tracked: engine.is_face_detected(),
        suspended: engine.is_suspended(),
        perception_rate_hz: engine.perception_rate_hz(),
        body_yaw: command.body_yaw,
        antennas: command.antennas,
    })
}

/// Fire a behavior event by name
async fn fire_event(
    State(engine): State<BehaviorEngine>,
    Path(name): Path<String>,
) -> Result<Json<EventResponse>, StatusCode> {
    let accepted = match name.as_str() {
        "wakeup" => {
            engine.on_wakeup();
            true
        }
        "listening_start" => {
            engine.on_listening_start();
            true
        }
        "thinking_start" => {
            engine.on_thinking_start();
            true
        }
        "speaking_start" => {
            engine.on_speaking_start();
            true
        }
        "speaking_stop" => {
            engine.on_speaking_stop();
            true
        }
        "idle" => {
            engine.on_idle();
            true
        }
        "suspend" => {
            engine.suspend();
            true
        }
        "resume" => {
            engine.resume();
            true
        }
        _ => return Err(StatusCode::NOT_FOUND),
    };

    Ok(Json(EventResponse {
        state: engine.state().to_string(),
        accepted,
    }))
}

/// Set the commanded target pose
async fn set_pose(
    State(engine): State<BehaviorEngine>,
    Json(req): Json<PoseRequest>,
) -> Json<EventResponse> {
    engine.set_target_pose(Pose::from_euler(req.roll, req.pitch, req.yaw, req.translation));
    Json(EventResponse {
        state: engine.state().to_string(),
        accepted: true,
    })
}

/// Read preferences
async fn get_prefs(State(engine): State<BehaviorEngine>) -> Json<Preferences> {
    Json(engine.preferences())
}

/// Update preferences
async fn set_prefs(
    State(engine): State<BehaviorEngine>,
    Json(prefs): Json<Preferences>,
) -> Json<Preferences> {
    engine.set_preferences(prefs);
    Json(engine.preferences())
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(engine): State<BehaviorEngine>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = engine.subscribe();
    ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    })
}

/// Handle WebSocket connection
async fn handle_websocket(mut socket: WebSocket, mut rx: broadcast::Receiver<StateUpdate>) {
    while let Ok(update) = rx.recv().await {
        let json = serde_json::to_string(&update).unwrap_or_default();
        if socket.send(Message::Text(json)).await.is_err() {
            break;
        }
    }
}

/// Run the API server
pub async fn run_server(addr: &str, engine: BehaviorEngine) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(engine);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Nod-0 API running on {}", addr);
    println!("  GET  /health       - Health check");
    println!("  GET  /status       - Engine status");
    println!("  POST /event/:name  - Fire a behavior event");
    println!("  POST /pose         - Set commanded pose");
    println!("  GET  /prefs        - Read preferences");
    println!("  POST /prefs        - Update preferences");
    println!("  WS   /ws           - Live state updates");
    axum::serve(listener, router).await?;
    Ok(())
}
